//! Military Records
//!
//! Units committed to engagements and the engagements themselves, which are
//! kept in a faction's history after they resolve.

use serde::{Deserialize, Serialize};

/// A body of troops. Training, morale and equipment are in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilitaryUnit {
    pub name: String,
    pub quantity: u32,
    pub training: u8,
    pub morale: u8,
    pub equipment: u8,
    /// Battle experience in [0, 100].
    #[serde(default)]
    pub veterancy: u8,
}

impl MilitaryUnit {
    pub fn new(name: impl Into<String>, quantity: u32, training: u8, morale: u8, equipment: u8) -> Self {
        Self {
            name: name.into(),
            quantity,
            training: training.min(100),
            morale: morale.min(100),
            equipment: equipment.min(100),
            veterancy: 0,
        }
    }
}

/// Kind of military confrontation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
    Battle,
    Siege,
    Skirmish,
    Raid,
}

/// Engagement status, from the initiating faction's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementStatus {
    #[default]
    Ongoing,
    Victory,
    Defeat,
    Stalemate,
}

/// A confrontation with another faction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilitaryEngagement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EngagementKind,
    pub opponent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub started: String,
    #[serde(default)]
    pub status: EngagementStatus,
    #[serde(default)]
    pub committed_units: Vec<MilitaryUnit>,
    /// Own troops lost over the engagement.
    #[serde(default)]
    pub casualties: u32,
}

impl MilitaryEngagement {
    pub fn is_ongoing(&self) -> bool {
        self.status == EngagementStatus::Ongoing
    }

    /// Total troops committed.
    pub fn troop_count(&self) -> u32 {
        self.committed_units
            .iter()
            .fold(0u32, |total, u| total.saturating_add(u.quantity))
    }
}
