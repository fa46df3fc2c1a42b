//! Simulation Event Records
//!
//! Notable happenings emitted by a faction tick.

use serde::{Deserialize, Serialize};

/// Broad event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Completion,
    Resource,
    Discovery,
    Crisis,
    Conflict,
    Social,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Completion => "completion",
            EventKind::Resource => "resource",
            EventKind::Discovery => "discovery",
            EventKind::Crisis => "crisis",
            EventKind::Conflict => "conflict",
            EventKind::Social => "social",
        }
    }
}

/// Something that happened to a faction during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub faction: String,
    pub title: String,
    pub description: String,
    /// 1 (minor) to 5 (campaign-changing).
    pub importance: u8,
    pub date: String,
}

impl SimulationEvent {
    pub fn new(
        kind: EventKind,
        faction: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        importance: u8,
        date: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            faction: faction.into(),
            title: title.into(),
            description: description.into(),
            importance: importance.clamp(1, 5),
            date: date.into(),
        }
    }
}
