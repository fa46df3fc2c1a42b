//! Decision Records
//!
//! The single recommended action the faction AI produces per evaluation.

use serde::{Deserialize, Serialize};

use crate::Resources;

/// Kind of action a faction can decide on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    GatherResources,
    ExpandTerritory,
    RecruitUnits,
    TradeResources,
    EstablishCamp,
    ResearchMagic,
    BuildStructure,
    DefendTerritory,
    RaidTarget,
    FormAlliance,
    SendExpedition,
    RestAndRecover,
}

impl DecisionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionKind::GatherResources => "gather_resources",
            DecisionKind::ExpandTerritory => "expand_territory",
            DecisionKind::RecruitUnits => "recruit_units",
            DecisionKind::TradeResources => "trade_resources",
            DecisionKind::EstablishCamp => "establish_camp",
            DecisionKind::ResearchMagic => "research_magic",
            DecisionKind::BuildStructure => "build_structure",
            DecisionKind::DefendTerritory => "defend_territory",
            DecisionKind::RaidTarget => "raid_target",
            DecisionKind::FormAlliance => "form_alliance",
            DecisionKind::SendExpedition => "send_expedition",
            DecisionKind::RestAndRecover => "rest_and_recover",
        }
    }
}

impl std::fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional parameters attached to a decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_faction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub threats: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opportunities: Vec<String>,
}

/// A prioritized action recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    #[serde(rename = "type")]
    pub kind: DecisionKind,
    pub priority: u32,
    pub reasoning: String,
    #[serde(default)]
    pub params: DecisionParams,
    /// Positive number of days the action takes.
    pub duration_days: u32,
    #[serde(default, skip_serializing_if = "Resources::is_empty")]
    pub required_resources: Resources,
    #[serde(default)]
    pub expected_outcome: String,
}

impl Decision {
    pub fn new(kind: DecisionKind, priority: u32, reasoning: impl Into<String>, duration_days: u32) -> Self {
        Self {
            kind,
            priority,
            reasoning: reasoning.into(),
            params: DecisionParams::default(),
            duration_days: duration_days.max(1),
            required_resources: Resources::new(),
            expected_outcome: String::new(),
        }
    }

    pub fn with_params(mut self, params: DecisionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_required(mut self, required: Resources) -> Self {
        self.required_resources = required;
        self
    }

    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.expected_outcome = outcome.into();
        self
    }
}
