//! Espionage, Intelligence and Incident Records

use serde::{Deserialize, Serialize};

/// Kind of covert operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EspionageKind {
    Infiltrate,
    Sabotage,
    StealSecrets,
    Assassinate,
    CounterIntel,
}

impl EspionageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Infiltrate => "infiltrate",
            Self::Sabotage => "sabotage",
            Self::StealSecrets => "steal_secrets",
            Self::Assassinate => "assassinate",
            Self::CounterIntel => "counter_intel",
        }
    }
}

/// Covert operation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    #[default]
    Active,
    Success,
    Failure,
    Discovered,
}

/// A covert operation run by the owning faction against `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EspionageOperation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EspionageKind,
    pub target: String,
    #[serde(default)]
    pub agents: Vec<String>,
    pub cost: f64,
    /// Percent chance of success, at most 80.
    pub success_chance: u8,
    pub started: String,
    #[serde(default)]
    pub status: OperationStatus,
}

/// Information gathered about another faction. May be planted falsehood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelligenceReport {
    pub id: String,
    pub source: String,
    pub target: String,
    pub information: String,
    /// Percent reliability.
    pub reliability: u8,
    pub gathered: String,
    #[serde(default)]
    pub is_false: bool,
}

/// Kind of diplomatic incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    SpyDiscovered,
    TreatyBreach,
    BorderDispute,
    TradeDispute,
    Insult,
}

/// Incident lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    #[default]
    Unresolved,
    Resolved,
    Escalated,
}

/// How an incident is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentResolution {
    Negotiated,
    Escalated,
}

/// An event straining relations between factions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiplomaticIncident {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: IncidentKind,
    /// Recording faction first, then everyone else involved.
    pub factions: Vec<String>,
    pub description: String,
    /// Relationship impact, normally negative.
    pub relationship_impact: i32,
    pub date: String,
    #[serde(default)]
    pub status: IncidentStatus,
}
