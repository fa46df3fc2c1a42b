//! NPC Personality Records

use serde::{Deserialize, Serialize};

/// Inner life of a named faction member. Trust and ambition are in [0, 100].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NpcPersonality {
    #[serde(default)]
    pub quirks: Vec<String>,
    #[serde(default)]
    pub loyalties: Vec<String>,
    #[serde(default)]
    pub secrets: Vec<String>,
    pub trust: u8,
    pub ambition: u8,
}
