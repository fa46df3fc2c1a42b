//! Relationship Records
//!
//! One faction's directed disposition toward another.

use serde::{Deserialize, Serialize};

/// Bounds and category thresholds for relationship values.
pub mod thresholds {
    pub const MIN_VALUE: i32 = -100;
    pub const MAX_VALUE: i32 = 100;
    pub const ALLIED: i32 = 60;
    pub const TRADE: i32 = 20;
    pub const RIVALRY: i32 = -20;
    pub const HOSTILE: i32 = -60;
}

/// Category derived from a relationship value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipCategory {
    Allied,
    Trade,
    #[default]
    Neutral,
    Rivalry,
    Hostile,
}

impl RelationshipCategory {
    /// Category for a (clamped) value.
    pub fn from_value(value: i32) -> Self {
        if value >= thresholds::ALLIED {
            RelationshipCategory::Allied
        } else if value >= thresholds::TRADE {
            RelationshipCategory::Trade
        } else if value <= thresholds::HOSTILE {
            RelationshipCategory::Hostile
        } else if value <= thresholds::RIVALRY {
            RelationshipCategory::Rivalry
        } else {
            RelationshipCategory::Neutral
        }
    }
}

/// A faction's disposition toward `faction_name`, in [-100, 100].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub faction_name: String,
    pub value: i32,
    #[serde(default)]
    pub category: RelationshipCategory,
}

impl Relationship {
    /// Creates a relationship, clamping the value and deriving its category.
    pub fn new(faction_name: impl Into<String>, value: i32) -> Self {
        let value = value.clamp(thresholds::MIN_VALUE, thresholds::MAX_VALUE);
        Self {
            faction_name: faction_name.into(),
            value,
            category: RelationshipCategory::from_value(value),
        }
    }

    /// Replaces the value, clamping and recomputing the category.
    pub fn set_value(&mut self, value: i32) {
        self.value = value.clamp(thresholds::MIN_VALUE, thresholds::MAX_VALUE);
        self.category = RelationshipCategory::from_value(self.value);
    }
}
