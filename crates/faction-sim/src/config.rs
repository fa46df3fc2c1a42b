//! Simulation Configuration
//!
//! Every tunable of the simulation in one TOML-backed struct. Sections may
//! be omitted or partially given; missing keys take their defaults.

use faction_records::resources::keys;
use faction_records::{Faction, Resources};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::economy::market::pricing;
use crate::economy::regional::regional_constants;
use crate::economy::trade::trade_constants;
use crate::economy::{fluctuate_markets, ConsumptionRates, PriceHistory};
use crate::hierarchy::{inherit_resources, DEFAULT_INHERITANCE_RATE};
use crate::relationships::{decay_relationships, propagate_among_allies, relationship_constants};

/// Complete simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub relationships: RelationshipConfig,
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub tick: TickConfig,
    #[serde(default)]
    pub hierarchy: HierarchyConfig,
}

impl SimConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipConfig {
    /// Points each relationship drifts toward 0 per decay step
    pub decay_rate: i32,
    /// Share of a relationship change passed on to allies
    pub propagation_factor: f64,
    /// Value at which a faction counts as an ally for propagation
    pub ally_threshold: i32,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            decay_rate: relationship_constants::DEFAULT_DECAY_RATE,
            propagation_factor: relationship_constants::DEFAULT_PROPAGATION_FACTOR,
            ally_threshold: relationship_constants::ALLY_PROPAGATION_THRESHOLD,
        }
    }
}

impl RelationshipConfig {
    pub fn decay(&self, faction: &mut Faction) {
        decay_relationships(faction, self.decay_rate);
    }

    pub fn propagate(&self, source: &Faction, target: &str, others: &mut [Faction]) -> Vec<String> {
        propagate_among_allies(source, target, others, self.propagation_factor, self.ally_threshold)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Share of active trade route value earned per day
    pub trade_income_share: f64,
    /// Maximum relative swing of supply and demand per fluctuation
    pub volatility: f64,
    /// Entries kept per price history
    pub price_history_length: usize,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            trade_income_share: trade_constants::TRADE_INCOME_SHARE,
            volatility: pricing::DEFAULT_VOLATILITY,
            price_history_length: regional_constants::HISTORY_LENGTH,
        }
    }
}

impl EconomyConfig {
    pub fn fluctuate<R: Rng + ?Sized>(&self, faction: &mut Faction, rng: &mut R) {
        fluctuate_markets(faction, self.volatility, rng);
    }

    pub fn price_history(&self, resource: impl Into<String>) -> PriceHistory {
        PriceHistory::with_capacity(resource, self.price_history_length)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Comfortable stock level per tracked resource
    pub resource_minimums: Resources,
    /// A resource below this fraction of its minimum is critical
    pub critical_fraction: f64,
    /// Critical resources that produce a gathering candidate
    pub gather_on_critical: Vec<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            resource_minimums: Resources::from([
                (keys::GOLD, 1000.0),
                (keys::FOOD, 500.0),
                (keys::EQUIPMENT, 200.0),
                (keys::MAGIC, 50.0),
                (keys::INFLUENCE, 30.0),
            ]),
            critical_fraction: 0.2,
            gather_on_critical: vec![keys::GOLD.to_string(), keys::FOOD.to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Progress points a job gains per day; jobs complete at 100
    pub job_progress_per_day: f64,
    /// Resources every faction produces per day
    pub base_production: Resources,
    pub upkeep: ConsumptionRates,
    pub food_crisis_threshold: f64,
    pub gold_crisis_threshold: f64,
    /// Daily chance of an event per member on expedition
    pub expedition_event_chance: f64,
    /// Trust lost per day by named members while food or gold runs short
    pub shortage_trust_loss: i32,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            job_progress_per_day: 10.0,
            base_production: Resources::from([
                (keys::GOLD, 10.0),
                (keys::FOOD, 5.0),
                (keys::INFLUENCE, 1.0),
            ]),
            upkeep: ConsumptionRates::default(),
            food_crisis_threshold: 50.0,
            gold_crisis_threshold: 100.0,
            expedition_event_chance: 0.05,
            shortage_trust_loss: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    pub inheritance_rate: f64,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            inheritance_rate: DEFAULT_INHERITANCE_RATE,
        }
    }
}

impl HierarchyConfig {
    pub fn inherit(&self, parent: &Faction, child: &mut Faction) -> Resources {
        inherit_resources(parent, child, self.inheritance_rate)
    }
}

/// Errors from loading or saving a TOML configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// A commented configuration file with every default spelled out.
pub fn default_config_toml() -> String {
    r#"# Faction Simulation Configuration

[relationships]
decay_rate = 1
propagation_factor = 0.5
ally_threshold = 50

[economy]
trade_income_share = 0.1
volatility = 0.1
price_history_length = 30

[ai]
critical_fraction = 0.2
gather_on_critical = ["gold", "food"]

[ai.resource_minimums]
equipment = 200.0
food = 500.0
gold = 1000.0
influence = 30.0
magic = 50.0

[tick]
job_progress_per_day = 10.0
food_crisis_threshold = 50.0
gold_crisis_threshold = 100.0
expedition_event_chance = 0.05
shortage_trust_loss = 2

[tick.base_production]
food = 5.0
gold = 10.0
influence = 1.0

[tick.upkeep]
food_per_member = 1.0
gold_per_member = 2.0
food_per_worker = 2.0
food_per_soldier = 3.0
equipment_per_soldier = 0.5

[hierarchy]
inheritance_rate = 0.1
"#
    .to_string()
}
