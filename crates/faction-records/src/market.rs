//! Market, Trade Route and Production Records

use serde::{Deserialize, Serialize};

use crate::Resources;

/// A faction's local market for one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEntry {
    pub resource: String,
    pub base_price: f64,
    pub supply: f64,
    pub demand: f64,
    /// Derived from base price, supply and demand.
    #[serde(default)]
    pub current_price: f64,
}

impl MarketEntry {
    /// Creates an entry; `current_price` starts at the base price until recomputed.
    pub fn new(resource: impl Into<String>, base_price: f64, supply: f64, demand: f64) -> Self {
        Self {
            resource: resource.into(),
            base_price,
            supply,
            demand,
            current_price: base_price,
        }
    }
}

/// Trade route status. `Severed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeRouteStatus {
    #[default]
    Active,
    Suspended,
    Severed,
}

/// A standing trade arrangement with another faction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRoute {
    pub id: String,
    pub partner: String,
    #[serde(default)]
    pub goods: Vec<String>,
    /// Value of goods moved per cycle, in gold.
    pub value: f64,
    #[serde(default)]
    pub status: TradeRouteStatus,
}

/// A running conversion of an input bundle into an output bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionChain {
    pub id: String,
    pub name: String,
    pub inputs: Resources,
    pub outputs: Resources,
    /// Base duration in days with no worker bonus.
    pub duration_days: u32,
    /// Percent complete.
    #[serde(default)]
    pub progress: f64,
    #[serde(default = "default_workers")]
    pub workers: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_building: Option<String>,
}

fn default_workers() -> u32 {
    1
}

impl ProductionChain {
    pub fn is_complete(&self) -> bool {
        self.progress >= 100.0
    }
}
