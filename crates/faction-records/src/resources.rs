//! Resource Bags
//!
//! A faction's stockpile keyed by resource name (gold, food, equipment, ...).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known resource keys.
pub mod keys {
    pub const GOLD: &str = "gold";
    pub const FOOD: &str = "food";
    pub const EQUIPMENT: &str = "equipment";
    pub const MAGIC: &str = "magic";
    pub const INFLUENCE: &str = "influence";
}

/// Named resource amounts. Amounts are never negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resources(BTreeMap<String, f64>);

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, amount: f64) -> Self {
        self.set(key, amount);
        self
    }

    /// Amount held for `key`, 0 when absent.
    pub fn get(&self, key: &str) -> f64 {
        self.0.get(key).copied().unwrap_or(0.0)
    }

    /// Sets an amount, flooring at 0.
    pub fn set(&mut self, key: impl Into<String>, amount: f64) {
        self.0.insert(key.into(), amount.max(0.0));
    }

    /// Adds a signed delta, flooring at 0. Returns the delta actually applied.
    pub fn add(&mut self, key: &str, delta: f64) -> f64 {
        let current = self.get(key);
        let next = (current + delta).max(0.0);
        self.0.insert(key.to_string(), next);
        next - current
    }

    /// True if at least `amount` of `key` is held.
    pub fn has(&self, key: &str, amount: f64) -> bool {
        self.get(key) >= amount
    }

    /// True if every amount in `required` is held.
    pub fn covers(&self, required: &Resources) -> bool {
        required.iter().all(|(key, amount)| self.has(key, amount))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    /// Adds every entry of `other` into this bag.
    pub fn merge(&mut self, other: &Resources) {
        for (key, amount) in other.iter() {
            self.add(key, amount);
        }
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Resources {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut resources = Resources::new();
        for (key, amount) in iter {
            resources.set(key, amount);
        }
        resources
    }
}

impl<K: Into<String>, const N: usize> From<[(K, f64); N]> for Resources {
    fn from(entries: [(K, f64); N]) -> Self {
        entries.into_iter().collect()
    }
}
