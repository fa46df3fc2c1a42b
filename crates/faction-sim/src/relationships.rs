//! Relationship Ledger
//!
//! Stores, decays and propagates each faction's directed disposition toward
//! other factions. Values are always clamped to [-100, 100] and the category
//! is recomputed on every write.

use faction_records::relationship::thresholds;
use faction_records::{Faction, Relationship, RelationshipCategory};

/// Ledger tuning constants.
pub mod relationship_constants {
    /// Points per decay step moved toward 0.
    pub const DEFAULT_DECAY_RATE: i32 = 1;
    /// Share of the source's disposition passed on to its allies.
    pub const DEFAULT_PROPAGATION_FACTOR: f64 = 0.5;
    /// Allies at or above this value inherit the source's grudges.
    pub const ALLY_PROPAGATION_THRESHOLD: i32 = 50;
    /// At or below this value two factions are at war.
    pub const WAR_THRESHOLD: i32 = -60;
    /// At or above this value two factions are allied.
    pub const ALLIANCE_THRESHOLD: i32 = 60;
}

/// Relationship impact of a named action.
pub fn action_impact(action: &str) -> i32 {
    match action {
        "form_alliance" => 30,
        "aid" => 20,
        "gift" => 15,
        "trade_resources" => 10,
        "defend_territory" => 5,
        "expand_territory" => -10,
        "insult" => -15,
        "raid_target" => -40,
        "espionage_discovered" => -40,
        "break_treaty" => -50,
        "declare_war" => -60,
        _ => 0,
    }
}

/// How a relationship should change: by a named action or a raw amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipChange<'a> {
    Action(&'a str),
    Amount(i32),
}

impl RelationshipChange<'_> {
    pub fn delta(&self) -> i32 {
        match self {
            RelationshipChange::Action(action) => action_impact(action),
            RelationshipChange::Amount(amount) => *amount,
        }
    }
}

impl From<i32> for RelationshipChange<'_> {
    fn from(amount: i32) -> Self {
        RelationshipChange::Amount(amount)
    }
}

impl<'a> From<&'a str> for RelationshipChange<'a> {
    fn from(action: &'a str) -> Self {
        RelationshipChange::Action(action)
    }
}

/// Stored value toward `target`, or 0 if there is no entry.
pub fn relationship_value(faction: &Faction, target: &str) -> i32 {
    faction.relationship(target).map_or(0, |r| r.value)
}

/// Category toward `target`; neutral if there is no entry.
pub fn relationship_category(faction: &Faction, target: &str) -> RelationshipCategory {
    RelationshipCategory::from_value(relationship_value(faction, target))
}

/// Creates or updates the entry toward `target`. Returns the new value.
pub fn update_relationship<'a>(
    faction: &mut Faction,
    target: &str,
    change: impl Into<RelationshipChange<'a>>,
) -> i32 {
    let delta = change.into().delta();
    match faction.relationship_mut(target) {
        Some(rel) => {
            rel.set_value(rel.value.saturating_add(delta));
            rel.value
        }
        None => {
            let rel = Relationship::new(target, delta);
            let value = rel.value;
            faction.relationships.push(rel);
            value
        }
    }
}

/// Moves every entry toward 0 by `rate` without crossing it.
pub fn decay_relationships(faction: &mut Faction, rate: i32) {
    let rate = rate.max(0);
    for rel in &mut faction.relationships {
        let next = if rel.value > 0 {
            (rel.value - rate).max(0)
        } else if rel.value < 0 {
            (rel.value + rate).min(0)
        } else {
            0
        };
        rel.set_value(next);
    }
}

/// Passes a share of `source`'s disposition toward `target` on to every
/// faction in `others` that `source` holds at or above the ally threshold.
///
/// `others` must not contain `source` itself; entries named `source` or
/// `target` are skipped. Returns the names of the factions changed.
pub fn propagate_relationship(
    source: &Faction,
    target: &str,
    others: &mut [Faction],
    factor: f64,
) -> Vec<String> {
    propagate_among_allies(
        source,
        target,
        others,
        factor,
        relationship_constants::ALLY_PROPAGATION_THRESHOLD,
    )
}

/// [`propagate_relationship`] with a custom ally threshold.
pub fn propagate_among_allies(
    source: &Faction,
    target: &str,
    others: &mut [Faction],
    factor: f64,
    ally_threshold: i32,
) -> Vec<String> {
    let source_value = relationship_value(source, target);
    let delta = (source_value as f64 * factor).round() as i32;
    if delta == 0 {
        return Vec::new();
    }

    let mut changed = Vec::new();
    for ally in others.iter_mut() {
        if ally.name == source.name || ally.name == target {
            continue;
        }
        if relationship_value(source, &ally.name) < ally_threshold {
            continue;
        }
        update_relationship(ally, target, delta);
        changed.push(ally.name.clone());
    }

    tracing::debug!(
        source = %source.name,
        target,
        delta,
        allies = changed.len(),
        "Propagated relationship"
    );
    changed
}

/// Raises both directions between `a` and `b` by `amount`.
pub fn improve_mutual(a: &mut Faction, b: &mut Faction, amount: i32) {
    let amount = amount.abs();
    update_relationship(a, &b.name, amount);
    update_relationship(b, &a.name, amount);
}

/// Lowers both directions between `a` and `b` by `amount`.
pub fn degrade_mutual(a: &mut Faction, b: &mut Faction, amount: i32) {
    let amount = -amount.abs();
    update_relationship(a, &b.name, amount);
    update_relationship(b, &a.name, amount);
}

/// True if `faction`'s disposition toward `target` is at war level.
pub fn is_at_war(faction: &Faction, target: &str) -> bool {
    relationship_value(faction, target) <= relationship_constants::WAR_THRESHOLD
}

/// True if `faction`'s disposition toward `target` is at alliance level.
pub fn is_allied(faction: &Faction, target: &str) -> bool {
    relationship_value(faction, target) >= relationship_constants::ALLIANCE_THRESHOLD
}

/// Names of factions this faction is hostile toward.
pub fn hostile_factions(faction: &Faction) -> Vec<&str> {
    faction
        .relationships
        .iter()
        .filter(|r| r.value <= thresholds::HOSTILE)
        .map(|r| r.faction_name.as_str())
        .collect()
}

/// Names of factions this faction is allied with.
pub fn allied_factions(faction: &Faction) -> Vec<&str> {
    faction
        .relationships
        .iter()
        .filter(|r| r.value >= thresholds::ALLIED)
        .map(|r| r.faction_name.as_str())
        .collect()
}
