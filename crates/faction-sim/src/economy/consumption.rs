//! Daily Consumption
//!
//! Members eat and draw wages, production workers eat, and troops in the
//! field eat and wear out equipment.

use faction_records::resources::keys;
use faction_records::Faction;
use serde::{Deserialize, Serialize};

/// Constants for consumption
pub mod consumption_constants {
    /// Food eaten per active member per day
    pub const FOOD_PER_MEMBER: f64 = 1.0;
    /// Gold paid per active member per day
    pub const GOLD_PER_MEMBER: f64 = 2.0;
    /// Food eaten per production-chain worker per day
    pub const FOOD_PER_WORKER: f64 = 2.0;
    /// Food eaten per deployed soldier per day
    pub const FOOD_PER_SOLDIER: f64 = 3.0;
    /// Equipment worn per deployed soldier per day
    pub const EQUIPMENT_PER_SOLDIER: f64 = 0.5;
}

use consumption_constants::*;

/// Per-day consumption rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumptionRates {
    pub food_per_member: f64,
    pub gold_per_member: f64,
    pub food_per_worker: f64,
    pub food_per_soldier: f64,
    pub equipment_per_soldier: f64,
}

impl Default for ConsumptionRates {
    fn default() -> Self {
        Self {
            food_per_member: FOOD_PER_MEMBER,
            gold_per_member: GOLD_PER_MEMBER,
            food_per_worker: FOOD_PER_WORKER,
            food_per_soldier: FOOD_PER_SOLDIER,
            equipment_per_soldier: EQUIPMENT_PER_SOLDIER,
        }
    }
}

/// One source of daily consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionItem {
    pub resource: String,
    /// Amount per day.
    pub rate: f64,
    pub reason: String,
}

impl ConsumptionItem {
    fn new(resource: &str, rate: f64, reason: impl Into<String>) -> Self {
        Self {
            resource: resource.to_string(),
            rate,
            reason: reason.into(),
        }
    }
}

/// Itemized daily consumption for a faction at the default rates.
pub fn daily_consumption(faction: &Faction) -> Vec<ConsumptionItem> {
    daily_consumption_with(faction, &ConsumptionRates::default())
}

pub fn daily_consumption_with(faction: &Faction, rates: &ConsumptionRates) -> Vec<ConsumptionItem> {
    let mut items = Vec::new();

    let members = faction.members.iter().filter(|m| m.is_active()).count() as f64;
    if members > 0.0 {
        items.push(ConsumptionItem::new(keys::FOOD, members * rates.food_per_member, "Member upkeep"));
        items.push(ConsumptionItem::new(keys::GOLD, members * rates.gold_per_member, "Member wages"));
    }

    for chain in &faction.production_chains {
        items.push(ConsumptionItem::new(
            keys::FOOD,
            chain.workers.max(1) as f64 * rates.food_per_worker,
            format!("Production: {}", chain.name),
        ));
    }

    for engagement in faction.military_engagements.iter().filter(|e| e.is_ongoing()) {
        let troops = engagement.troop_count() as f64;
        if troops == 0.0 {
            continue;
        }
        items.push(ConsumptionItem::new(
            keys::FOOD,
            troops * rates.food_per_soldier,
            format!("Military: {} against {}", kind_label(engagement.kind), engagement.opponent),
        ));
        items.push(ConsumptionItem::new(
            keys::EQUIPMENT,
            troops * rates.equipment_per_soldier,
            format!("Equipment wear: {}", kind_label(engagement.kind)),
        ));
    }

    items
}

fn kind_label(kind: faction_records::EngagementKind) -> &'static str {
    use faction_records::EngagementKind::*;
    match kind {
        Battle => "battle",
        Siege => "siege",
        Skirmish => "skirmish",
        Raid => "raid",
    }
}

/// Result of applying consumption.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionReport {
    /// Amount actually removed per resource.
    pub consumed: Vec<(String, f64)>,
    /// Resources that could not be fully covered, with the missing amount.
    pub shortfalls: Vec<(String, f64)>,
}

/// Applies `days` of consumption, never driving a resource below 0.
pub fn apply_daily_consumption(faction: &mut Faction, days: u32) -> ConsumptionReport {
    apply_consumption_with(faction, days, &ConsumptionRates::default())
}

pub fn apply_consumption_with(faction: &mut Faction, days: u32, rates: &ConsumptionRates) -> ConsumptionReport {
    let items = daily_consumption_with(faction, rates);
    let mut report = ConsumptionReport::default();
    if items.is_empty() {
        return report;
    }

    let mut totals: Vec<(String, f64)> = Vec::new();
    for item in items {
        let amount = item.rate * days as f64;
        match totals.iter_mut().find(|(r, _)| *r == item.resource) {
            Some((_, total)) => *total += amount,
            None => totals.push((item.resource, amount)),
        }
    }

    let bag = faction.resources_mut();
    for (resource, needed) in totals {
        let removed = -bag.add(&resource, -needed);
        if removed < needed {
            report.shortfalls.push((resource.clone(), needed - removed));
        }
        report.consumed.push((resource, removed));
    }

    if !report.shortfalls.is_empty() {
        tracing::warn!(faction = %faction.name, shortfalls = ?report.shortfalls, "Consumption not covered");
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use faction_records::{
        EngagementKind, EngagementStatus, FactionMember, MilitaryEngagement, MilitaryUnit, Resources,
    };

    fn camp() -> Faction {
        Faction::new("Thornwood")
            .with_resources(Resources::from([("food", 100.0), ("gold", 100.0), ("equipment", 50.0)]))
            .with_member(FactionMember::named("Mira"))
            .with_member(FactionMember::named("Corvin"))
            .with_member(FactionMember::group("Spearmen", 40))
    }

    #[test]
    fn test_member_upkeep() {
        let items = daily_consumption(&camp());
        let food: f64 = items.iter().filter(|i| i.resource == "food").map(|i| i.rate).sum();
        let gold: f64 = items.iter().filter(|i| i.resource == "gold").map(|i| i.rate).sum();
        assert_eq!(food, 3.0);
        assert_eq!(gold, 6.0);
    }

    #[test]
    fn test_engagement_upkeep() {
        let mut faction = camp();
        faction.military_engagements.push(MilitaryEngagement {
            id: "engagement_1".into(),
            kind: EngagementKind::Siege,
            opponent: "Ashen Court".into(),
            location: None,
            started: "1492-03-01".into(),
            status: EngagementStatus::Ongoing,
            committed_units: vec![MilitaryUnit::new("Spearmen", 10, 50, 50, 50)],
            casualties: 0,
        });

        let items = daily_consumption(&faction);
        assert!(items.iter().any(|i| i.resource == "food" && i.rate == 30.0));
        assert!(items.iter().any(|i| i.resource == "equipment" && i.rate == 5.0));
    }

    #[test]
    fn test_apply_never_goes_negative() {
        let mut faction = camp();
        faction.resources_mut().set("gold", 10.0);

        let report = apply_daily_consumption(&mut faction, 3);

        assert_eq!(faction.resource("food"), 91.0);
        assert_eq!(faction.resource("gold"), 0.0);
        assert_eq!(report.shortfalls, vec![("gold".to_string(), 8.0)]);
    }

    #[test]
    fn test_no_members_no_consumption() {
        let mut faction = Faction::new("Ghosts");
        let report = apply_daily_consumption(&mut faction, 5);
        assert!(report.consumed.is_empty());
        assert!(faction.resources.is_none());
    }
}
