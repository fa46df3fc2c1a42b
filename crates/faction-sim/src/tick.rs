//! Simulation Tick
//!
//! Advances one faction by a number of elapsed days. The host owns the
//! calendar and the faction records; a tick only needs the record, the
//! current date and a random source.
//!
//! Work in progress (member jobs, production chains, NPC moods, expedition
//! injuries) advances in place. Resource and membership changes are
//! collected into a [`SimulationResult`] and land on the record through
//! [`apply_results`], so a host can inspect them first.

use std::collections::BTreeMap;

use faction_records::resources::keys;
use faction_records::{
    EventKind, Faction, FactionMember, JobKind, MemberStatus, Position, SimulationEvent,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{SimConfig, TickConfig};
use crate::economy::{advance_production_chains, daily_consumption_with, trade_income_at};
use crate::npc::personality::personality_constants::DISLOYALTY_TRUST;
use crate::npc::{is_likely_to_betray, update_loyalty};

/// Rewards for finished jobs and expedition finds.
pub mod job_constants {
    /// Jobs complete at this much progress
    pub const COMPLETE_AT: f64 = 100.0;
    pub const CRAFTING_EQUIPMENT: f64 = 50.0;
    pub const GATHERING_YIELD: f64 = 30.0;
    pub const RESEARCH_MAGIC: f64 = 20.0;
    pub const TRAINING_MORALE: u8 = 5;
    /// Gold brought back by an expedition discovery
    pub const EXPEDITION_TREASURE: f64 = 25.0;
}

use job_constants::*;

/// What the host tells the simulation about time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationTick {
    pub current_date: String,
    pub elapsed_days: u32,
}

impl SimulationTick {
    pub fn new(current_date: impl Into<String>, elapsed_days: u32) -> Self {
        Self {
            current_date: current_date.into(),
            elapsed_days,
        }
    }
}

/// A job that reached completion during the tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedJob {
    pub member: String,
    #[serde(rename = "type")]
    pub kind: JobKind,
}

/// Everything a tick wants to change on the record, plus what happened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub faction_name: String,
    /// Signed per-resource deltas.
    pub resource_changes: BTreeMap<String, f64>,
    pub completed_jobs: Vec<CompletedJob>,
    pub new_members: Vec<FactionMember>,
    pub removed_members: Vec<String>,
    pub events: Vec<SimulationEvent>,
    pub warnings: Vec<String>,
}

impl SimulationResult {
    fn new(faction_name: &str) -> Self {
        Self {
            faction_name: faction_name.to_string(),
            ..Default::default()
        }
    }

    fn change(&mut self, resource: &str, delta: f64) {
        if delta != 0.0 {
            *self.resource_changes.entry(resource.to_string()).or_insert(0.0) += delta;
        }
    }

    /// Net change for a resource, 0 when untouched.
    pub fn net(&self, resource: &str) -> f64 {
        self.resource_changes.get(resource).copied().unwrap_or(0.0)
    }
}

struct TickContext<'a> {
    faction: &'a str,
    date: &'a str,
}

impl TickContext<'_> {
    fn event(&self, kind: EventKind, title: &str, description: String, importance: u8) -> SimulationEvent {
        SimulationEvent::new(kind, self.faction, title, description, importance, self.date)
    }
}

fn advance_jobs(faction: &mut Faction, days: u32, config: &TickConfig, ctx: &TickContext<'_>, result: &mut SimulationResult) {
    let step = config.job_progress_per_day * days as f64;

    for member in faction.members.iter_mut().filter(|m| m.is_active()) {
        let Some(job) = member.job.as_mut() else {
            continue;
        };
        job.progress += step;
        if job.progress < COMPLETE_AT {
            continue;
        }

        let kind = job.kind;
        let event = match kind {
            JobKind::Crafting => {
                result.change(keys::EQUIPMENT, CRAFTING_EQUIPMENT);
                ctx.event(
                    EventKind::Completion,
                    "Crafting Complete",
                    format!("{} finished crafting (+{} equipment)", member.name, CRAFTING_EQUIPMENT),
                    1,
                )
            }
            JobKind::Gathering => {
                let resource = job.resource.as_deref().unwrap_or(keys::FOOD);
                result.change(resource, GATHERING_YIELD);
                ctx.event(
                    EventKind::Resource,
                    "Gathering Complete",
                    format!("{} gathered {} {}", member.name, GATHERING_YIELD, resource),
                    1,
                )
            }
            JobKind::Research => {
                result.change(keys::MAGIC, RESEARCH_MAGIC);
                ctx.event(
                    EventKind::Discovery,
                    "Research Breakthrough",
                    format!("{} completed research (+{} magic)", member.name, RESEARCH_MAGIC),
                    2,
                )
            }
            JobKind::Training => {
                if let Some(morale) = member.morale.as_mut() {
                    *morale = morale.saturating_add(TRAINING_MORALE).min(100);
                }
                ctx.event(
                    EventKind::Completion,
                    "Training Complete",
                    format!("{} completed training", member.name),
                    1,
                )
            }
        };

        member.job = None;
        result.events.push(event);
        result.completed_jobs.push(CompletedJob {
            member: member.name.clone(),
            kind,
        });
    }
}

fn book_economy(faction: &mut Faction, days: u32, config: &SimConfig, ctx: &TickContext<'_>, result: &mut SimulationResult) {
    let d = days as f64;

    for (resource, amount) in config.tick.base_production.iter() {
        result.change(resource, amount * d);
    }

    for item in daily_consumption_with(faction, &config.tick.upkeep) {
        result.change(&item.resource, -item.rate * d);
    }

    result.change(keys::GOLD, trade_income_at(faction, config.economy.trade_income_share) * d);

    let (produced, finished) = advance_production_chains(&mut faction.production_chains, days);
    for (resource, amount) in produced.iter() {
        result.change(resource, amount);
    }
    for chain in finished {
        result.events.push(ctx.event(
            EventKind::Completion,
            "Production Complete",
            format!("{} finished a run", chain),
            2,
        ));
    }
}

enum ExpeditionOutcome {
    Discovery,
    Recruits,
    Ambush,
    Lost,
}

fn roll_expeditions<R: Rng + ?Sized>(
    faction: &mut Faction,
    days: u32,
    config: &TickConfig,
    ctx: &TickContext<'_>,
    result: &mut SimulationResult,
    rng: &mut R,
) {
    let chance = config.expedition_event_chance.clamp(0.0, 1.0);

    for member in faction.members.iter_mut().filter(|m| m.is_active()) {
        let Some(Position::Expedition { destination }) = member.position.as_ref() else {
            continue;
        };
        if !(0..days).any(|_| rng.gen_bool(chance)) {
            continue;
        }

        let destination = destination.clone();
        let outcome = match rng.gen_range(0..4) {
            0 => ExpeditionOutcome::Discovery,
            1 => ExpeditionOutcome::Recruits,
            2 => ExpeditionOutcome::Ambush,
            _ => ExpeditionOutcome::Lost,
        };

        let event = match outcome {
            ExpeditionOutcome::Discovery => {
                result.change(keys::GOLD, EXPEDITION_TREASURE);
                ctx.event(
                    EventKind::Discovery,
                    "Expedition Discovery",
                    format!("{} uncovered a cache near {}", member.name, destination),
                    2,
                )
            }
            ExpeditionOutcome::Recruits => {
                let quantity = rng.gen_range(2..=5);
                result.new_members.push(
                    FactionMember::group(format!("Recruits from {}", destination), quantity)
                        .with_role("Worker"),
                );
                ctx.event(
                    EventKind::Resource,
                    "Expedition Recruits",
                    format!("{} persuaded {} locals near {} to join", member.name, quantity, destination),
                    2,
                )
            }
            ExpeditionOutcome::Ambush => {
                member.status = MemberStatus::Injured;
                ctx.event(
                    EventKind::Conflict,
                    "Expedition Ambushed",
                    format!("{} was ambushed near {}", member.name, destination),
                    3,
                )
            }
            ExpeditionOutcome::Lost => {
                result.removed_members.push(member.name.clone());
                ctx.event(
                    EventKind::Crisis,
                    "Expedition Lost",
                    format!("{} vanished on the road to {}", member.name, destination),
                    4,
                )
            }
        };
        result.events.push(event);
    }
}

/// Stock after the booked changes. Absent keys in a present bag count as 0.
fn projected(faction: &Faction, result: &SimulationResult, resource: &str) -> f64 {
    faction.resource(resource) + result.net(resource)
}

fn drift_loyalty<R: Rng + ?Sized>(
    faction: &mut Faction,
    days: u32,
    config: &TickConfig,
    ctx: &TickContext<'_>,
    result: &mut SimulationResult,
    rng: &mut R,
) {
    let loss = config.shortage_trust_loss.saturating_mul(days as i32);

    for member in faction.members.iter_mut().filter(|m| m.is_named && m.is_active()) {
        let Some(personality) = member.personality.as_mut() else {
            continue;
        };
        update_loyalty(personality, -loss, Some("Shortages"), rng);

        if personality.trust < DISLOYALTY_TRUST && is_likely_to_betray(personality, rng) {
            result.warnings.push(format!("{} is plotting against the faction", member.name));
            result.events.push(ctx.event(
                EventKind::Social,
                "Betrayal Brewing",
                format!("{} has lost faith in the leadership (trust {})", member.name, personality.trust),
                4,
            ));
        }
    }
}

fn check_shortages(faction: &Faction, result: &mut SimulationResult) -> bool {
    let mut short = false;
    for resource in [keys::FOOD, keys::GOLD] {
        let stock = projected(faction, result, resource);
        if stock < 0.0 {
            short = true;
            result
                .warnings
                .push(format!("Upkeep exceeds {} stores by {:.0}", resource, -stock));
        }
    }
    short
}

fn check_crises(faction: &Faction, config: &TickConfig, ctx: &TickContext<'_>, result: &mut SimulationResult) {
    let Some(bag) = faction.resources.as_ref() else {
        return;
    };

    if bag.contains_key(keys::FOOD) {
        let food = projected(faction, result, keys::FOOD);
        if food < config.food_crisis_threshold {
            result.warnings.push(format!("Critical food shortage: {:.0} remaining", food.max(0.0)));
            result.events.push(ctx.event(
                EventKind::Crisis,
                "Food Shortage",
                format!("{} is running out of food", ctx.faction),
                4,
            ));
        }
    }

    if bag.contains_key(keys::GOLD) {
        let gold = projected(faction, result, keys::GOLD);
        if gold < config.gold_crisis_threshold {
            result.warnings.push(format!("Critical gold shortage: {:.0} remaining", gold.max(0.0)));
            result.events.push(ctx.event(
                EventKind::Crisis,
                "Economic Crisis",
                format!("{} cannot pay its way", ctx.faction),
                3,
            ));
        }
    }
}

/// Simulates `tick.elapsed_days` days for one faction.
pub fn simulate_tick<R: Rng + ?Sized>(
    faction: &mut Faction,
    tick: &SimulationTick,
    config: &SimConfig,
    rng: &mut R,
) -> SimulationResult {
    let name = faction.name.clone();
    let ctx = TickContext {
        faction: &name,
        date: &tick.current_date,
    };
    let days = tick.elapsed_days;
    let mut result = SimulationResult::new(&name);

    advance_jobs(faction, days, &config.tick, &ctx, &mut result);
    book_economy(faction, days, config, &ctx, &mut result);
    roll_expeditions(faction, days, &config.tick, &ctx, &mut result, rng);

    if check_shortages(faction, &mut result) {
        drift_loyalty(faction, days, &config.tick, &ctx, &mut result, rng);
    }
    check_crises(faction, &config.tick, &ctx, &mut result);

    if !result.warnings.is_empty() {
        warn!(faction = %name, warnings = ?result.warnings, "Faction in difficulty");
    }
    result
}

/// Writes a tick's changes onto the record. Resources floor at 0; a missing
/// resource bag is created.
pub fn apply_results(faction: &mut Faction, result: &SimulationResult) {
    if !result.resource_changes.is_empty() {
        let bag = faction.resources_mut();
        for (resource, delta) in &result.resource_changes {
            bag.add(resource, *delta);
        }
    }

    if !result.removed_members.is_empty() {
        faction
            .members
            .retain(|m| !result.removed_members.contains(&m.name));
    }
    faction.members.extend(result.new_members.iter().cloned());
}

/// Ticks each faction independently and applies the results.
pub fn simulate_factions<R: Rng + ?Sized>(
    factions: &mut [Faction],
    tick: &SimulationTick,
    config: &SimConfig,
    rng: &mut R,
) -> Vec<SimulationResult> {
    let results: Vec<SimulationResult> = factions
        .iter_mut()
        .map(|faction| {
            let result = simulate_tick(faction, tick, config, rng);
            apply_results(faction, &result);
            result
        })
        .collect();

    info!(
        date = %tick.current_date,
        days = tick.elapsed_days,
        factions = results.len(),
        events = results.iter().map(|r| r.events.len()).sum::<usize>(),
        "Faction tick complete"
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use faction_records::{Job, NpcPersonality, Resources};
    use rand::rngs::mock::StepRng;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn day() -> SimulationTick {
        SimulationTick::new("1492-03-15", 1)
    }

    fn worker(name: &str, kind: JobKind, progress: f64) -> FactionMember {
        let mut job = Job::new(kind);
        job.progress = progress;
        FactionMember::named(name).with_job(job)
    }

    fn tick(faction: &mut Faction, days: u32) -> SimulationResult {
        let mut rng = SmallRng::seed_from_u64(1);
        simulate_tick(faction, &SimulationTick::new("1492-03-15", days), &SimConfig::default(), &mut rng)
    }

    #[test]
    fn test_crafting_job_completes() {
        let mut faction = Faction::new("Smiths")
            .with_resources(Resources::from([(keys::EQUIPMENT, 100.0)]))
            .with_member(worker("Smith John", JobKind::Crafting, 95.0));
        let result = tick(&mut faction, 1);

        assert_eq!(result.completed_jobs.len(), 1);
        assert_eq!(result.completed_jobs[0].kind, JobKind::Crafting);
        assert_eq!(result.net(keys::EQUIPMENT), 50.0);
        assert_eq!(result.events[0].kind, EventKind::Completion);
        assert!(faction.members[0].job.is_none());
    }

    #[test]
    fn test_gathering_job_yields_its_resource() {
        let mut job = Job::new(JobKind::Gathering);
        job.progress = 92.0;
        job.resource = Some(keys::GOLD.into());
        let mut faction = Faction::new("Miners")
            .with_resources(Resources::from([(keys::GOLD, 500.0)]))
            .with_member(FactionMember::named("Jane").with_job(job));
        let result = tick(&mut faction, 1);

        // 30 gathered + 10 produced - 2 wages
        assert_eq!(result.net(keys::GOLD), 38.0);
        assert!(result.events.iter().any(|e| e.kind == EventKind::Resource));
    }

    #[test]
    fn test_research_job_yields_magic() {
        let mut faction = Faction::new("Sages").with_member(worker("Orin", JobKind::Research, 90.0));
        let result = tick(&mut faction, 1);
        assert_eq!(result.net(keys::MAGIC), 20.0);
        assert!(result.events.iter().any(|e| e.kind == EventKind::Discovery));
    }

    #[test]
    fn test_training_raises_morale() {
        let mut job = Job::new(JobKind::Training);
        job.progress = 99.0;
        let mut faction = Faction::new("Drillyard").with_member(
            FactionMember::group("Pikes", 20)
                .with_combat_stats(40, 60, 40)
                .with_job(job),
        );
        tick(&mut faction, 1);
        assert_eq!(faction.members[0].morale, Some(65));
    }

    #[test]
    fn test_job_progress_accumulates() {
        let mut faction = Faction::new("Slow").with_member(worker("Worker", JobKind::Crafting, 50.0));
        let result = tick(&mut faction, 3);

        assert!(result.completed_jobs.is_empty());
        assert_eq!(faction.members[0].job.as_ref().map(|j| j.progress), Some(80.0));
    }

    #[test]
    fn test_inactive_members_idle() {
        let mut member = worker("Hurt", JobKind::Crafting, 99.0);
        member.status = MemberStatus::Injured;
        let mut faction = Faction::new("Infirmary").with_member(member);
        let result = tick(&mut faction, 1);
        assert!(result.completed_jobs.is_empty());
    }

    #[test]
    fn test_base_production_and_upkeep() {
        let mut faction = Faction::new("Village")
            .with_resources(Resources::from([(keys::FOOD, 500.0), (keys::GOLD, 1000.0)]))
            .with_member(FactionMember::named("A"))
            .with_member(FactionMember::named("B"))
            .with_member(FactionMember::named("C"));
        let result = tick(&mut faction, 1);

        assert_eq!(result.net(keys::FOOD), 2.0);
        assert_eq!(result.net(keys::GOLD), 4.0);
        assert_eq!(result.net(keys::INFLUENCE), 1.0);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_food_crisis() {
        let mut faction = Faction::new("Starving").with_resources(Resources::from([(keys::FOOD, 40.0)]));
        let result = tick(&mut faction, 1);

        assert!(result.warnings.iter().any(|w| w.contains("food")));
        assert!(result
            .events
            .iter()
            .any(|e| e.kind == EventKind::Crisis && e.title.contains("Food")));
        assert!(!result.events.iter().any(|e| e.title.contains("Economic")));
    }

    #[test]
    fn test_gold_crisis() {
        let mut faction = Faction::new("Bankrupt").with_resources(Resources::from([(keys::GOLD, 80.0)]));
        let result = tick(&mut faction, 1);

        assert!(result.warnings.iter().any(|w| w.contains("gold")));
        assert!(result
            .events
            .iter()
            .any(|e| e.kind == EventKind::Crisis && e.title.contains("Economic")));
    }

    #[test]
    fn test_shortage_erodes_trust() {
        let personality = NpcPersonality {
            trust: 60,
            ambition: 50,
            ..Default::default()
        };
        let mut faction = Faction::new("Unpaid")
            .with_resources(Resources::from([(keys::GOLD, 0.0), (keys::FOOD, 1000.0)]))
            .with_member(FactionMember::named("Sella").with_personality(personality));
        // 10 gold produced against 2 wages a day never runs short, so add mouths.
        for i in 0..10 {
            faction.members.push(FactionMember::named(format!("Hand {}", i)));
        }
        let result = tick(&mut faction, 2);

        assert!(result.warnings.iter().any(|w| w.contains("gold stores")));
        let sella = faction.member("Sella").and_then(|m| m.personality.as_ref()).unwrap();
        assert_eq!(sella.trust, 56);
        assert!(sella.loyalties.iter().any(|l| l.starts_with("Resentful")));
    }

    #[test]
    fn test_expedition_events() {
        let explorer = FactionMember::named("Explorer").with_position(Position::Expedition {
            destination: "Northern Border".into(),
        });
        let mut faction = Faction::new("Wayfarers").with_member(explorer);

        // StepRng(0, 0): every roll hits and picks the first outcome.
        let mut rng = StepRng::new(0, 0);
        let result = simulate_tick(&mut faction, &day(), &SimConfig::default(), &mut rng);

        assert!(result
            .events
            .iter()
            .any(|e| e.kind == EventKind::Discovery && e.title == "Expedition Discovery"));
        assert_eq!(result.net(keys::GOLD), 10.0 - 2.0 + EXPEDITION_TREASURE);
    }

    #[test]
    fn test_apply_results() {
        let mut faction = Faction::new("Ledger")
            .with_resources(Resources::from([(keys::GOLD, 100.0), (keys::FOOD, 50.0)]))
            .with_member(FactionMember::named("Member 1"))
            .with_member(FactionMember::named("Member 2"));

        let mut result = SimulationResult::new("Ledger");
        result.change(keys::GOLD, 50.0);
        result.change(keys::FOOD, -80.0);
        result.removed_members.push("Member 2".into());
        result.new_members.push(FactionMember::named("New Recruit"));
        apply_results(&mut faction, &result);

        assert_eq!(faction.resource(keys::GOLD), 150.0);
        assert_eq!(faction.resource(keys::FOOD), 0.0);
        let names: Vec<_> = faction.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Member 1", "New Recruit"]);
    }

    #[test]
    fn test_apply_results_creates_bag() {
        let mut faction = Faction::new("Fresh");
        let mut result = SimulationResult::new("Fresh");
        result.change(keys::GOLD, 100.0);
        apply_results(&mut faction, &result);
        assert_eq!(faction.resource(keys::GOLD), 100.0);
    }

    #[test]
    fn test_simulate_factions_applies_each() {
        let mut factions = vec![
            Faction::new("One").with_resources(Resources::from([(keys::GOLD, 500.0)])),
            Faction::new("Two"),
        ];
        let mut rng = SmallRng::seed_from_u64(9);
        let results = simulate_factions(&mut factions, &day(), &SimConfig::default(), &mut rng);

        assert_eq!(results.len(), 2);
        assert_eq!(factions[0].resource(keys::GOLD), 510.0);
        assert_eq!(factions[1].resource(keys::FOOD), 5.0);
    }
}
