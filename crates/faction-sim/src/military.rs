//! Military Resolver
//!
//! Unit strength, battle and siege resolution, casualties, morale and
//! tactical advice. Engagements live in the attacker's history and move
//! from `Ongoing` to a final status once resolved.

use faction_records::{
    generate_record_id, EngagementKind, EngagementStatus, Faction, MilitaryEngagement, MilitaryUnit,
};
use serde::{Deserialize, Serialize};

use crate::relationships::degrade_mutual;
use crate::SimError;

/// Constants for combat resolution
pub mod combat_constants {
    /// Defender multiplier in open battle
    pub const OPEN_FIELD_DEFENSE_BONUS: f64 = 1.2;
    /// Defender multiplier behind walls
    pub const SIEGE_DEFENSE_BONUS: f64 = 1.5;
    /// Stats assumed for members with no combat stats
    pub const DEFAULT_TRAINING: u8 = 50;
    pub const DEFAULT_MORALE: u8 = 70;
    pub const DEFAULT_EQUIPMENT: u8 = 50;
    /// Relationship lost both ways when an engagement starts
    pub const ENGAGEMENT_HOSTILITY: i32 = 20;
    /// Morale swing for the attacker after a battle
    pub const MORALE_ON_VICTORY: i32 = 10;
    pub const MORALE_ON_DEFEAT: i32 = -20;
    pub const MORALE_ON_STALEMATE: i32 = -10;
    /// Days before a siege can be decided
    pub const SIEGE_MIN_DAYS: u32 = 10;
    /// Days after which the defender starves
    pub const SIEGE_STARVATION_DAYS: u32 = 30;
    pub const SIEGE_BREAKTHROUGH_RATIO: f64 = 2.0;
    pub const SIEGE_REPELLED_RATIO: f64 = 0.8;
    /// Daily losses while a siege drags on, in percent of troops
    pub const SIEGE_ATTACKER_ATTRITION: f64 = 2.0;
    pub const SIEGE_DEFENDER_ATTRITION: f64 = 1.0;
    /// Veterancy gained per engagement survived
    pub const VETERANCY_ON_VICTORY: u8 = 10;
    pub const VETERANCY_ON_SURVIVAL: u8 = 5;
}

use combat_constants::*;

/// Effective strength of one unit, before flooring.
pub fn unit_strength(unit: &MilitaryUnit) -> f64 {
    unit.quantity as f64
        * (1.0 + unit.training as f64 / 100.0)
        * (1.0 + unit.morale as f64 / 100.0)
        * (1.0 + unit.equipment as f64 / 100.0)
        * veterancy_bonus(unit.veterancy)
}

/// `floor(Σ quantity × (1+training/100) × (1+morale/100) × (1+equipment/100))`,
/// further scaled by veterancy.
pub fn calculate_strength(units: &[MilitaryUnit]) -> u32 {
    units.iter().map(unit_strength).sum::<f64>().floor() as u32
}

/// Combat multiplier from experience.
pub fn veterancy_bonus(veterancy: u8) -> f64 {
    1.0 + veterancy.min(100) as f64 / 200.0
}

/// Experience band of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VeterancyRank {
    Green,
    Trained,
    Experienced,
    Veteran,
    Elite,
}

impl VeterancyRank {
    pub fn from_veterancy(veterancy: u8) -> Self {
        match veterancy {
            0..=19 => VeterancyRank::Green,
            20..=39 => VeterancyRank::Trained,
            40..=59 => VeterancyRank::Experienced,
            60..=79 => VeterancyRank::Veteran,
            _ => VeterancyRank::Elite,
        }
    }
}

/// Converts active members into units, filling missing combat stats with
/// defaults.
pub fn members_to_units(faction: &Faction) -> Vec<MilitaryUnit> {
    faction
        .members
        .iter()
        .filter(|m| m.is_active())
        .map(|m| {
            MilitaryUnit::new(
                m.name.clone(),
                m.headcount(),
                m.training.unwrap_or(DEFAULT_TRAINING),
                m.morale.unwrap_or(DEFAULT_MORALE),
                m.equipment.unwrap_or(DEFAULT_EQUIPMENT),
            )
        })
        .collect()
}

/// Records a new ongoing engagement in the attacker's history and sours
/// relations both ways. Returns the engagement id.
pub fn initiate_engagement(
    attacker: &mut Faction,
    defender: &mut Faction,
    kind: EngagementKind,
    units: Vec<MilitaryUnit>,
    location: Option<String>,
    date: &str,
) -> String {
    let id = generate_record_id("engagement");
    tracing::info!(
        attacker = %attacker.name,
        defender = %defender.name,
        kind = ?kind,
        troops = head_count(&units),
        "Engagement initiated"
    );
    attacker.military_engagements.push(MilitaryEngagement {
        id: id.clone(),
        kind,
        opponent: defender.name.clone(),
        location,
        started: date.to_string(),
        status: EngagementStatus::Ongoing,
        committed_units: units,
        casualties: 0,
    });
    degrade_mutual(attacker, defender, ENGAGEMENT_HOSTILITY);
    id
}

/// Ongoing engagements.
pub fn active_engagements(faction: &Faction) -> Vec<&MilitaryEngagement> {
    faction.military_engagements.iter().filter(|e| e.is_ongoing()).collect()
}

/// Adjusts morale by `delta`, clamped to [0, 100].
pub fn update_morale(unit: &mut MilitaryUnit, delta: i32) {
    unit.morale = (unit.morale as i32 + delta).clamp(0, 100) as u8;
}

/// Who came out ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Victor {
    Attacker,
    Defender,
    Stalemate,
}

/// Outcome band for a strength ratio: victor and casualty percentages for
/// attacker and defender.
pub fn battle_band(ratio: f64) -> (Victor, u32, u32) {
    if ratio > 1.5 {
        (Victor::Attacker, 10, 50)
    } else if ratio >= 1.1 {
        (Victor::Attacker, 25, 40)
    } else if ratio < 0.67 {
        (Victor::Defender, 50, 10)
    } else if ratio < 0.9 {
        (Victor::Defender, 40, 25)
    } else {
        (Victor::Stalemate, 30, 30)
    }
}

/// Result of one pitched battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub victor: Victor,
    pub strength_ratio: f64,
    pub attacker_strength: u32,
    pub defender_strength: u32,
    pub attacker_casualties: u32,
    pub defender_casualties: u32,
    pub morale_change: i32,
}

fn ongoing_engagement<'a>(faction: &'a mut Faction, engagement_id: &str) -> Result<&'a mut MilitaryEngagement, SimError> {
    let engagement = faction
        .engagement_mut(engagement_id)
        .ok_or_else(|| SimError::not_found("Engagement", engagement_id))?;
    if !engagement.is_ongoing() {
        return Err(SimError::InvalidState {
            entity: format!("engagement {}", engagement_id),
            status: format!("{:?}", engagement.status).to_lowercase(),
            operation: "resolve",
        });
    }
    Ok(engagement)
}

fn strength_ratio(attacker_strength: u32, defender_strength: u32, defense_bonus: f64) -> f64 {
    let defended = defender_strength as f64 * defense_bonus;
    if defended <= 0.0 {
        f64::INFINITY
    } else {
        attacker_strength as f64 / defended
    }
}

/// Total heads across units, summed wide so large armies cannot overflow.
fn head_count(units: &[MilitaryUnit]) -> u64 {
    units.iter().map(|u| u64::from(u.quantity)).sum()
}

/// Whole-number share of `troops`, capped at `u32::MAX`.
fn percent_of(troops: u64, percent: f64) -> u32 {
    (troops as f64 * percent / 100.0).floor() as u32
}

/// Resolves a battle between the engagement's committed units and
/// `defender_units`, applying casualties to both factions.
pub fn simulate_battle(
    attacker: &mut Faction,
    defender: &mut Faction,
    engagement_id: &str,
    defender_units: &[MilitaryUnit],
) -> Result<BattleOutcome, SimError> {
    let engagement = ongoing_engagement(attacker, engagement_id)?;
    let defense_bonus = match engagement.kind {
        EngagementKind::Siege => SIEGE_DEFENSE_BONUS,
        _ => OPEN_FIELD_DEFENSE_BONUS,
    };

    let attacker_strength = calculate_strength(&engagement.committed_units);
    let defender_strength = calculate_strength(defender_units);
    let ratio = strength_ratio(attacker_strength, defender_strength, defense_bonus);
    let (victor, attacker_pct, defender_pct) = battle_band(ratio);

    let attacker_troops = head_count(&engagement.committed_units);
    let defender_troops = head_count(defender_units);
    let attacker_casualties = percent_of(attacker_troops, f64::from(attacker_pct));
    let defender_casualties = percent_of(defender_troops, f64::from(defender_pct));

    let (status, morale_change) = match victor {
        Victor::Attacker => (EngagementStatus::Victory, MORALE_ON_VICTORY),
        Victor::Defender => (EngagementStatus::Defeat, MORALE_ON_DEFEAT),
        Victor::Stalemate => (EngagementStatus::Stalemate, MORALE_ON_STALEMATE),
    };

    let committed = engagement.committed_units.clone();
    conclude_engagement(engagement, status, attacker_casualties, morale_change);
    apply_casualties(attacker, attacker_casualties, &committed);
    apply_casualties(defender, defender_casualties, defender_units);

    tracing::info!(
        attacker = %attacker.name,
        defender = %defender.name,
        ratio,
        victor = ?victor,
        attacker_casualties,
        defender_casualties,
        "Battle resolved"
    );

    Ok(BattleOutcome {
        victor,
        strength_ratio: ratio,
        attacker_strength,
        defender_strength,
        attacker_casualties,
        defender_casualties,
        morale_change,
    })
}

/// Writes losses, morale and experience onto the engagement's own units.
fn conclude_engagement(
    engagement: &mut MilitaryEngagement,
    status: EngagementStatus,
    casualties: u32,
    morale_change: i32,
) {
    let losses = distribute_losses(casualties, &engagement.committed_units);
    let gain = if status == EngagementStatus::Victory {
        VETERANCY_ON_VICTORY
    } else {
        VETERANCY_ON_SURVIVAL
    };
    for (unit, loss) in engagement.committed_units.iter_mut().zip(losses) {
        unit.quantity = unit.quantity.saturating_sub(loss);
        update_morale(unit, morale_change);
        unit.veterancy = unit.veterancy.saturating_add(gain).min(100);
    }
    engagement.committed_units.retain(|u| u.quantity > 0);
    engagement.casualties = engagement.casualties.saturating_add(casualties);
    engagement.status = status;
}

/// Splits `casualties` across units in proportion to their quantity.
fn distribute_losses(casualties: u32, units: &[MilitaryUnit]) -> Vec<u32> {
    let total: u64 = units.iter().map(|u| u.quantity as u64).sum();
    if total == 0 {
        return vec![0; units.len()];
    }
    let casualties = casualties as u64;
    let mut losses: Vec<u32> = units
        .iter()
        .map(|u| (casualties * u.quantity as u64 / total) as u32)
        .collect();

    // Floor leftovers go to units in order.
    let mut remaining = casualties.saturating_sub(losses.iter().map(|l| *l as u64).sum::<u64>());
    for loss in losses.iter_mut() {
        if remaining == 0 {
            break;
        }
        *loss += 1;
        remaining -= 1;
    }
    losses
}

/// Reduces matching members proportionally to the engaged units' sizes.
/// Members reaching zero are removed. Returns the troops actually lost.
pub fn apply_casualties(faction: &mut Faction, casualties: u32, engaged: &[MilitaryUnit]) -> u32 {
    let losses = distribute_losses(casualties, engaged);
    let mut lost: u32 = 0;
    let mut fallen = Vec::new();

    for (unit, loss) in engaged.iter().zip(losses) {
        let Some(member) = faction.member_mut(&unit.name) else {
            continue;
        };
        let headcount = member.headcount();
        if loss >= headcount {
            lost = lost.saturating_add(headcount);
            fallen.push(member.name.clone());
        } else {
            lost = lost.saturating_add(loss);
            member.quantity = Some(headcount - loss);
        }
    }

    if !fallen.is_empty() {
        faction.members.retain(|m| !fallen.contains(&m.name));
        tracing::info!(faction = %faction.name, fallen = ?fallen, "Members lost in combat");
    }
    lost
}

/// State of a siege after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiegeStatus {
    Ongoing,
    Breakthrough,
    StarvedOut,
    Repelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiegeOutcome {
    pub status: SiegeStatus,
    pub days_elapsed: u32,
    pub strength_ratio: f64,
    pub attacker_casualties: u32,
    pub defender_casualties: u32,
}

/// Resolves a siege `days_elapsed` days in.
///
/// Fewer than 10 days keeps the siege going with daily attrition. After
/// that a 2:1 advantage breaks through, a defender past 30 days starves,
/// and an attacker below 0.8 is repelled.
pub fn resolve_siege(
    attacker: &mut Faction,
    defender: &mut Faction,
    engagement_id: &str,
    defender_units: &[MilitaryUnit],
    days_elapsed: u32,
) -> Result<SiegeOutcome, SimError> {
    let engagement = ongoing_engagement(attacker, engagement_id)?;
    if engagement.kind != EngagementKind::Siege {
        return Err(SimError::InvalidState {
            entity: format!("engagement {}", engagement_id),
            status: format!("{:?}", engagement.kind).to_lowercase(),
            operation: "resolve as siege",
        });
    }

    let attacker_strength = calculate_strength(&engagement.committed_units);
    let defender_strength = calculate_strength(defender_units);
    let ratio = strength_ratio(attacker_strength, defender_strength, SIEGE_DEFENSE_BONUS);

    let status = if days_elapsed < SIEGE_MIN_DAYS {
        SiegeStatus::Ongoing
    } else if ratio > SIEGE_BREAKTHROUGH_RATIO {
        SiegeStatus::Breakthrough
    } else if days_elapsed > SIEGE_STARVATION_DAYS {
        SiegeStatus::StarvedOut
    } else if ratio < SIEGE_REPELLED_RATIO {
        SiegeStatus::Repelled
    } else {
        SiegeStatus::Ongoing
    };

    let attacker_troops = head_count(&engagement.committed_units);
    let defender_troops = head_count(defender_units);
    let (attacker_pct, defender_pct) = match status {
        SiegeStatus::Ongoing => (
            (SIEGE_ATTACKER_ATTRITION * days_elapsed as f64).min(100.0),
            (SIEGE_DEFENDER_ATTRITION * days_elapsed as f64).min(100.0),
        ),
        SiegeStatus::Breakthrough => (10.0, 50.0),
        SiegeStatus::StarvedOut => (10.0, 40.0),
        SiegeStatus::Repelled => (40.0, 10.0),
    };
    let attacker_casualties = percent_of(attacker_troops, attacker_pct);
    let defender_casualties = percent_of(defender_troops, defender_pct);

    let committed = engagement.committed_units.clone();
    match status {
        SiegeStatus::Ongoing => {
            let losses = distribute_losses(attacker_casualties, &engagement.committed_units);
            for (unit, loss) in engagement.committed_units.iter_mut().zip(losses) {
                unit.quantity = unit.quantity.saturating_sub(loss);
            }
            engagement.committed_units.retain(|u| u.quantity > 0);
            engagement.casualties = engagement.casualties.saturating_add(attacker_casualties);
        }
        SiegeStatus::Breakthrough | SiegeStatus::StarvedOut => {
            conclude_engagement(engagement, EngagementStatus::Victory, attacker_casualties, MORALE_ON_VICTORY)
        }
        SiegeStatus::Repelled => {
            conclude_engagement(engagement, EngagementStatus::Defeat, attacker_casualties, MORALE_ON_DEFEAT)
        }
    }
    apply_casualties(attacker, attacker_casualties, &committed);
    apply_casualties(defender, defender_casualties, defender_units);

    tracing::info!(
        attacker = %attacker.name,
        defender = %defender.name,
        days_elapsed,
        ratio,
        status = ?status,
        "Siege resolved"
    );

    Ok(SiegeOutcome {
        status,
        days_elapsed,
        strength_ratio: ratio,
        attacker_casualties,
        defender_casualties,
    })
}

/// Battlefield terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Open,
    Forest,
    Mountain,
    Hills,
    Swamp,
    Urban,
}

/// Recommended course of action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TacticalAction {
    Attack,
    Retreat,
    Defend,
    Flank,
    Ambush,
}

/// Advice from the own/enemy strength ratio and terrain. Near-even fights
/// in forest favor an ambush, in mountains a flanking move.
pub fn tactical_decision(own_strength: u32, enemy_strength: u32, terrain: Terrain) -> TacticalAction {
    if enemy_strength == 0 {
        return TacticalAction::Attack;
    }
    let ratio = own_strength as f64 / enemy_strength as f64;
    if ratio > 1.8 {
        TacticalAction::Attack
    } else if ratio < 0.5 {
        TacticalAction::Retreat
    } else if (0.8..=1.2).contains(&ratio) {
        match terrain {
            Terrain::Forest => TacticalAction::Ambush,
            Terrain::Mountain => TacticalAction::Flank,
            _ => TacticalAction::Defend,
        }
    } else {
        TacticalAction::Defend
    }
}
