//! Faction AI
//!
//! Turns a faction's goals, stockpiles and surroundings into a single
//! recommended action.
//!
//! Evaluation is a pure function of its inputs:
//! 1. goal and influence tags are folded into [`GoalWeights`]
//! 2. tracked resources are compared against configured minimums
//! 3. candidate decisions are built from shortages, goals, threats,
//!    opportunities and neighbours
//! 4. the highest-priority candidate wins; among equal priorities the
//!    candidate built first wins
//!
//! A faction with nothing to do rests.

use faction_records::resources::keys;
use faction_records::{Decision, DecisionKind, DecisionParams, Faction, Resources};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AiConfig;
use crate::relationships::relationship_value;

/// Base priorities before goal weights are added.
pub mod priority_constants {
    pub const GATHER: u32 = 90;
    pub const GOAL_EXPAND: u32 = 60;
    pub const GOAL_RECRUIT: u32 = 50;
    pub const GOAL_TRADE: u32 = 55;
    pub const GOAL_TRADING_POST: u32 = 45;
    pub const GOAL_RESEARCH: u32 = 50;
    pub const GOAL_FORTIFY: u32 = 40;
    pub const DEFEND: u32 = 80;
    pub const OPPORTUNITY: u32 = 65;
    pub const RAID: u32 = 40;
    pub const ALLIANCE: u32 = 35;
    pub const ALLY_TRADE: u32 = 30;
    pub const REST: u32 = 10;

    /// Relationship below which a neighbour is raided
    pub const RAID_BELOW: i32 = -40;
    /// Inclusive band in which an alliance is sought
    pub const ALLIANCE_BAND: (i32, i32) = (-20, 20);
    /// Relationship above which a neighbour is traded with
    pub const TRADE_ABOVE: i32 = 40;
    /// Stability weight every faction carries at minimum
    pub const STABILITY_FLOOR: u32 = 3;
}

use priority_constants::*;

/// Everything the AI looks at for one evaluation.
#[derive(Debug, Clone)]
pub struct FactionAiContext<'a> {
    pub faction: &'a Faction,
    pub threats: Vec<String>,
    pub opportunities: Vec<String>,
    /// Names of factions close enough to matter.
    pub nearby_factions: Vec<String>,
}

impl<'a> FactionAiContext<'a> {
    pub fn new(faction: &'a Faction) -> Self {
        Self {
            faction,
            threats: Vec::new(),
            opportunities: Vec::new(),
            nearby_factions: Vec::new(),
        }
    }

    pub fn with_threats<I, S>(mut self, threats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.threats.extend(threats.into_iter().map(Into::into));
        self
    }

    pub fn with_opportunities<I, S>(mut self, opportunities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opportunities.extend(opportunities.into_iter().map(Into::into));
        self
    }

    pub fn with_nearby<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nearby_factions.extend(names.into_iter().map(Into::into));
        self
    }
}

/// How strongly a faction leans toward each broad aim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalWeights {
    pub expansion: u32,
    pub wealth: u32,
    pub military: u32,
    pub magic: u32,
    pub influence: u32,
    pub stability: u32,
}

fn mentions(tag: &str, words: &[&str]) -> bool {
    words.iter().any(|w| tag.contains(w))
}

fn is_expansion_goal(goal: &str) -> bool {
    mentions(goal, &["conquest", "expand"])
}

fn is_trade_goal(goal: &str) -> bool {
    mentions(goal, &["trade", "wealth"])
}

fn is_knowledge_goal(goal: &str) -> bool {
    mentions(goal, &["knowledge", "research"])
}

fn is_defense_goal(goal: &str) -> bool {
    mentions(goal, &["defense", "stability"])
}

/// Folds goal and influence tags into weights. Matching is case-insensitive
/// substring search, so "Expand south" counts as expansion.
pub fn calculate_goal_weights(faction: &Faction) -> GoalWeights {
    let mut weights = GoalWeights::default();

    for goal in faction.goal_tags.iter().map(|t| t.to_lowercase()) {
        if is_expansion_goal(&goal) {
            weights.expansion += 10;
            weights.military += 5;
        }
        if mentions(&goal, &["defense", "protect", "stability"]) {
            weights.stability += 10;
            weights.military += 3;
        }
        if mentions(&goal, &["trade", "wealth", "prosperity"]) {
            weights.wealth += 10;
            weights.influence += 5;
        }
        if mentions(&goal, &["knowledge", "research", "magic"]) {
            weights.magic += 10;
        }
        if mentions(&goal, &["influence", "political", "diplomacy"]) {
            weights.influence += 10;
        }
    }

    for tag in faction.influence_tags.iter().map(|t| t.to_lowercase()) {
        if tag.contains("military") {
            weights.military += 5;
        }
        if tag.contains("political") {
            weights.influence += 5;
        }
        if mentions(&tag, &["religious", "scholarly"]) {
            weights.magic += 3;
        }
    }

    if weights.stability == 0 {
        weights.stability = STABILITY_FLOOR;
    }

    weights
}

/// Standing of one tracked resource against its minimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEvaluation {
    pub resource: String,
    pub current: f64,
    pub minimum: f64,
    pub critical: bool,
}

/// Compares each configured minimum with the faction's stock.
///
/// A faction without a resource bag has nothing to run short of and gets no
/// critical flags. With a bag, missing keys count as zero.
pub fn evaluate_resources(faction: &Faction, config: &AiConfig) -> Vec<ResourceEvaluation> {
    let bag = faction.resources.as_ref();
    config
        .resource_minimums
        .iter()
        .map(|(resource, minimum)| {
            let current = bag.map_or(0.0, |r| r.get(resource));
            ResourceEvaluation {
                resource: resource.to_string(),
                current,
                minimum,
                critical: bag.is_some() && current < minimum * config.critical_fraction,
            }
        })
        .collect()
}

fn gather_decision(resource: &str) -> Decision {
    let target = if resource == keys::GOLD { 500.0 } else { 200.0 };
    Decision::new(
        DecisionKind::GatherResources,
        GATHER,
        format!("Critical {} shortage - immediate gathering required", resource),
        7,
    )
    .with_params(DecisionParams {
        resource_type: Some(resource.to_string()),
        target_amount: Some(target),
        ..Default::default()
    })
    .with_outcome(format!("Increase {} reserves", resource))
}

fn goal_decisions(goal: &str, weights: &GoalWeights) -> Vec<Decision> {
    let normalized = goal.to_lowercase();
    let mut decisions = Vec::new();

    if is_expansion_goal(&normalized) {
        decisions.push(
            Decision::new(
                DecisionKind::ExpandTerritory,
                GOAL_EXPAND + weights.expansion,
                format!("Faction goal: {}", goal),
                14,
            )
            .with_outcome("Claim new territory"),
        );
        decisions.push(
            Decision::new(
                DecisionKind::RecruitUnits,
                GOAL_RECRUIT + weights.military,
                format!("Build military for {}", goal),
                10,
            )
            .with_required(Resources::from([(keys::GOLD, 200.0)]))
            .with_outcome("Increase military strength"),
        );
    }

    if is_trade_goal(&normalized) {
        decisions.push(
            Decision::new(
                DecisionKind::TradeResources,
                GOAL_TRADE + weights.wealth,
                format!("Faction goal: {}", goal),
                5,
            )
            .with_outcome("Increase wealth through trade"),
        );
        decisions.push(
            Decision::new(
                DecisionKind::EstablishCamp,
                GOAL_TRADING_POST + weights.wealth,
                "Establish trading post",
                21,
            )
            .with_params(DecisionParams {
                building_type: Some("trading_post".into()),
                ..Default::default()
            })
            .with_required(Resources::from([(keys::GOLD, 500.0), (keys::EQUIPMENT, 100.0)]))
            .with_outcome("Create permanent trade location"),
        );
    }

    if is_knowledge_goal(&normalized) {
        decisions.push(
            Decision::new(
                DecisionKind::ResearchMagic,
                GOAL_RESEARCH + weights.magic,
                format!("Faction goal: {}", goal),
                14,
            )
            .with_required(Resources::from([(keys::MAGIC, 20.0), (keys::GOLD, 100.0)]))
            .with_outcome("Advance magical knowledge"),
        );
    }

    if is_defense_goal(&normalized) {
        decisions.push(
            Decision::new(
                DecisionKind::BuildStructure,
                GOAL_FORTIFY + weights.stability,
                format!("Faction goal: {}", goal),
                21,
            )
            .with_params(DecisionParams {
                building_type: Some("fortification".into()),
                ..Default::default()
            })
            .with_required(Resources::from([(keys::GOLD, 300.0), (keys::EQUIPMENT, 150.0)]))
            .with_outcome("Strengthen defenses"),
        );
    }

    decisions
}

fn defense_decision(threats: &[String], weights: &GoalWeights) -> Decision {
    Decision::new(
        DecisionKind::DefendTerritory,
        DEFEND + weights.stability,
        format!("Active threats: {}", threats.join(", ")),
        7,
    )
    .with_params(DecisionParams {
        threats: threats.to_vec(),
        ..Default::default()
    })
    .with_required(Resources::from([(keys::FOOD, 50.0), (keys::EQUIPMENT, 30.0)]))
    .with_outcome("Protect territory from threats")
}

fn opportunity_decision(opportunities: &[String], weights: &GoalWeights) -> Decision {
    Decision::new(
        DecisionKind::ExpandTerritory,
        OPPORTUNITY + weights.expansion,
        format!("Opportunities available: {}", opportunities.join(", ")),
        14,
    )
    .with_params(DecisionParams {
        opportunities: opportunities.to_vec(),
        ..Default::default()
    })
    .with_required(Resources::from([(keys::GOLD, 200.0), (keys::FOOD, 100.0)]))
    .with_outcome("Claim new territory")
}

fn targeting(name: &str) -> DecisionParams {
    DecisionParams {
        target_faction: Some(name.to_string()),
        ..Default::default()
    }
}

/// At most one candidate per neighbour, chosen by relationship band.
/// Neighbours in the gaps between bands (-40..-20 and 21..=40) get none.
fn diplomacy_decision(faction: &Faction, nearby: &str, weights: &GoalWeights) -> Option<Decision> {
    let value = relationship_value(faction, nearby);
    let (low, high) = ALLIANCE_BAND;

    if value < RAID_BELOW {
        Some(
            Decision::new(
                DecisionKind::RaidTarget,
                RAID + weights.military,
                format!("Hostile faction nearby: {}", nearby),
                3,
            )
            .with_params(targeting(nearby))
            .with_required(Resources::from([(keys::FOOD, 50.0), (keys::EQUIPMENT, 50.0)]))
            .with_outcome(format!("Raid {} for resources", nearby)),
        )
    } else if (low..=high).contains(&value) {
        Some(
            Decision::new(
                DecisionKind::FormAlliance,
                ALLIANCE + weights.influence,
                format!("Neutral faction nearby: {}", nearby),
                7,
            )
            .with_params(targeting(nearby))
            .with_outcome(format!("Improve relations with {}", nearby)),
        )
    } else if value > TRADE_ABOVE {
        Some(
            Decision::new(
                DecisionKind::TradeResources,
                ALLY_TRADE + weights.wealth,
                format!("Allied faction: {}", nearby),
                2,
            )
            .with_params(targeting(nearby))
            .with_outcome(format!("Trade with {}", nearby)),
        )
    } else {
        None
    }
}

fn rest_decision() -> Decision {
    Decision::new(
        DecisionKind::RestAndRecover,
        REST,
        "No pressing needs - consolidate position",
        7,
    )
    .with_outcome("Recover resources and strength")
}

/// Builds every candidate in evaluation order, falling back to rest.
pub fn candidate_decisions(ctx: &FactionAiContext<'_>, config: &AiConfig) -> Vec<Decision> {
    let faction = ctx.faction;
    let weights = calculate_goal_weights(faction);
    let evaluation = evaluate_resources(faction, config);
    let mut candidates = Vec::new();

    for resource in &config.gather_on_critical {
        let critical = evaluation
            .iter()
            .any(|e| e.critical && &e.resource == resource);
        if critical {
            candidates.push(gather_decision(resource));
        }
    }

    for goal in &faction.goal_tags {
        candidates.extend(goal_decisions(goal, &weights));
    }

    if !ctx.threats.is_empty() {
        candidates.push(defense_decision(&ctx.threats, &weights));
    }

    if !ctx.opportunities.is_empty() {
        candidates.push(opportunity_decision(&ctx.opportunities, &weights));
    }

    candidates.extend(
        ctx.nearby_factions
            .iter()
            .filter_map(|nearby| diplomacy_decision(faction, nearby, &weights)),
    );

    if candidates.is_empty() {
        candidates.push(rest_decision());
    }

    candidates
}

/// Picks exactly one decision for the faction.
pub fn evaluate_decision(ctx: &FactionAiContext<'_>, config: &AiConfig) -> Decision {
    let mut candidates = candidate_decisions(ctx, config);

    for candidate in &candidates {
        debug!(
            faction = %ctx.faction.name,
            decision = %candidate.kind,
            priority = candidate.priority,
            "AI candidate"
        );
    }

    // Stable sort keeps build order among equal priorities.
    candidates.sort_by(|a, b| b.priority.cmp(&a.priority));

    candidates.into_iter().next().unwrap_or_else(rest_decision)
}

/// [`evaluate_decision`] with the default resource minimums.
pub fn evaluate_faction_decision(ctx: &FactionAiContext<'_>) -> Decision {
    evaluate_decision(ctx, &AiConfig::default())
}
