//! Plot Hooks
//!
//! Narrative prompts derived from decisions, tick events, relationships and
//! personal dramas. Every generator here is deterministic.

use std::collections::HashSet;

use faction_records::resources::keys;
use faction_records::{Decision, DecisionKind, EventKind, Faction, SimulationEvent};
use faction_sim::diplomacy::{generate_diplomatic_event, DiplomaticEventKind};
use faction_sim::npc::{betrayal_probability, NetworkEvent, NetworkEventKind};
use serde::{Deserialize, Serialize};

use crate::config::ThresholdConfig;

/// Broad kind of story a hook offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookCategory {
    Conflict,
    Alliance,
    Discovery,
    Crisis,
    Opportunity,
    Mystery,
}

/// A story opportunity for the game master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotHook {
    pub title: String,
    pub description: String,
    pub category: HookCategory,
    /// 1 (background) to 5 (immediate).
    pub urgency: u8,
    pub factions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objectives: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rewards: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub complications: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl PlotHook {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: HookCategory,
        urgency: u8,
        factions: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category,
            urgency: urgency.clamp(1, 5),
            factions,
            objectives: Vec::new(),
            rewards: Vec::new(),
            complications: Vec::new(),
        }
    }

    pub fn with_objectives<I, S>(mut self, objectives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.objectives.extend(objectives.into_iter().map(Into::into));
        self
    }

    pub fn with_rewards(mut self, rewards: &[&str]) -> Self {
        self.rewards.extend(owned(rewards));
        self
    }

    pub fn with_complications(mut self, complications: &[&str]) -> Self {
        self.complications.extend(owned(complications));
        self
    }

    pub fn involves(&self, faction: &str) -> bool {
        self.factions.iter().any(|f| f == faction)
    }
}

/// Hooks prompted by a faction's chosen action. Actions with no story angle
/// (gathering, trading, building, resting) yield none.
pub fn from_decision(faction: &Faction, decision: &Decision) -> Vec<PlotHook> {
    let name = faction.name.as_str();
    let solo = || vec![name.to_string()];
    let target = decision.params.target_faction.as_deref();

    let hook = match (decision.kind, target) {
        (DecisionKind::ExpandTerritory, _) => Some(
            PlotHook::new(
                format!("{} Expansion", name),
                format!(
                    "{} seeks to expand their territory. Local settlements and neighbours may not welcome it.",
                    name
                ),
                HookCategory::Conflict,
                3,
                solo(),
            )
            .with_objectives([
                format!("Negotiate with {} to prevent conflict", name),
                "Warn settlements in the expansion path".to_string(),
                format!("Support {} in their expansion", name),
            ])
            .with_complications(&[
                "Local settlements resist",
                "A rival faction objects",
                "Harsh terrain slows the advance",
            ]),
        ),
        (DecisionKind::EstablishCamp, _) => Some(
            PlotHook::new(
                format!("New {} Outpost", name),
                format!(
                    "{} is raising a new camp: a trading chance, a strategic threat or a source of rumours.",
                    name
                ),
                HookCategory::Opportunity,
                2,
                solo(),
            )
            .with_objectives(["Investigate the new camp", "Help with construction", "Trade with the outpost"])
            .with_rewards(&["Trading opportunities", "Faction reputation", "Strategic information"]),
        ),
        (DecisionKind::RaidTarget, Some(victim)) => Some(
            PlotHook::new(
                format!("{} Plans Raid", name),
                format!(
                    "{} is planning a raid against {}. The party could intervene, assist or exploit the chaos.",
                    name, victim
                ),
                HookCategory::Conflict,
                4,
                vec![name.to_string(), victim.to_string()],
            )
            .with_objectives([
                format!("Warn {}", victim),
                format!("Ride with {}", name),
                "Negotiate peace between the factions".to_string(),
                "Use the distraction to pursue other goals".to_string(),
            ])
            .with_complications(&[
                "The raid comes sooner than expected",
                "A third faction gets involved",
                "Civilians are caught in the crossfire",
            ]),
        ),
        (DecisionKind::FormAlliance, Some(partner)) => Some(
            PlotHook::new(
                "Alliance Negotiations",
                format!(
                    "{} is courting {}. An alliance would shift the balance of power in the region.",
                    name, partner
                ),
                HookCategory::Alliance,
                2,
                vec![name.to_string(), partner.to_string()],
            )
            .with_objectives([
                "Facilitate the alliance",
                "Sabotage the negotiations",
                "Broker a better deal for one side",
            ])
            .with_rewards(&["Diplomatic reputation", "Favour from one or both factions"]),
        ),
        (DecisionKind::ResearchMagic, _) => Some(
            PlotHook::new(
                format!("{} Magical Research", name),
                format!(
                    "{} is delving into magical research. Artifacts, forbidden lore or a disaster may follow.",
                    name
                ),
                HookCategory::Mystery,
                2,
                solo(),
            )
            .with_objectives(["Learn what they are researching", "Steal the research notes", "Assist the research"])
            .with_rewards(&["Magical knowledge", "An artifact", "Spell scrolls"])
            .with_complications(&[
                "The research backfires",
                "Other factions covet the knowledge",
                "The work raises ethical alarms",
            ]),
        ),
        (DecisionKind::SendExpedition, _) => Some(
            PlotHook::new(
                format!("{} Expedition", name),
                format!("{} is sending out an expedition. The party could join, shadow or race it.", name),
                HookCategory::Opportunity,
                3,
                solo(),
            )
            .with_objectives(["Join the expedition", "Follow in secret", "Reach the destination first"])
            .with_rewards(&["Treasure", "Discovery", "Faction reputation"]),
        ),
        (DecisionKind::RecruitUnits, _) => Some(
            PlotHook::new(
                format!("{} Recruiting", name),
                format!(
                    "{} is taking on new members: a chance to join, infiltrate or learn their plans.",
                    name
                ),
                HookCategory::Opportunity,
                2,
                solo(),
            )
            .with_objectives(["Join the faction", "Infiltrate as a recruit", "Disrupt the recruitment"]),
        ),
        (DecisionKind::DefendTerritory, _) => Some(
            PlotHook::new(
                format!("{} Under Threat", name),
                format!("{} is fortifying against threats and may hire allies or mercenaries.", name),
                HookCategory::Crisis,
                4,
                solo(),
            )
            .with_objectives(["Offer military assistance", "Investigate the threat", "Exploit their weakness"])
            .with_rewards(&["Gold payment", "Faction gratitude", "Battlefield salvage"]),
        ),
        _ => None,
    };

    hook.into_iter().collect()
}

/// Hook for a tick event. Routine resource and completion events have none.
pub fn from_event(event: &SimulationEvent) -> Option<PlotHook> {
    let base = |category, urgency| {
        PlotHook::new(
            event.title.as_str(),
            event.description.as_str(),
            category,
            urgency,
            vec![event.faction.clone()],
        )
    };

    match event.kind {
        EventKind::Crisis => Some(base(HookCategory::Crisis, event.importance).with_objectives([
            "Investigate the crisis",
            "Offer assistance",
            "Exploit the situation",
        ])),
        EventKind::Discovery => Some(
            base(HookCategory::Discovery, event.importance.saturating_sub(1).max(2))
                .with_objectives(["Learn what was discovered", "Claim the discovery first", "Trade for information"])
                .with_rewards(&["Knowledge", "Treasure", "An artifact"]),
        ),
        EventKind::Conflict => Some(base(HookCategory::Conflict, event.importance).with_objectives([
            "Mediate the conflict",
            "Choose a side",
            "Profit from the chaos",
        ])),
        EventKind::Social => Some(base(HookCategory::Mystery, event.importance).with_objectives([
            "Find out who is behind it",
            "Warn the leadership",
            "Offer the malcontent a way out",
        ])),
        EventKind::Resource | EventKind::Completion => None,
    }
}

/// Hooks from how `faction` regards `other`.
pub fn from_relationship(faction: &Faction, other: &Faction, value: i32, thresholds: &ThresholdConfig) -> Vec<PlotHook> {
    let pair = vec![faction.name.clone(), other.name.clone()];

    let hook = if value < thresholds.war_below {
        PlotHook::new(
            format!("War Between {} and {}", faction.name, other.name),
            format!(
                "{} and {} are locked in bitter conflict that could escalate into open war.",
                faction.name, other.name
            ),
            HookCategory::Conflict,
            5,
            pair,
        )
        .with_objectives([
            "Prevent war through diplomacy",
            "Choose a side and fight",
            "Sell to both sides",
        ])
        .with_complications(&["War breaks out anyway", "Other factions join in", "Civilians suffer"])
    } else if value < thresholds.tension_below {
        PlotHook::new(
            format!("Tensions Rising: {} and {}", faction.name, other.name),
            format!(
                "Relations between {} and {} are souring. A small incident could spark something larger.",
                faction.name, other.name
            ),
            HookCategory::Conflict,
            3,
            pair,
        )
        .with_objectives(["Improve relations", "Find the source of the tension", "Prepare for conflict"])
    } else if value > thresholds.alliance_above {
        PlotHook::new(
            format!("Alliance Opportunity: {} and {}", faction.name, other.name),
            format!(
                "{} and {} are close allies. The bond could be leveraged or threatened.",
                faction.name, other.name
            ),
            HookCategory::Alliance,
            2,
            pair,
        )
        .with_objectives(["Join the alliance", "Strengthen the bond", "Exploit the alliance"])
        .with_rewards(&["Allied support", "Trade benefits", "Strategic advantage"])
    } else {
        return Vec::new();
    };

    vec![hook]
}

fn resource_hooks(faction: &Faction, thresholds: &ThresholdConfig) -> Vec<PlotHook> {
    let name = &faction.name;
    let mut hooks = Vec::new();

    if faction.resource(keys::GOLD) < thresholds.gold_trouble {
        hooks.push(
            PlotHook::new(
                format!("{} Economic Troubles", name),
                format!(
                    "{} is short of coin. They may seek loans, turn to banditry or pay well for services.",
                    name
                ),
                HookCategory::Crisis,
                3,
                vec![name.clone()],
            )
            .with_objectives(["Provide financial aid", "Offer mercenary work", "Take advantage of their weakness"]),
        );
    }

    if faction.resource(keys::FOOD) < thresholds.food_trouble {
        hooks.push(
            PlotHook::new(
                format!("{} Food Shortage", name),
                format!("{} is running low on food and may need to raid, trade or move on.", name),
                HookCategory::Crisis,
                4,
                vec![name.clone()],
            )
            .with_objectives([
                "Bring in food supplies",
                "Help them find new food sources",
                "Protect nearby settlements from raids",
            ]),
        );
    }

    hooks
}

fn goal_hooks(faction: &Faction) -> Vec<PlotHook> {
    let name = &faction.name;
    let mut hooks = Vec::new();

    for goal in faction.goal_tags.iter().map(|g| g.to_lowercase()) {
        if goal.contains("conquest") {
            hooks.push(
                PlotHook::new(
                    format!("{} Expansionist Ambitions", name),
                    format!("{} means to conquer new territory. The region is at risk.", name),
                    HookCategory::Conflict,
                    3,
                    vec![name.clone()],
                )
                .with_objectives(["Oppose their expansion", "Join their conquest", "Warn likely targets"]),
            );
        }
        if goal.contains("knowledge") || goal.contains("research") {
            hooks.push(
                PlotHook::new(
                    format!("{} Seeks Ancient Knowledge", name),
                    format!(
                        "{} is hunting lost lore and artifacts, and may hire adventurers or compete with them.",
                        name
                    ),
                    HookCategory::Mystery,
                    2,
                    vec![name.clone()],
                )
                .with_objectives([
                    "Help them find the knowledge",
                    "Compete for the same discoveries",
                    "Sell them information",
                ])
                .with_rewards(&["Gold payment", "Access to the faction library", "Magical items"]),
            );
        }
    }

    hooks
}

fn treaty_hooks(faction: &Faction) -> Option<PlotHook> {
    let event = generate_diplomatic_event(faction)?;
    (event.kind == DiplomaticEventKind::BetrayalWarning).then(|| {
        PlotHook::new(
            format!("Fraying Alliance: {} and {}", faction.name, event.target_faction),
            event.description,
            HookCategory::Crisis,
            4,
            vec![faction.name.clone(), event.target_faction.clone()],
        )
        .with_objectives(["Mend the alliance", "Find out who is driving the wedge", "Prepare for the break"])
    })
}

fn betrayal_hooks(faction: &Faction, thresholds: &ThresholdConfig) -> Vec<PlotHook> {
    faction
        .members
        .iter()
        .filter(|m| m.is_named && m.is_active())
        .filter_map(|m| {
            let personality = m.personality.as_ref()?;
            (betrayal_probability(personality) > thresholds.betrayal_risk).then(|| {
                PlotHook::new(
                    format!("Traitor in {}", faction.name),
                    format!("{} of {} is quietly losing faith and may turn.", m.name, faction.name),
                    HookCategory::Mystery,
                    4,
                    vec![faction.name.clone()],
                )
                .with_objectives([
                    format!("Uncover what {} is hiding", m.name),
                    "Warn the leadership".to_string(),
                    format!("Recruit {} as an informant", m.name),
                ])
                .with_complications(&["The leadership refuses to believe it", "The traitor has allies"])
            })
        })
        .collect()
}

/// Every hook one faction's current state suggests: shortages, goals,
/// relationships toward factions in `all`, fraying alliances and members
/// likely to betray.
pub fn for_faction(faction: &Faction, all: &[Faction], thresholds: &ThresholdConfig) -> Vec<PlotHook> {
    let mut hooks = resource_hooks(faction, thresholds);
    hooks.extend(goal_hooks(faction));

    for rel in &faction.relationships {
        if let Some(other) = all.iter().find(|f| f.name == rel.faction_name) {
            hooks.extend(from_relationship(faction, other, rel.value, thresholds));
        }
    }

    hooks.extend(treaty_hooks(faction));
    hooks.extend(betrayal_hooks(faction, thresholds));
    hooks
}

/// Hooks for personal dramas inside a faction's social network.
pub fn from_network_events(faction: &Faction, events: &[NetworkEvent]) -> Vec<PlotHook> {
    events
        .iter()
        .map(|event| {
            let (title, category, objectives): (&str, HookCategory, [&str; 2]) = match event.kind {
                NetworkEventKind::LoveTriangle => (
                    "Love Triangle",
                    HookCategory::Mystery,
                    ["Play matchmaker", "Keep the rivals apart"],
                ),
                NetworkEventKind::BetrayalBrewing => (
                    "Betrayal Brewing",
                    HookCategory::Crisis,
                    ["Expose the plot", "Profit from the betrayal"],
                ),
                NetworkEventKind::SecretExposed => (
                    "Secret Exposed",
                    HookCategory::Mystery,
                    ["Contain the secret", "Spread the secret"],
                ),
                NetworkEventKind::AllianceForming => (
                    "Alliance Forming",
                    HookCategory::Alliance,
                    ["Join the circle", "Break it up"],
                ),
                NetworkEventKind::FeudEscalating => (
                    "Feud Escalating",
                    HookCategory::Conflict,
                    ["Broker a truce", "Pick a side"],
                ),
            };
            PlotHook::new(
                format!("{}: {}", title, event.npcs.join(" & ")),
                event.description.as_str(),
                category,
                event.urgency,
                vec![faction.name.clone()],
            )
            .with_objectives(objectives)
        })
        .collect()
}

/// Drops repeated titles (first occurrence wins) and orders by urgency,
/// most urgent first. Equal urgencies keep their order.
pub fn deduplicate(hooks: Vec<PlotHook>) -> Vec<PlotHook> {
    let mut seen = HashSet::new();
    let mut unique: Vec<PlotHook> = hooks
        .into_iter()
        .filter(|hook| seen.insert(hook.title.clone()))
        .collect();
    unique.sort_by(|a, b| b.urgency.cmp(&a.urgency));
    unique
}
