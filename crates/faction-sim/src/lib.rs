//! Faction simulation: economy, diplomacy, war and the people in between.
//!
//! Every operation works on [`faction_records::Faction`] records the host
//! loads and stores. A faction is owned independently; operations that
//! touch more than one faction (treaty mirroring, relationship propagation,
//! resource transfers) take every record they change as an explicit
//! argument. Nothing here locks, so callers must not tick the same record
//! from two places at once.
//!
//! # Modules
//!
//! - [`relationships`]: Disposition scores, decay and propagation
//! - [`economy`]: Market pricing, trade routes, production chains, upkeep
//! - [`military`]: Strength, battles, sieges and casualties
//! - [`diplomacy`]: Treaties, espionage, intelligence and incidents
//! - [`hierarchy`]: Subfaction validation, inheritance and transfers
//! - [`npc`]: Named members, personalities and social networks
//! - [`ai`]: One recommended action per evaluation
//! - [`tick`]: Day-by-day advancement of a faction
//! - [`geography`]: Members and camps by position
//!
//! Randomized operations take any `rand::Rng`; [`SimRng`] gives
//! reproducible runs from a seed.

pub mod ai;
pub mod config;
pub mod diplomacy;
pub mod economy;
pub mod error;
pub mod geography;
pub mod hierarchy;
pub mod military;
pub mod npc;
pub mod relationships;
pub mod rng;
pub mod tick;

pub use error::{ErrorCategory, SimError};
pub use rng::SimRng;

// Re-export config types
pub use config::{
    default_config_toml, AiConfig, ConfigError, EconomyConfig, HierarchyConfig,
    RelationshipConfig, SimConfig, TickConfig,
};

// Re-export the decision engine
pub use ai::{
    calculate_goal_weights, candidate_decisions, evaluate_decision, evaluate_faction_decision,
    evaluate_resources, FactionAiContext, GoalWeights, ResourceEvaluation,
};

// Re-export the tick orchestrator
pub use tick::{
    apply_results, simulate_factions, simulate_tick, CompletedJob, SimulationResult,
    SimulationTick,
};

pub use geography::{faction_camps, members_at_hex, Camp};

pub use hierarchy::{
    get_hierarchy, hierarchy_resources, inherit_culture, inherit_resources, root_of, subfactions,
    transfer_resources, validate_all, validate_hierarchy,
};

pub use relationships::{
    decay_relationships, propagate_relationship, relationship_value, update_relationship,
};
