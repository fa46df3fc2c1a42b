//! Shared faction records for the campaign simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace; records are
//! loaded and stored by the host application and handed to the simulation
//! by reference.

pub mod covert;
pub mod decision;
pub mod event;
pub mod faction;
pub mod market;
pub mod military;
pub mod personality;
pub mod relationship;
pub mod resources;
pub mod treaty;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export the aggregate and its parts
pub use faction::{Faction, FactionMember, HexCoord, Job, JobKind, MemberStatus, Position};

pub use covert::{
    DiplomaticIncident, EspionageKind, EspionageOperation, IncidentKind, IncidentResolution,
    IncidentStatus, IntelligenceReport, OperationStatus,
};
pub use decision::{Decision, DecisionKind, DecisionParams};
pub use event::{EventKind, SimulationEvent};
pub use market::{MarketEntry, ProductionChain, TradeRoute, TradeRouteStatus};
pub use military::{EngagementKind, EngagementStatus, MilitaryEngagement, MilitaryUnit};
pub use personality::NpcPersonality;
pub use relationship::{Relationship, RelationshipCategory};
pub use resources::Resources;
pub use treaty::{Treaty, TreatyKind, TreatyStatus};

/// Generates a record id with the given prefix, e.g. `treaty_3f2a...`.
pub fn generate_record_id(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}
