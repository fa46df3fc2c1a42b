//! Diplomacy Engine
//!
//! Treaty lifecycle and negotiation, covert operations and intelligence,
//! and diplomatic incidents.
//!
//! Treaties are mirrored: every party holds its own copy with the same id,
//! and every lifecycle change is written to all copies handed in.

pub mod covert;
pub mod incidents;
pub mod treaties;

pub use covert::{
    counter_espionage, create_secret_treaty, espionage_success_chance, gather_intelligence, launch_espionage,
    operation_cost, plant_false_intelligence, resolve_espionage, reveal_secret_treaty,
    secret_treaties, EspionageOutcome,
};
pub use incidents::{
    apply_incident_impact, border_dispute_incident, create_incident, espionage_incident,
    incidents_with, resolve_incident, treaty_breach_incident, unresolved_incidents,
};
pub use treaties::{
    acceptance_boost, active_treaties, expire_treaties, generate_diplomatic_event,
    has_active_treaty, is_treaty_expired, minimum_relationship, negotiate_terms, nullify_treaty,
    propose_treaty, renew_treaty, treaties_with, violate_treaty, DiplomaticEvent,
    DiplomaticEventKind, NegotiationOutcome, ProposalOutcome, TreatyProposal,
};
