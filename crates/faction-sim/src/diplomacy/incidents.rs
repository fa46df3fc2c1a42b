//! Diplomatic Incidents

use faction_records::{
    generate_record_id, DiplomaticIncident, Faction, IncidentKind, IncidentResolution,
    IncidentStatus, Treaty,
};

use crate::relationships::update_relationship;
use crate::SimError;

/// Default impacts of generated incidents.
pub mod incident_constants {
    pub const SPY_DISCOVERED_IMPACT: i32 = -40;
    pub const TREATY_BREACH_IMPACT: i32 = -60;
    pub const BORDER_DISPUTE_IMPACT: i32 = -20;
}

/// Records an incident on `faction`, listing it first among the involved.
pub fn create_incident(
    faction: &mut Faction,
    kind: IncidentKind,
    involved: &[&str],
    relationship_impact: i32,
    description: impl Into<String>,
    date: impl Into<String>,
) -> DiplomaticIncident {
    let mut factions = Vec::with_capacity(involved.len() + 1);
    factions.push(faction.name.clone());
    factions.extend(involved.iter().map(|s| s.to_string()));

    let incident = DiplomaticIncident {
        id: generate_record_id("incident"),
        kind,
        factions,
        description: description.into(),
        relationship_impact,
        date: date.into(),
        status: IncidentStatus::Unresolved,
    };
    tracing::info!(
        faction = %faction.name,
        kind = ?incident.kind,
        impact = relationship_impact,
        "Diplomatic incident"
    );
    faction.diplomatic_incidents.push(incident.clone());
    incident
}

/// Negotiation halves the impact (rounding toward more negative);
/// escalation doubles it.
pub fn resolve_incident(
    faction: &mut Faction,
    incident_id: &str,
    resolution: IncidentResolution,
) -> Result<(), SimError> {
    let incident = faction
        .diplomatic_incidents
        .iter_mut()
        .find(|i| i.id == incident_id)
        .ok_or_else(|| SimError::not_found("Incident", incident_id))?;

    if incident.status != IncidentStatus::Unresolved {
        return Err(SimError::InvalidState {
            entity: format!("incident {}", incident_id),
            status: format!("{:?}", incident.status).to_lowercase(),
            operation: "resolve",
        });
    }

    match resolution {
        IncidentResolution::Negotiated => {
            incident.status = IncidentStatus::Resolved;
            incident.relationship_impact = incident.relationship_impact.div_euclid(2);
        }
        IncidentResolution::Escalated => {
            incident.status = IncidentStatus::Escalated;
            incident.relationship_impact = incident.relationship_impact.saturating_mul(2);
        }
    }
    Ok(())
}

pub fn espionage_incident(
    faction: &mut Faction,
    target: &str,
    operation: &str,
    date: impl Into<String>,
) -> DiplomaticIncident {
    let description = format!("{} was caught conducting a {} operation", faction.name, operation);
    create_incident(
        faction,
        IncidentKind::SpyDiscovered,
        &[target],
        incident_constants::SPY_DISCOVERED_IMPACT,
        description,
        date,
    )
}

pub fn treaty_breach_incident(
    faction: &mut Faction,
    treaty: &Treaty,
    description: impl Into<String>,
    date: impl Into<String>,
) -> DiplomaticIncident {
    let partners: Vec<String> = treaty.partners_of(&faction.name).map(String::from).collect();
    let involved: Vec<&str> = partners.iter().map(String::as_str).collect();
    create_incident(
        faction,
        IncidentKind::TreatyBreach,
        &involved,
        incident_constants::TREATY_BREACH_IMPACT,
        description,
        date,
    )
}

pub fn border_dispute_incident(
    faction: &mut Faction,
    opponent: &str,
    location: &str,
    date: impl Into<String>,
) -> DiplomaticIncident {
    create_incident(
        faction,
        IncidentKind::BorderDispute,
        &[opponent],
        incident_constants::BORDER_DISPUTE_IMPACT,
        format!("Territorial dispute over {}", location),
        date,
    )
}

/// Writes the incident's current impact onto the recorder's view of every
/// other involved faction.
pub fn apply_incident_impact(faction: &mut Faction, incident_id: &str) -> Result<(), SimError> {
    let incident = faction
        .diplomatic_incidents
        .iter()
        .find(|i| i.id == incident_id)
        .ok_or_else(|| SimError::not_found("Incident", incident_id))?;
    let impact = incident.relationship_impact;
    let others: Vec<String> = incident
        .factions
        .iter()
        .filter(|name| **name != faction.name)
        .cloned()
        .collect();

    for other in &others {
        update_relationship(faction, other, impact);
    }
    Ok(())
}

pub fn unresolved_incidents(faction: &Faction) -> Vec<&DiplomaticIncident> {
    faction
        .diplomatic_incidents
        .iter()
        .filter(|i| i.status == IncidentStatus::Unresolved)
        .collect()
}

pub fn incidents_with<'a>(faction: &'a Faction, other: &str) -> Vec<&'a DiplomaticIncident> {
    faction
        .diplomatic_incidents
        .iter()
        .filter(|i| i.factions.iter().any(|f| f == other))
        .collect()
}
