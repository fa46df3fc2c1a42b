//! Treaty Lifecycle
//!
//! Proposal, violation, nullification, expiry, renewal and negotiation.

use faction_records::{generate_record_id, Faction, Treaty, TreatyKind, TreatyStatus};
use serde::{Deserialize, Serialize};

use crate::relationships::{relationship_value, update_relationship};
use crate::SimError;

/// Constants for treaty handling
pub mod treaty_constants {
    /// Relationship lost by a violator toward each partner
    pub const VIOLATION_PENALTY: i32 = -60;
    /// Relationship lost both ways on nullification
    pub const NULLIFICATION_PENALTY: i32 = -5;
    /// Lowest relationship at which a treaty can be renewed
    pub const RENEWAL_MINIMUM: i32 = 0;
    /// Above this, negotiated terms are accepted as offered
    pub const NEGOTIATION_ACCEPT: i32 = 50;
    pub const COUNTER_OFFER_FRIENDLY: f64 = 0.7;
    pub const COUNTER_OFFER_HOSTILE: f64 = 1.5;
    /// Allied treaties below this relationship raise a betrayal warning
    pub const BETRAYAL_WARNING_THRESHOLD: i32 = 30;
    pub const ALLIANCE_OPPORTUNITY_THRESHOLD: i32 = 60;
    pub const WAR_THREAT_THRESHOLD: i32 = -60;
}

use treaty_constants::*;

/// Relationship the proposer must hold toward the receiver.
pub fn minimum_relationship(kind: TreatyKind) -> i32 {
    match kind {
        TreatyKind::Alliance => 50,
        TreatyKind::MutualDefense => 40,
        TreatyKind::TradeAgreement => 20,
        TreatyKind::NonAggression => -20,
        TreatyKind::Vassal => 60,
    }
}

/// Relationship gained both ways when a treaty is signed.
pub fn acceptance_boost(kind: TreatyKind) -> i32 {
    match kind {
        TreatyKind::Alliance => 30,
        TreatyKind::MutualDefense => 20,
        _ => 10,
    }
}

/// Terms of a proposed treaty.
#[derive(Debug, Clone, PartialEq)]
pub struct TreatyProposal {
    pub kind: TreatyKind,
    pub terms: String,
    pub signed: String,
    pub expires: Option<String>,
    pub is_secret: bool,
}

impl TreatyProposal {
    pub fn new(kind: TreatyKind, signed: impl Into<String>) -> Self {
        Self {
            kind,
            terms: String::new(),
            signed: signed.into(),
            expires: None,
            is_secret: false,
        }
    }

    pub fn with_terms(mut self, terms: impl Into<String>) -> Self {
        self.terms = terms.into();
        self
    }

    pub fn expiring(mut self, date: impl Into<String>) -> Self {
        self.expires = Some(date.into());
        self
    }

    pub fn secret(mut self) -> Self {
        self.is_secret = true;
        self
    }
}

/// Outcome of a proposal. Rejection is not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalOutcome {
    pub accepted: bool,
    pub treaty: Option<Treaty>,
    pub reason: String,
}

/// Proposes a treaty. On acceptance the treaty is written to both records
/// and relations improve both ways.
pub fn propose_treaty(proposer: &mut Faction, receiver: &mut Faction, proposal: TreatyProposal) -> ProposalOutcome {
    let value = relationship_value(proposer, &receiver.name);
    let required = minimum_relationship(proposal.kind);

    if value < required {
        let reason = format!(
            "Relationship too low for {}: {} (requires {})",
            proposal.kind, value, required
        );
        tracing::warn!(proposer = %proposer.name, receiver = %receiver.name, %reason, "Treaty rejected");
        return ProposalOutcome {
            accepted: false,
            treaty: None,
            reason,
        };
    }

    let treaty = Treaty {
        id: generate_record_id("treaty"),
        kind: proposal.kind,
        parties: vec![proposer.name.clone(), receiver.name.clone()],
        terms: proposal.terms,
        signed: proposal.signed,
        expires: proposal.expires,
        status: TreatyStatus::Active,
        is_secret: proposal.is_secret,
    };
    proposer.treaties.push(treaty.clone());
    receiver.treaties.push(treaty.clone());

    let boost = acceptance_boost(treaty.kind);
    update_relationship(proposer, &receiver.name, boost);
    update_relationship(receiver, &proposer.name, boost);

    tracing::info!(
        proposer = %proposer.name,
        receiver = %receiver.name,
        kind = %treaty.kind,
        id = %treaty.id,
        "Treaty signed"
    );
    ProposalOutcome {
        accepted: true,
        reason: format!("{} accepted", treaty.kind),
        treaty: Some(treaty),
    }
}

fn require_active(treaty: &Treaty, operation: &'static str) -> Result<(), SimError> {
    if treaty.is_active() {
        Ok(())
    } else {
        Err(SimError::InvalidState {
            entity: format!("treaty {}", treaty.id),
            status: format!("{:?}", treaty.status).to_lowercase(),
            operation,
        })
    }
}

/// Marks a treaty violated in the violator's record and every partner copy
/// in `partners`, and sours the violator's view of each treaty partner.
pub fn violate_treaty(violator: &mut Faction, treaty_id: &str, partners: &mut [Faction]) -> Result<(), SimError> {
    let treaty = violator
        .treaty(treaty_id)
        .ok_or_else(|| SimError::not_found("Treaty", treaty_id))?;
    require_active(treaty, "violate")?;
    let others: Vec<String> = treaty.partners_of(&violator.name).map(String::from).collect();

    if let Some(treaty) = violator.treaty_mut(treaty_id) {
        treaty.status = TreatyStatus::Violated;
    }
    for partner in partners.iter_mut() {
        if let Some(copy) = partner.treaty_mut(treaty_id) {
            copy.status = TreatyStatus::Violated;
        }
    }
    for other in &others {
        update_relationship(violator, other, VIOLATION_PENALTY);
    }

    tracing::info!(violator = %violator.name, treaty_id, partners = ?others, "Treaty violated");
    Ok(())
}

/// Dissolves a treaty held by both factions; a small loss of goodwill both ways.
pub fn nullify_treaty(a: &mut Faction, b: &mut Faction, treaty_id: &str) -> Result<(), SimError> {
    let (Some(treaty), true) = (a.treaty(treaty_id), b.treaty(treaty_id).is_some()) else {
        return Err(SimError::not_found("Treaty", treaty_id));
    };
    require_active(treaty, "nullify")?;

    for faction in [&mut *a, &mut *b] {
        if let Some(copy) = faction.treaty_mut(treaty_id) {
            copy.status = TreatyStatus::Nullified;
        }
    }
    update_relationship(a, &b.name, NULLIFICATION_PENALTY);
    update_relationship(b, &a.name, NULLIFICATION_PENALTY);

    tracing::info!(a = %a.name, b = %b.name, treaty_id, "Treaty nullified");
    Ok(())
}

/// Dates are compared as strings; callers keep them in a sortable format.
pub fn is_treaty_expired(treaty: &Treaty, current_date: &str) -> bool {
    treaty
        .expires
        .as_deref()
        .is_some_and(|expires| current_date >= expires)
}

/// Marks every due active treaty expired. Returns the expired ids.
pub fn expire_treaties(faction: &mut Faction, current_date: &str) -> Vec<String> {
    let mut expired = Vec::new();
    for treaty in faction.treaties.iter_mut() {
        if treaty.is_active() && is_treaty_expired(treaty, current_date) {
            treaty.status = TreatyStatus::Expired;
            expired.push(treaty.id.clone());
        }
    }
    if !expired.is_empty() {
        tracing::info!(faction = %faction.name, treaties = ?expired, "Treaties expired");
    }
    expired
}

/// Extends a treaty in both records. Expired treaties become active again.
pub fn renew_treaty(
    a: &mut Faction,
    b: &mut Faction,
    treaty_id: &str,
    new_expiry: Option<String>,
) -> Result<(), SimError> {
    let (Some(treaty), true) = (a.treaty(treaty_id), b.treaty(treaty_id).is_some()) else {
        return Err(SimError::not_found("Treaty", treaty_id));
    };
    if matches!(treaty.status, TreatyStatus::Violated | TreatyStatus::Nullified) {
        return Err(SimError::InvalidState {
            entity: format!("treaty {}", treaty_id),
            status: format!("{:?}", treaty.status).to_lowercase(),
            operation: "renew",
        });
    }

    let value = relationship_value(a, &b.name);
    if value < RENEWAL_MINIMUM {
        return Err(SimError::RelationshipTooLow {
            required: RENEWAL_MINIMUM,
            actual: value,
        });
    }

    for faction in [a, b] {
        if let Some(copy) = faction.treaty_mut(treaty_id) {
            copy.expires = new_expiry.clone();
            copy.status = TreatyStatus::Active;
        }
    }
    Ok(())
}

pub fn active_treaties(faction: &Faction) -> Vec<&Treaty> {
    faction.treaties.iter().filter(|t| t.is_active()).collect()
}

/// All treaties, in any status, naming `other`.
pub fn treaties_with<'a>(faction: &'a Faction, other: &str) -> Vec<&'a Treaty> {
    faction.treaties.iter().filter(|t| t.involves(other)).collect()
}

/// True if an active treaty with `other` exists, optionally of one kind.
pub fn has_active_treaty(faction: &Faction, other: &str, kind: Option<TreatyKind>) -> bool {
    faction
        .treaties
        .iter()
        .any(|t| t.is_active() && t.involves(other) && kind.map_or(true, |k| t.kind == k))
}

/// Response to offered terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationOutcome {
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter_offer: Option<f64>,
    pub reason: String,
}

/// Friendly partners accept; lukewarm ones counter at 70%; hostile ones
/// demand 150%.
pub fn negotiate_terms(proposer: &Faction, receiver: &Faction, proposed_value: f64) -> NegotiationOutcome {
    let value = relationship_value(proposer, &receiver.name);
    if value > NEGOTIATION_ACCEPT {
        NegotiationOutcome {
            accepted: true,
            counter_offer: None,
            reason: format!("{} accepts the terms", receiver.name),
        }
    } else if value >= 0 {
        NegotiationOutcome {
            accepted: false,
            counter_offer: Some((proposed_value * COUNTER_OFFER_FRIENDLY).round()),
            reason: format!("{} wants better terms", receiver.name),
        }
    } else {
        NegotiationOutcome {
            accepted: false,
            counter_offer: Some((proposed_value * COUNTER_OFFER_HOSTILE).round()),
            reason: format!("{} distrusts the offer and demands more", receiver.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiplomaticEventKind {
    BetrayalWarning,
    AllianceOpportunity,
    WarThreat,
}

/// A diplomatic development worth a game master's attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiplomaticEvent {
    #[serde(rename = "type")]
    pub kind: DiplomaticEventKind,
    pub target_faction: String,
    pub description: String,
}

/// The most pressing diplomatic development for a faction, if any.
/// Weakening alliances come first, then alliance opportunities, then war.
pub fn generate_diplomatic_event(faction: &Faction) -> Option<DiplomaticEvent> {
    for treaty in active_treaties(faction) {
        if treaty.kind != TreatyKind::Alliance {
            continue;
        }
        for partner in treaty.partners_of(&faction.name) {
            let value = relationship_value(faction, partner);
            if value < BETRAYAL_WARNING_THRESHOLD {
                return Some(DiplomaticEvent {
                    kind: DiplomaticEventKind::BetrayalWarning,
                    target_faction: partner.to_string(),
                    description: format!(
                        "The alliance between {} and {} is fraying (relationship {})",
                        faction.name, partner, value
                    ),
                });
            }
        }
    }

    for rel in &faction.relationships {
        if rel.value >= ALLIANCE_OPPORTUNITY_THRESHOLD
            && !has_active_treaty(faction, &rel.faction_name, Some(TreatyKind::Alliance))
        {
            return Some(DiplomaticEvent {
                kind: DiplomaticEventKind::AllianceOpportunity,
                target_faction: rel.faction_name.clone(),
                description: format!(
                    "{} and {} are close enough to formalize an alliance",
                    faction.name, rel.faction_name
                ),
            });
        }
    }

    for rel in &faction.relationships {
        if rel.value <= WAR_THREAT_THRESHOLD
            && !has_active_treaty(faction, &rel.faction_name, Some(TreatyKind::NonAggression))
        {
            return Some(DiplomaticEvent {
                kind: DiplomaticEventKind::WarThreat,
                target_faction: rel.faction_name.clone(),
                description: format!("{} is on the brink of war with {}", faction.name, rel.faction_name),
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a_to_b: i32, b_to_a: i32) -> (Faction, Faction) {
        (
            Faction::new("Kingdom A").with_relationship("Kingdom B", a_to_b),
            Faction::new("Kingdom B").with_relationship("Kingdom A", b_to_a),
        )
    }

    fn signed_pair(kind: TreatyKind) -> (Faction, Faction, String) {
        let (mut a, mut b) = pair(60, 60);
        let outcome = propose_treaty(&mut a, &mut b, TreatyProposal::new(kind, "1492-01-01").expiring("1493-01-01"));
        let id = outcome.treaty.map(|t| t.id).unwrap_or_default();
        (a, b, id)
    }

    #[test]
    fn test_alliance_accepted_and_mirrored() {
        let (mut a, mut b) = pair(60, 60);
        let outcome = propose_treaty(
            &mut a,
            &mut b,
            TreatyProposal::new(TreatyKind::Alliance, "1492-01-01").with_terms("Mutual aid"),
        );

        assert!(outcome.accepted);
        let treaty = outcome.treaty.unwrap();
        assert_eq!(a.treaties[0].id, treaty.id);
        assert_eq!(b.treaties[0].id, treaty.id);
        assert_eq!(relationship_value(&a, "Kingdom B"), 90);
        assert_eq!(relationship_value(&b, "Kingdom A"), 90);
    }

    #[test]
    fn test_alliance_rejected_when_relationship_low() {
        let (mut a, mut b) = pair(10, 10);
        let outcome = propose_treaty(&mut a, &mut b, TreatyProposal::new(TreatyKind::Alliance, "1492-01-01"));

        assert!(!outcome.accepted);
        assert!(outcome.reason.contains("too low"));
        assert!(a.treaties.is_empty());
        assert!(b.treaties.is_empty());
        assert_eq!(relationship_value(&a, "Kingdom B"), 10);
    }

    #[test]
    fn test_non_aggression_with_rivals() {
        let (mut a, mut b) = pair(-10, -10);
        let outcome = propose_treaty(&mut a, &mut b, TreatyProposal::new(TreatyKind::NonAggression, "1492-01-01"));
        assert!(outcome.accepted);
        assert_eq!(relationship_value(&a, "Kingdom B"), 0);
    }

    #[test]
    fn test_minimums_and_boosts() {
        assert_eq!(minimum_relationship(TreatyKind::Vassal), 60);
        assert_eq!(minimum_relationship(TreatyKind::TradeAgreement), 20);
        assert_eq!(acceptance_boost(TreatyKind::MutualDefense), 20);
        assert_eq!(acceptance_boost(TreatyKind::Vassal), 10);
    }

    #[test]
    fn test_secret_proposal_keeps_flag() {
        let (mut a, mut b) = pair(60, 60);
        let outcome = propose_treaty(
            &mut a,
            &mut b,
            TreatyProposal::new(TreatyKind::MutualDefense, "1492-01-01").secret(),
        );
        assert!(outcome.treaty.unwrap().is_secret);
        assert!(b.treaties[0].is_secret);
    }

    #[test]
    fn test_violation() {
        let (mut violator, victim, id) = signed_pair(TreatyKind::TradeAgreement);
        update_relationship(&mut violator, "Kingdom B", -30);
        let mut partners = vec![victim];

        violate_treaty(&mut violator, &id, &mut partners).unwrap();

        assert_eq!(violator.treaties[0].status, TreatyStatus::Violated);
        assert_eq!(partners[0].treaties[0].status, TreatyStatus::Violated);
        assert_eq!(relationship_value(&violator, "Kingdom B"), -20);
        assert!(violate_treaty(&mut violator, &id, &mut partners).is_err());
    }

    #[test]
    fn test_violation_unknown_treaty() {
        let mut faction = Faction::new("Kingdom A");
        let err = violate_treaty(&mut faction, "treaty_missing", &mut []).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_nullification() {
        let (mut a, mut b, id) = signed_pair(TreatyKind::Alliance);
        nullify_treaty(&mut a, &mut b, &id).unwrap();

        assert_eq!(a.treaties[0].status, TreatyStatus::Nullified);
        assert_eq!(b.treaties[0].status, TreatyStatus::Nullified);
        assert_eq!(relationship_value(&a, "Kingdom B"), 85);
        assert_eq!(relationship_value(&b, "Kingdom A"), 85);
    }

    #[test]
    fn test_nullification_requires_both_copies() {
        let (mut a, _, id) = signed_pair(TreatyKind::Alliance);
        let mut stranger = Faction::new("Kingdom C");
        assert!(nullify_treaty(&mut a, &mut stranger, &id).is_err());
        assert_eq!(a.treaties[0].status, TreatyStatus::Active);
    }

    #[test]
    fn test_expiration_is_string_comparison() {
        let (mut a, _, _) = signed_pair(TreatyKind::Alliance);
        assert!(!is_treaty_expired(&a.treaties[0], "1492-12-31"));
        assert!(is_treaty_expired(&a.treaties[0], "1493-01-01"));
        assert!(is_treaty_expired(&a.treaties[0], "1494-06-01"));

        assert!(expire_treaties(&mut a, "1492-06-01").is_empty());
        assert_eq!(expire_treaties(&mut a, "1493-02-01").len(), 1);
        assert_eq!(a.treaties[0].status, TreatyStatus::Expired);
    }

    #[test]
    fn test_permanent_treaty_never_expires() {
        let (mut a, mut b) = pair(60, 60);
        propose_treaty(&mut a, &mut b, TreatyProposal::new(TreatyKind::Alliance, "1492-01-01"));
        assert!(!is_treaty_expired(&a.treaties[0], "9999-12-31"));
    }

    #[test]
    fn test_renewal() {
        let (mut a, mut b, id) = signed_pair(TreatyKind::TradeAgreement);
        renew_treaty(&mut a, &mut b, &id, Some("1495-12-31".into())).unwrap();
        assert_eq!(a.treaties[0].expires.as_deref(), Some("1495-12-31"));
        assert_eq!(b.treaties[0].expires.as_deref(), Some("1495-12-31"));
    }

    #[test]
    fn test_renewal_refused_when_hostile() {
        let (mut a, mut b, id) = signed_pair(TreatyKind::TradeAgreement);
        update_relationship(&mut a, "Kingdom B", -110);
        let err = renew_treaty(&mut a, &mut b, &id, None).unwrap_err();
        assert!(matches!(err, SimError::RelationshipTooLow { .. }));
        assert_eq!(a.treaties[0].expires.as_deref(), Some("1493-01-01"));
    }

    #[test]
    fn test_queries() {
        let (a, _, _) = signed_pair(TreatyKind::Alliance);
        assert_eq!(active_treaties(&a).len(), 1);
        assert_eq!(treaties_with(&a, "Kingdom B").len(), 1);
        assert!(has_active_treaty(&a, "Kingdom B", Some(TreatyKind::Alliance)));
        assert!(!has_active_treaty(&a, "Kingdom B", Some(TreatyKind::Vassal)));
        assert!(!has_active_treaty(&a, "Kingdom C", None));
    }

    #[test]
    fn test_negotiation() {
        let (a, b) = pair(70, 0);
        assert!(negotiate_terms(&a, &b, 1000.0).accepted);

        let (a, b) = pair(20, 0);
        let outcome = negotiate_terms(&a, &b, 1000.0);
        assert!(!outcome.accepted);
        assert_eq!(outcome.counter_offer, Some(700.0));

        let (a, b) = pair(-40, 0);
        assert_eq!(negotiate_terms(&a, &b, 1000.0).counter_offer, Some(1500.0));
    }

    #[test]
    fn test_alliance_opportunity_event() {
        let faction = Faction::new("Kingdom A").with_relationship("Kingdom B", 70);
        let event = generate_diplomatic_event(&faction).unwrap();
        assert_eq!(event.kind, DiplomaticEventKind::AllianceOpportunity);
        assert_eq!(event.target_faction, "Kingdom B");
    }

    #[test]
    fn test_betrayal_warning_event() {
        let mut faction = Faction::new("Kingdom A").with_relationship("Kingdom B", 25);
        faction.treaties.push(Treaty {
            id: "1".into(),
            kind: TreatyKind::Alliance,
            parties: vec!["Kingdom A".into(), "Kingdom B".into()],
            terms: "T".into(),
            signed: "1492-01-01".into(),
            expires: None,
            status: TreatyStatus::Active,
            is_secret: false,
        });
        let event = generate_diplomatic_event(&faction).unwrap();
        assert_eq!(event.kind, DiplomaticEventKind::BetrayalWarning);
        assert_eq!(event.target_faction, "Kingdom B");
    }

    #[test]
    fn test_war_threat_event() {
        let faction = Faction::new("Kingdom A").with_relationship("Kingdom B", -75);
        let event = generate_diplomatic_event(&faction).unwrap();
        assert_eq!(event.kind, DiplomaticEventKind::WarThreat);
    }

    #[test]
    fn test_no_event() {
        assert!(generate_diplomatic_event(&Faction::new("Kingdom A")).is_none());
    }
}
