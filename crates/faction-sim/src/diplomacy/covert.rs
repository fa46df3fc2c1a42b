//! Covert Diplomacy
//!
//! Secret treaties, espionage operations and intelligence gathering. All
//! rolls are drawn from the caller's RNG.

use faction_records::resources::keys;
use faction_records::{
    generate_record_id, EspionageKind, EspionageOperation, Faction, IncidentKind,
    IntelligenceReport, OperationStatus, Treaty, TreatyKind, TreatyStatus,
};
use rand::Rng;

use super::incidents::{create_incident, espionage_incident};
use crate::SimError;

/// Covert operation constants
pub mod covert_constants {
    pub const BASE_SUCCESS_CHANCE: f64 = 30.0;
    pub const MAX_SUCCESS_CHANCE: f64 = 80.0;
    /// Percent chance an operation is discovered before it can succeed
    pub const DISCOVERY_CHANCE: f64 = 10.0;
    pub const INFILTRATION_INFLUENCE: f64 = 10.0;
    pub const STOLEN_MAGIC: f64 = 20.0;
    pub const COUNTER_ESPIONAGE_COST: f64 = 50.0;
    pub const COUNTER_ESPIONAGE_INFLUENCE: f64 = 5.0;
    pub const INTELLIGENCE_COST: f64 = 100.0;
    pub const MISINFORMATION_COST: f64 = 150.0;
    pub const MISINFORMATION_BASE_CHANCE: f64 = 40.0;
    pub const MISINFORMATION_DISCOVERED_IMPACT: i32 = -30;
}

use covert_constants::*;

/// Records a secret treaty in `faction` and every partner record. No
/// relationship check is made.
pub fn create_secret_treaty(
    faction: &mut Faction,
    partners: &mut [Faction],
    kind: TreatyKind,
    terms: impl Into<String>,
    signed: impl Into<String>,
    expires: Option<String>,
) -> Treaty {
    let mut parties = vec![faction.name.clone()];
    parties.extend(partners.iter().map(|p| p.name.clone()));

    let treaty = Treaty {
        id: generate_record_id("treaty"),
        kind,
        parties,
        terms: terms.into(),
        signed: signed.into(),
        expires,
        status: TreatyStatus::Active,
        is_secret: true,
    };
    faction.treaties.push(treaty.clone());
    for partner in partners.iter_mut() {
        partner.treaties.push(treaty.clone());
    }

    tracing::debug!(faction = %faction.name, id = %treaty.id, "Secret treaty signed");
    treaty
}

/// Clears the secret flag on every copy held by `faction` and `partners`.
pub fn reveal_secret_treaty(faction: &mut Faction, partners: &mut [Faction], treaty_id: &str) -> Result<(), SimError> {
    let treaty = faction
        .treaty_mut(treaty_id)
        .ok_or_else(|| SimError::not_found("Treaty", treaty_id))?;
    treaty.is_secret = false;

    for partner in partners.iter_mut() {
        if let Some(copy) = partner.treaty_mut(treaty_id) {
            copy.is_secret = false;
        }
    }
    tracing::info!(faction = %faction.name, treaty_id, "Secret treaty revealed");
    Ok(())
}

pub fn secret_treaties(faction: &Faction) -> Vec<&Treaty> {
    faction.treaties.iter().filter(|t| t.is_secret).collect()
}

/// Gold cost of launching an operation.
pub fn operation_cost(kind: EspionageKind) -> f64 {
    match kind {
        EspionageKind::Infiltrate => 100.0,
        EspionageKind::Sabotage => 200.0,
        EspionageKind::StealSecrets => 150.0,
        EspionageKind::Assassinate => 300.0,
        EspionageKind::CounterIntel => 100.0,
    }
}

/// `min(80, 30 + influence + magic / 10)` percent.
pub fn espionage_success_chance(faction: &Faction) -> u8 {
    let intelligence = faction.resource(keys::INFLUENCE) + faction.resource(keys::MAGIC) / 10.0;
    (BASE_SUCCESS_CHANCE + intelligence).clamp(0.0, MAX_SUCCESS_CHANCE) as u8
}

fn spend_gold(faction: &mut Faction, cost: f64) -> Result<(), SimError> {
    let name = faction.name.clone();
    let resources = faction
        .resources
        .as_mut()
        .ok_or(SimError::NoResources(name))?;
    let gold = resources.get(keys::GOLD);
    if gold < cost {
        return Err(SimError::insufficient(keys::GOLD, cost, gold));
    }
    resources.add(keys::GOLD, -cost);
    Ok(())
}

/// Pays for and records an active operation. Returns its id.
pub fn launch_espionage(
    faction: &mut Faction,
    kind: EspionageKind,
    target: impl Into<String>,
    agents: Vec<String>,
    date: impl Into<String>,
) -> Result<String, SimError> {
    let cost = operation_cost(kind);
    spend_gold(faction, cost)?;

    let operation = EspionageOperation {
        id: generate_record_id("espionage"),
        kind,
        target: target.into(),
        agents,
        cost,
        success_chance: espionage_success_chance(faction),
        started: date.into(),
        status: OperationStatus::Active,
    };
    tracing::info!(
        faction = %faction.name,
        kind = ?operation.kind,
        target = %operation.target,
        chance = operation.success_chance,
        "Espionage launched"
    );
    let id = operation.id.clone();
    faction.espionage_operations.push(operation);
    Ok(id)
}

/// Result of resolving an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct EspionageOutcome {
    pub status: OperationStatus,
    pub description: String,
    /// Incident recorded when the operation was discovered.
    pub incident: Option<String>,
}

/// Resolves an active operation. Discovery is rolled before success.
pub fn resolve_espionage<R: Rng + ?Sized>(
    faction: &mut Faction,
    operation_id: &str,
    date: &str,
    rng: &mut R,
) -> Result<EspionageOutcome, SimError> {
    let operation = faction
        .espionage_operations
        .iter()
        .find(|op| op.id == operation_id)
        .ok_or_else(|| SimError::not_found("Operation", operation_id))?;
    if operation.status != OperationStatus::Active {
        return Err(SimError::InvalidState {
            entity: format!("operation {}", operation_id),
            status: format!("{:?}", operation.status).to_lowercase(),
            operation: "resolve",
        });
    }
    let kind = operation.kind;
    let target = operation.target.clone();
    let chance = f64::from(operation.success_chance);

    let label = kind.as_str();
    let status = if rng.gen_range(0.0..100.0) < DISCOVERY_CHANCE {
        OperationStatus::Discovered
    } else if rng.gen_range(0.0..100.0) < chance {
        OperationStatus::Success
    } else {
        OperationStatus::Failure
    };

    if let Some(op) = faction.espionage_operations.iter_mut().find(|op| op.id == operation_id) {
        op.status = status;
    }

    let mut incident = None;
    let description = match status {
        OperationStatus::Discovered => {
            incident = Some(espionage_incident(faction, &target, label, date).id);
            format!("{} operation was discovered by {}", label, target)
        }
        OperationStatus::Success => match kind {
            EspionageKind::Infiltrate => {
                faction.resources_mut().add(keys::INFLUENCE, INFILTRATION_INFLUENCE);
                format!("Infiltrated {} and gained intelligence", target)
            }
            EspionageKind::StealSecrets => {
                faction.resources_mut().add(keys::MAGIC, STOLEN_MAGIC);
                format!("Stole valuable secrets from {}", target)
            }
            EspionageKind::Sabotage => format!("Sabotage against {} succeeded", target),
            EspionageKind::Assassinate => format!("Assassination against {} succeeded", target),
            EspionageKind::CounterIntel => format!("Countered espionage from {}", target),
        },
        _ => format!("{} operation against {} failed", label, target),
    };

    tracing::info!(faction = %faction.name, operation_id, ?status, "Espionage resolved");
    Ok(EspionageOutcome {
        status,
        description,
        incident,
    })
}

/// Spends gold on counter-intelligence for a small influence gain.
pub fn counter_espionage(faction: &mut Faction) -> Result<(), SimError> {
    spend_gold(faction, COUNTER_ESPIONAGE_COST)?;
    faction.resources_mut().add(keys::INFLUENCE, COUNTER_ESPIONAGE_INFLUENCE);
    Ok(())
}

fn report(source: &str, target: &str, information: String, reliability: u8, date: &str) -> IntelligenceReport {
    IntelligenceReport {
        id: generate_record_id("intel"),
        source: source.to_string(),
        target: target.to_string(),
        information,
        reliability,
        gathered: date.to_string(),
        is_false: false,
    }
}

/// Pays for intelligence on `target`. A basic observation always comes
/// back; deeper findings are rolled individually. Reports are stored on
/// `faction` and returned.
pub fn gather_intelligence<R: Rng + ?Sized>(
    faction: &mut Faction,
    target: &str,
    date: &str,
    rng: &mut R,
) -> Result<Vec<IntelligenceReport>, SimError> {
    spend_gold(faction, INTELLIGENCE_COST)?;

    let source = faction.name.clone();
    let mut reports = vec![report(
        &source,
        target,
        format!("{} has been observed conducting military operations", target),
        90,
        date,
    )];
    if rng.gen_bool(0.5) {
        reports.push(report(
            &source,
            target,
            format!("{} may have secret agreements with other factions", target),
            50,
            date,
        ));
    }
    if rng.gen_bool(0.3) {
        reports.push(report(
            &source,
            target,
            format!("{} appears to have moderate to high resource reserves", target),
            60,
            date,
        ));
    }
    if rng.gen_bool(0.2) {
        reports.push(report(
            &source,
            target,
            format!("{} has a substantial military presence", target),
            70,
            date,
        ));
    }

    faction.intelligence_reports.extend(reports.iter().cloned());
    Ok(reports)
}

/// Runs a misinformation campaign against `victim`. On success a false
/// report lands in the victim's record; on failure the attempt is recorded
/// as an incident. Returns whether it succeeded.
pub fn plant_false_intelligence<R: Rng + ?Sized>(
    faction: &mut Faction,
    victim: &mut Faction,
    information: impl Into<String>,
    date: &str,
    rng: &mut R,
) -> Result<bool, SimError> {
    spend_gold(faction, MISINFORMATION_COST)?;

    let chance = (MISINFORMATION_BASE_CHANCE + faction.resource(keys::INFLUENCE) / 2.0).min(MAX_SUCCESS_CHANCE);
    if rng.gen_range(0.0..100.0) < chance {
        let mut planted = report(&faction.name, &victim.name, information.into(), chance as u8, date);
        planted.is_false = true;
        victim.intelligence_reports.push(planted);
        tracing::debug!(faction = %faction.name, victim = %victim.name, "False intelligence planted");
        return Ok(true);
    }

    create_incident(
        faction,
        IncidentKind::SpyDiscovered,
        &[victim.name.as_str()],
        MISINFORMATION_DISCOVERED_IMPACT,
        "Misinformation campaign discovered",
        date,
    );
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use faction_records::Resources;
    use rand::rngs::mock::StepRng;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn spymaster(gold: f64) -> Faction {
        Faction::new("Kingdom A").with_resources(
            Resources::new()
                .with(keys::GOLD, gold)
                .with(keys::INFLUENCE, 20.0)
                .with(keys::MAGIC, 100.0),
        )
    }

    /// Every float roll lands at 0.
    fn lowest() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Every float roll lands at the midpoint.
    fn middle() -> StepRng {
        StepRng::new(1 << 63, 0)
    }

    /// Every roll lands just under the top of its range.
    fn highest() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    #[test]
    fn test_secret_treaty_mirrored_and_revealed() {
        let mut faction = Faction::new("Kingdom A");
        let mut partners = vec![Faction::new("Kingdom B").with_relationship("Kingdom A", -90)];
        let treaty = create_secret_treaty(
            &mut faction,
            &mut partners,
            TreatyKind::NonAggression,
            "Stay out of the valley",
            "1492-01-01",
            None,
        );

        assert_eq!(treaty.parties, vec!["Kingdom A", "Kingdom B"]);
        assert_eq!(secret_treaties(&faction).len(), 1);
        assert_eq!(secret_treaties(&partners[0]).len(), 1);

        reveal_secret_treaty(&mut faction, &mut partners, &treaty.id).unwrap();
        assert!(secret_treaties(&faction).is_empty());
        assert!(secret_treaties(&partners[0]).is_empty());
    }

    #[test]
    fn test_reveal_unknown_treaty() {
        let mut faction = Faction::new("Kingdom A");
        assert!(reveal_secret_treaty(&mut faction, &mut [], "treaty_x").is_err());
    }

    #[test]
    fn test_costs_and_chance() {
        assert_eq!(operation_cost(EspionageKind::Assassinate), 300.0);
        assert_eq!(operation_cost(EspionageKind::StealSecrets), 150.0);
        // 30 + 20 + 100 / 10
        assert_eq!(espionage_success_chance(&spymaster(0.0)), 60);

        let adept = Faction::new("A").with_resources(Resources::new().with(keys::INFLUENCE, 200.0));
        assert_eq!(espionage_success_chance(&adept), 80);
    }

    #[test]
    fn test_launch_debits_gold() {
        let mut faction = spymaster(500.0);
        let id = launch_espionage(&mut faction, EspionageKind::Sabotage, "Kingdom B", vec![], "1492-02-01").unwrap();

        assert_eq!(faction.resource(keys::GOLD), 300.0);
        let op = &faction.espionage_operations[0];
        assert_eq!(op.id, id);
        assert_eq!(op.success_chance, 60);
        assert_eq!(op.status, OperationStatus::Active);
    }

    #[test]
    fn test_launch_without_gold() {
        let mut faction = spymaster(50.0);
        let err = launch_espionage(&mut faction, EspionageKind::Infiltrate, "Kingdom B", vec![], "d").unwrap_err();
        assert!(matches!(err, SimError::InsufficientResource { .. }));
        assert!(faction.espionage_operations.is_empty());

        let mut broke = Faction::new("Broke");
        assert!(matches!(
            launch_espionage(&mut broke, EspionageKind::Infiltrate, "B", vec![], "d"),
            Err(SimError::NoResources(_))
        ));
    }

    #[test]
    fn test_discovery_records_incident() {
        let mut faction = spymaster(500.0);
        let id = launch_espionage(&mut faction, EspionageKind::Infiltrate, "Kingdom B", vec![], "d").unwrap();
        let outcome = resolve_espionage(&mut faction, &id, "1492-02-10", &mut lowest()).unwrap();

        assert_eq!(outcome.status, OperationStatus::Discovered);
        assert!(outcome.incident.is_some());
        assert_eq!(faction.diplomatic_incidents[0].kind, IncidentKind::SpyDiscovered);
        assert_eq!(faction.diplomatic_incidents[0].relationship_impact, -40);
    }

    #[test]
    fn test_successful_infiltration_grants_influence() {
        let mut faction = spymaster(500.0);
        let id = launch_espionage(&mut faction, EspionageKind::Infiltrate, "Kingdom B", vec![], "d").unwrap();
        let outcome = resolve_espionage(&mut faction, &id, "d", &mut middle()).unwrap();

        assert_eq!(outcome.status, OperationStatus::Success);
        assert_eq!(faction.resource(keys::INFLUENCE), 30.0);
        assert!(faction.diplomatic_incidents.is_empty());
    }

    #[test]
    fn test_stolen_secrets_grant_magic() {
        let mut faction = spymaster(500.0);
        let id = launch_espionage(&mut faction, EspionageKind::StealSecrets, "Kingdom B", vec![], "d").unwrap();
        resolve_espionage(&mut faction, &id, "d", &mut middle()).unwrap();
        assert_eq!(faction.resource(keys::MAGIC), 120.0);
    }

    #[test]
    fn test_failed_operation_cannot_resolve_twice() {
        let mut faction = spymaster(500.0);
        let id = launch_espionage(&mut faction, EspionageKind::Sabotage, "Kingdom B", vec![], "d").unwrap();
        let outcome = resolve_espionage(&mut faction, &id, "d", &mut highest()).unwrap();
        assert_eq!(outcome.status, OperationStatus::Failure);

        let err = resolve_espionage(&mut faction, &id, "d", &mut highest()).unwrap_err();
        assert!(matches!(err, SimError::InvalidState { .. }));
    }

    #[test]
    fn test_counter_espionage() {
        let mut faction = spymaster(60.0);
        counter_espionage(&mut faction).unwrap();
        assert_eq!(faction.resource(keys::GOLD), 10.0);
        assert_eq!(faction.resource(keys::INFLUENCE), 25.0);
        assert!(counter_espionage(&mut faction).is_err());
    }

    #[test]
    fn test_intelligence_always_has_basic_report() {
        let mut faction = spymaster(100.0);
        let reports = gather_intelligence(&mut faction, "Kingdom B", "d", &mut highest()).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(faction.intelligence_reports.len(), 1);
        assert_eq!(faction.resource(keys::GOLD), 0.0);
    }

    #[test]
    fn test_intelligence_can_reveal_everything() {
        let mut faction = spymaster(100.0);
        let reports = gather_intelligence(&mut faction, "Kingdom B", "d", &mut lowest()).unwrap();
        assert_eq!(reports.len(), 4);
        assert!(reports.iter().all(|r| r.target == "Kingdom B" && !r.is_false));
    }

    #[test]
    fn test_intelligence_is_seed_deterministic() {
        let run = || {
            let mut faction = spymaster(10_000.0);
            let mut rng = SmallRng::seed_from_u64(7);
            (0..10)
                .map(|_| gather_intelligence(&mut faction, "Kingdom B", "d", &mut rng).unwrap().len())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_false_intelligence_planted() {
        let mut faction = spymaster(200.0);
        let mut victim = Faction::new("Kingdom B");
        let planted = plant_false_intelligence(&mut faction, &mut victim, "The pass is unguarded", "d", &mut lowest()).unwrap();

        assert!(planted);
        assert!(victim.intelligence_reports[0].is_false);
        assert_eq!(faction.resource(keys::GOLD), 50.0);
    }

    #[test]
    fn test_false_intelligence_discovered() {
        let mut faction = spymaster(200.0);
        let mut victim = Faction::new("Kingdom B");
        let planted = plant_false_intelligence(&mut faction, &mut victim, "lies", "d", &mut highest()).unwrap();

        assert!(!planted);
        assert!(victim.intelligence_reports.is_empty());
        assert_eq!(faction.diplomatic_incidents[0].relationship_impact, -30);
    }
}
