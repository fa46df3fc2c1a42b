//! Campaign scenarios over the shared sample factions.

use faction_records::fixtures;
use faction_records::resources::keys;
use faction_records::{DecisionKind, EngagementKind, EngagementStatus, Resources, TreatyKind};
use faction_sim::diplomacy::{has_active_treaty, propose_treaty, violate_treaty, TreatyProposal};
use faction_sim::military::{initiate_engagement, members_to_units, simulate_battle, Victor};
use faction_sim::npc::betrayal_probability;
use faction_sim::{
    evaluate_faction_decision, hierarchy_resources, relationship_value, simulate_factions,
    transfer_resources, validate_all, FactionAiContext, SimConfig, SimRng, SimulationTick,
};

#[test]
fn test_sample_hierarchy_is_valid() {
    let factions = fixtures::sample_factions();
    assert!(validate_all(&factions).is_ok());

    let totals = hierarchy_resources("Thornwood", &factions);
    assert_eq!(totals.get(keys::GOLD), 2000.0);
    assert_eq!(totals.get(keys::FOOD), 1050.0);
    assert_eq!(totals.get(keys::EQUIPMENT), 300.0);
    assert_eq!(totals.get(keys::MAGIC), 40.0);
}

#[test]
fn test_thornwood_pursues_expansion() {
    let thornwood = fixtures::thornwood();
    let ctx = FactionAiContext::new(&thornwood).with_nearby(["Ashen Court", "Ironmere"]);
    let decision = evaluate_faction_decision(&ctx);

    assert_eq!(decision.kind, DecisionKind::ExpandTerritory);
    assert_eq!(decision.priority, 70);
    assert!(decision.duration_days > 0);
}

#[test]
fn test_threat_overrides_goals() {
    let thornwood = fixtures::thornwood();
    let ctx = FactionAiContext::new(&thornwood)
        .with_threats(["Bone Legion on the march"])
        .with_nearby(["Ashen Court"]);
    let decision = evaluate_faction_decision(&ctx);

    assert_eq!(decision.kind, DecisionKind::DefendTerritory);
    assert_eq!(decision.priority, 83);
}

#[test]
fn test_trade_pact_then_betrayal() {
    let mut thornwood = fixtures::thornwood();
    let mut ironmere = fixtures::get_faction("Ironmere").unwrap();

    let outcome = propose_treaty(
        &mut thornwood,
        &mut ironmere,
        TreatyProposal::new(TreatyKind::TradeAgreement, "1492-03-01").with_terms("Grain for iron"),
    );
    assert!(outcome.accepted);
    let id = outcome.treaty.unwrap().id;
    assert!(thornwood.treaty(&id).is_some());
    assert!(ironmere.treaty(&id).is_some());
    assert!(has_active_treaty(&ironmere, "Thornwood", Some(TreatyKind::TradeAgreement)));
    assert_eq!(relationship_value(&thornwood, "Ironmere"), 65);
    assert_eq!(relationship_value(&ironmere, "Thornwood"), 55);

    let mut partners = vec![ironmere];
    violate_treaty(&mut thornwood, &id, &mut partners).unwrap();
    assert!(!has_active_treaty(&partners[0], "Thornwood", None));
    assert_eq!(relationship_value(&thornwood, "Ironmere"), 5);
}

#[test]
fn test_alliance_with_enemy_rejected() {
    let mut thornwood = fixtures::thornwood();
    let mut ashen = fixtures::ashen_court();
    let outcome = propose_treaty(
        &mut thornwood,
        &mut ashen,
        TreatyProposal::new(TreatyKind::Alliance, "1492-03-01"),
    );

    assert!(!outcome.accepted);
    assert!(outcome.reason.contains("too low"));
    assert!(thornwood.treaties.is_empty());
    assert!(ashen.treaties.is_empty());
}

#[test]
fn test_spearmen_break_on_the_bone_legion() {
    let mut thornwood = fixtures::thornwood();
    let mut ashen = fixtures::ashen_court();

    let spearmen: Vec<_> = members_to_units(&thornwood)
        .into_iter()
        .filter(|u| u.name == "Spearmen")
        .collect();
    let defenders = members_to_units(&ashen);
    let id = initiate_engagement(
        &mut thornwood,
        &mut ashen,
        EngagementKind::Battle,
        spearmen,
        Some("Blackwater Ford".into()),
        "1492-03-10",
    );
    assert_eq!(relationship_value(&thornwood, "Ashen Court"), -90);
    assert_eq!(relationship_value(&ashen, "Thornwood"), -85);

    let outcome = simulate_battle(&mut thornwood, &mut ashen, &id, &defenders).unwrap();

    // 382 against 518 behind a 1.2 defense bonus
    assert_eq!(outcome.attacker_strength, 382);
    assert_eq!(outcome.defender_strength, 518);
    assert_eq!(outcome.victor, Victor::Defender);
    assert_eq!(outcome.attacker_casualties, 50);
    assert_eq!(outcome.defender_casualties, 15);
    assert_eq!(thornwood.member("Spearmen").and_then(|m| m.quantity), Some(50));
    assert_eq!(ashen.member("Bone Legion").and_then(|m| m.quantity), Some(135));
    assert_eq!(thornwood.military_engagements[0].status, EngagementStatus::Defeat);

    assert!(simulate_battle(&mut thornwood, &mut ashen, &id, &defenders).is_err());
}

#[test]
fn test_failed_transfer_changes_nothing() {
    let mut factions = fixtures::sample_factions();
    let (left, right) = factions.split_at_mut(1);
    let thornwood = &mut left[0];
    let rangers = &mut right[0];
    assert_eq!(rangers.name, "Thornwood Rangers");

    let request = Resources::from([(keys::GOLD, 100.0), (keys::MAGIC, 5.0)]);
    let err = transfer_resources(rangers, thornwood, &request).unwrap_err();

    assert!(err.to_string().contains("Insufficient"));
    assert_eq!(rangers.resource(keys::GOLD), 200.0);
    assert_eq!(thornwood.resource(keys::GOLD), 1800.0);
    assert_eq!(thornwood.resource(keys::MAGIC), 40.0);
}

#[test]
fn test_month_of_ticks() {
    let mut factions = fixtures::sample_factions();
    let config = SimConfig::default();
    let mut rng = SimRng::from_seed_u64(1492);

    for day in 1..=30 {
        let tick = SimulationTick::new(format!("1492-04-{:02}", day), 1);
        let results = simulate_factions(&mut factions, &tick, &config, &mut rng);
        assert_eq!(results.len(), 4);
    }

    let thornwood = &factions[0];
    // The smiths started half done and finish within a week.
    let smiths = thornwood.member("Smiths").unwrap();
    assert!(smiths.job.is_none());
    // 40 a day from the Ironmere route keeps the treasury growing.
    assert!(thornwood.resource(keys::GOLD) > 1800.0);
    for faction in &factions {
        for (_, amount) in faction.resources.iter().flat_map(|r| r.iter()) {
            assert!(amount >= 0.0);
        }
    }
}

#[test]
fn test_corvin_is_a_betrayal_risk() {
    let thornwood = fixtures::thornwood();
    let mira = thornwood.member("Mira Ashvale").and_then(|m| m.personality.as_ref()).unwrap();
    let corvin = thornwood.member("Corvin Reed").and_then(|m| m.personality.as_ref()).unwrap();

    assert!(betrayal_probability(corvin) > 0.3);
    assert!(betrayal_probability(mira) < betrayal_probability(corvin));
}
