//! Production Chains
//!
//! A chain consumes its inputs when started and pays out its outputs once
//! progress reaches 100%. Each assigned worker adds 10% to daily progress.

use faction_records::{generate_record_id, Faction, ProductionChain, Resources};

use crate::SimError;

/// Progress bonus per assigned worker.
pub const WORKER_BONUS: f64 = 0.1;

/// A reusable production recipe.
#[derive(Debug, Clone, Copy)]
pub struct ChainTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub inputs: &'static [(&'static str, f64)],
    pub outputs: &'static [(&'static str, f64)],
    pub duration_days: u32,
    pub required_building: &'static str,
    pub workers: u32,
}

impl ChainTemplate {
    pub fn inputs(&self) -> Resources {
        self.inputs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    pub fn outputs(&self) -> Resources {
        self.outputs.iter().map(|(k, v)| (*k, *v)).collect()
    }
}

pub const CHAIN_TEMPLATES: &[ChainTemplate] = &[
    ChainTemplate {
        key: "weapon_forging",
        name: "Weapon Forging",
        inputs: &[("equipment", 10.0), ("gold", 50.0)],
        outputs: &[("equipment", 50.0)],
        duration_days: 7,
        required_building: "Smithy",
        workers: 3,
    },
    ChainTemplate {
        key: "armor_crafting",
        name: "Armor Crafting",
        inputs: &[("equipment", 15.0), ("gold", 75.0)],
        outputs: &[("equipment", 75.0)],
        duration_days: 10,
        required_building: "Armory",
        workers: 4,
    },
    ChainTemplate {
        key: "bread_baking",
        name: "Bread Baking",
        inputs: &[("food", 20.0), ("gold", 10.0)],
        outputs: &[("food", 100.0)],
        duration_days: 2,
        required_building: "Bakery",
        workers: 2,
    },
    ChainTemplate {
        key: "ale_brewing",
        name: "Ale Brewing",
        inputs: &[("food", 30.0), ("gold", 20.0)],
        outputs: &[("food", 50.0), ("gold", 40.0)],
        duration_days: 14,
        required_building: "Brewery",
        workers: 3,
    },
    ChainTemplate {
        key: "potion_brewing",
        name: "Potion Brewing",
        inputs: &[("magic", 10.0), ("gold", 100.0)],
        outputs: &[("magic", 30.0)],
        duration_days: 5,
        required_building: "Alchemy Lab",
        workers: 1,
    },
    ChainTemplate {
        key: "scroll_scribing",
        name: "Scroll Scribing",
        inputs: &[("magic", 5.0), ("gold", 50.0)],
        outputs: &[("magic", 15.0)],
        duration_days: 3,
        required_building: "Scriptorium",
        workers: 1,
    },
];

pub fn chain_template(key: &str) -> Option<&'static ChainTemplate> {
    CHAIN_TEMPLATES.iter().find(|t| t.key == key)
}

/// Starts a chain from a template, debiting its inputs. Returns the chain id.
pub fn start_production_chain(faction: &mut Faction, template_key: &str) -> Result<String, SimError> {
    let template =
        chain_template(template_key).ok_or_else(|| SimError::not_found("Production template", template_key))?;
    let inputs = template.inputs();

    let held = faction
        .resources
        .as_ref()
        .ok_or_else(|| SimError::NoResources(faction.name.clone()))?;
    if let Some((resource, amount)) = inputs.iter().find(|(k, v)| !held.has(k, *v)) {
        return Err(SimError::insufficient(resource, amount, held.get(resource)));
    }

    let bag = faction.resources_mut();
    for (resource, amount) in inputs.iter() {
        bag.add(resource, -amount);
    }

    let id = generate_record_id("chain");
    faction.production_chains.push(ProductionChain {
        id: id.clone(),
        name: template.name.to_string(),
        inputs,
        outputs: template.outputs(),
        duration_days: template.duration_days,
        progress: 0.0,
        workers: template.workers,
        required_building: Some(template.required_building.to_string()),
    });
    tracing::info!(faction = %faction.name, chain = template.name, "Production chain started");
    Ok(id)
}

/// Daily progress in percent for a chain.
pub fn daily_progress(chain: &ProductionChain) -> f64 {
    let duration = chain.duration_days.max(1) as f64;
    let workers = chain.workers.max(1) as f64;
    100.0 / duration * (1.0 + workers * WORKER_BONUS)
}

/// Advances chains by `days`, removing completed ones. Returns the summed
/// outputs and the names of the chains that finished.
pub fn advance_production_chains(chains: &mut Vec<ProductionChain>, days: u32) -> (Resources, Vec<String>) {
    let mut produced = Resources::new();
    let mut finished = Vec::new();

    for chain in chains.iter_mut() {
        chain.progress += daily_progress(chain) * days as f64;
    }
    chains.retain(|chain| {
        if chain.is_complete() {
            produced.merge(&chain.outputs);
            finished.push(chain.name.clone());
            false
        } else {
            true
        }
    });

    (produced, finished)
}

/// Advances the faction's chains and credits outputs of completed ones.
pub fn process_production_chains(faction: &mut Faction, days: u32) -> Vec<String> {
    if faction.production_chains.is_empty() {
        return Vec::new();
    }
    let (produced, finished) = advance_production_chains(&mut faction.production_chains, days);
    if !finished.is_empty() {
        faction.resources_mut().merge(&produced);
        tracing::info!(faction = %faction.name, chains = ?finished, "Production chains completed");
    }
    finished
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smithy() -> Faction {
        Faction::new("Ironmere").with_resources(Resources::from([("gold", 100.0), ("equipment", 20.0)]))
    }

    #[test]
    fn test_start_debits_inputs() {
        let mut faction = smithy();
        start_production_chain(&mut faction, "weapon_forging").unwrap();

        assert_eq!(faction.resource("gold"), 50.0);
        assert_eq!(faction.resource("equipment"), 10.0);
        assert_eq!(faction.production_chains.len(), 1);
        assert_eq!(faction.production_chains[0].name, "Weapon Forging");
    }

    #[test]
    fn test_start_fails_without_inputs() {
        let mut faction = Faction::new("Poor").with_resources(Resources::from([("gold", 10.0)]));
        let err = start_production_chain(&mut faction, "weapon_forging").unwrap_err();
        assert!(err.to_string().contains("Insufficient"));
        assert_eq!(faction.resource("gold"), 10.0);
        assert!(faction.production_chains.is_empty());
    }

    #[test]
    fn test_start_without_resource_bag() {
        let mut faction = Faction::new("Empty");
        let err = start_production_chain(&mut faction, "bread_baking").unwrap_err();
        assert!(matches!(err, SimError::NoResources(_)));
    }

    #[test]
    fn test_unknown_template() {
        let mut faction = smithy();
        assert!(start_production_chain(&mut faction, "cheese_aging").is_err());
    }

    #[test]
    fn test_chain_completes_after_duration() {
        let mut faction = smithy();
        start_production_chain(&mut faction, "weapon_forging").unwrap();

        let finished = process_production_chains(&mut faction, 1);
        assert!(finished.is_empty());
        assert_eq!(faction.production_chains.len(), 1);

        let finished = process_production_chains(&mut faction, 6);
        assert_eq!(finished, vec!["Weapon Forging".to_string()]);
        assert!(faction.production_chains.is_empty());
        assert_eq!(faction.resource("equipment"), 60.0);
    }

    #[test]
    fn test_workers_speed_up_progress() {
        let mut chain = ProductionChain {
            id: "chain_1".into(),
            name: "Test".into(),
            inputs: Resources::new(),
            outputs: Resources::new(),
            duration_days: 10,
            progress: 0.0,
            workers: 1,
            required_building: None,
        };
        let solo = daily_progress(&chain);
        chain.workers = 5;
        assert!(daily_progress(&chain) > solo);
        assert!((solo - 11.0).abs() < 1e-9);
    }
}
