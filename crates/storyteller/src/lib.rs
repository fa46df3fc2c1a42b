//! Storyteller: plot hooks for the game master.
//!
//! The storyteller sits downstream of the simulation. It reads faction
//! state, AI decisions and tick results and turns whatever is dramatically
//! interesting into [`PlotHook`]s the game master can hand to players.
//!
//! # Modules
//!
//! - [`hooks`]: Hook generators for decisions, events, relationships and dramas
//! - [`config`]: Thresholds and output limits

pub mod config;
pub mod hooks;

pub use config::{default_config_toml, OutputConfig, StorytellerConfig, ThresholdConfig};
pub use faction_sim::ConfigError;
pub use hooks::{
    deduplicate, for_faction, from_decision, from_event, from_network_events, from_relationship,
    HookCategory, PlotHook,
};

use std::path::Path;

use faction_records::{Decision, Faction};
use faction_sim::npc::NetworkEvent;
use faction_sim::SimulationResult;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StorytellerError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown faction: {0}")]
    UnknownFaction(String),

    #[error("Failed to encode hooks: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Turns simulation state into a ranked list of plot hooks.
///
/// Every query returns hooks with duplicate titles removed, most urgent
/// first, filtered by `output.min_urgency` and capped at `output.max_hooks`
/// (0 means no cap).
#[derive(Debug, Clone, Default)]
pub struct Storyteller {
    config: StorytellerConfig,
}

impl Storyteller {
    pub fn new(config: StorytellerConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn from_config_file(path: &Path) -> Result<Self, StorytellerError> {
        let config = StorytellerConfig::from_file(path)?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &StorytellerConfig {
        &self.config
    }

    pub fn hooks_for_decision(&self, faction: &Faction, decision: &Decision) -> Vec<PlotHook> {
        self.finish(from_decision(faction, decision))
    }

    /// Hooks for the notable events of one tick.
    pub fn hooks_for_result(&self, result: &SimulationResult) -> Vec<PlotHook> {
        let hooks: Vec<PlotHook> = result.events.iter().filter_map(from_event).collect();
        debug!(
            faction = %result.faction_name,
            events = result.events.len(),
            hooks = hooks.len(),
            "Tick events reviewed"
        );
        self.finish(hooks)
    }

    /// Hooks for a single faction, judged against the rest of the campaign.
    pub fn hooks_for(&self, name: &str, factions: &[Faction]) -> Result<Vec<PlotHook>, StorytellerError> {
        let faction = factions
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| StorytellerError::UnknownFaction(name.to_string()))?;
        Ok(self.finish(for_faction(faction, factions, &self.config.thresholds)))
    }

    /// Hooks across every faction in the campaign.
    pub fn campaign_hooks(&self, factions: &[Faction]) -> Vec<PlotHook> {
        let hooks: Vec<PlotHook> = factions
            .iter()
            .flat_map(|f| for_faction(f, factions, &self.config.thresholds))
            .collect();
        let hooks = self.finish(hooks);
        info!(factions = factions.len(), hooks = hooks.len(), "Campaign hooks generated");
        hooks
    }

    pub fn network_hooks(&self, faction: &Faction, events: &[NetworkEvent]) -> Vec<PlotHook> {
        self.finish(from_network_events(faction, events))
    }

    pub fn to_json(&self, hooks: &[PlotHook]) -> Result<String, StorytellerError> {
        Ok(serde_json::to_string_pretty(hooks)?)
    }

    fn finish(&self, hooks: Vec<PlotHook>) -> Vec<PlotHook> {
        let output = &self.config.output;
        let mut hooks: Vec<PlotHook> = deduplicate(hooks)
            .into_iter()
            .filter(|h| h.urgency >= output.min_urgency)
            .collect();
        if output.max_hooks > 0 {
            hooks.truncate(output.max_hooks);
        }
        hooks
    }
}
