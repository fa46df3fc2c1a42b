//! Storyteller Configuration
//!
//! Thresholds that decide when faction state becomes a story, and how many
//! hooks to hand the game master at once.

use serde::{Deserialize, Serialize};
use std::path::Path;

use faction_sim::ConfigError;

/// Complete storyteller configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorytellerConfig {
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl StorytellerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// When faction state is dramatic enough for a hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Gold below which a faction is in economic trouble
    pub gold_trouble: f64,
    /// Food below which a faction is going hungry
    pub food_trouble: f64,
    /// Relationship below which two factions are at the brink of war
    pub war_below: i32,
    /// Relationship below which tensions are rising
    pub tension_below: i32,
    /// Relationship above which two factions are close allies
    pub alliance_above: i32,
    /// Betrayal probability above which a member is flagged as a traitor
    pub betrayal_risk: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            gold_trouble: 200.0,
            food_trouble: 100.0,
            war_below: -60,
            tension_below: -20,
            alliance_above: 60,
            betrayal_risk: 0.3,
        }
    }
}

/// Shape of the final hook list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Hooks below this urgency are dropped (1-5)
    pub min_urgency: u8,
    /// Maximum hooks returned; 0 means unlimited
    pub max_hooks: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            min_urgency: 1,
            max_hooks: 0,
        }
    }
}

/// A commented configuration file with every default spelled out.
pub fn default_config_toml() -> String {
    r#"# Storyteller Configuration

[thresholds]
# Resource levels that read as a faction in trouble
gold_trouble = 200.0
food_trouble = 100.0

# Relationship bands between two factions
war_below = -60
tension_below = -20
alliance_above = 60

# Betrayal probability at which a member is flagged
betrayal_risk = 0.3

[output]
min_urgency = 1
# 0 = unlimited
max_hooks = 0
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = StorytellerConfig::default();
        assert_eq!(config.thresholds.war_below, -60);
        assert_eq!(config.thresholds.gold_trouble, 200.0);
        assert_eq!(config.output.max_hooks, 0);
    }

    #[test]
    fn test_template_matches_defaults() {
        let config = StorytellerConfig::from_str(&default_config_toml()).unwrap();
        assert_eq!(config, StorytellerConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = StorytellerConfig::from_str("[output]\nmax_hooks = 5\n").unwrap();
        assert_eq!(config.output.max_hooks, 5);
        assert_eq!(config.output.min_urgency, 1);
        assert_eq!(config.thresholds, ThresholdConfig::default());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = StorytellerConfig::default();
        config.thresholds.alliance_above = 75;
        let text = config.to_toml().unwrap();
        assert_eq!(StorytellerConfig::from_str(&text).unwrap(), config);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[thresholds]\nbetrayal_risk = 0.5").unwrap();
        let config = StorytellerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.thresholds.betrayal_risk, 0.5);
    }

    #[test]
    fn test_invalid_toml() {
        let err = StorytellerConfig::from_str("[output\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
