//! Sample faction fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // faction-records = { path = "../faction-records", features = ["test-fixtures"] }
//!
//! use faction_records::fixtures;
//!
//! let factions = fixtures::sample_factions();
//! let thornwood = fixtures::thornwood();
//! ```

use crate::Faction;

/// Returns the sample factions from the fixtures file.
///
/// Contains 4 factions:
/// - Thornwood (root; trade partner of Ironmere, hostile to Ashen Court)
/// - Thornwood Rangers (subfaction of Thornwood)
/// - Ironmere (wealthy guild)
/// - Ashen Court (undead conquerors)
pub fn sample_factions() -> Vec<Faction> {
    let json = include_str!("../tests/fixtures/sample_factions.json");
    serde_json::from_str(json).expect("Failed to parse sample_factions.json")
}

/// Returns a specific faction by name from the samples.
pub fn get_faction(name: &str) -> Option<Faction> {
    sample_factions().into_iter().find(|f| f.name == name)
}

/// Returns the Thornwood root faction.
pub fn thornwood() -> Faction {
    get_faction("Thornwood").expect("Thornwood missing from fixtures")
}

/// Returns the Ashen Court, Thornwood's enemy.
pub fn ashen_court() -> Faction {
    get_faction("Ashen Court").expect("Ashen Court missing from fixtures")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_factions_load() {
        let factions = sample_factions();
        assert_eq!(factions.len(), 4);
    }

    #[test]
    fn test_subfaction_link() {
        let rangers = get_faction("Thornwood Rangers").unwrap();
        assert_eq!(rangers.parent_faction.as_deref(), Some("Thornwood"));
    }

    #[test]
    fn test_thornwood_members() {
        let thornwood = thornwood();
        assert_eq!(thornwood.members.len(), 4);
        assert_eq!(thornwood.member("Spearmen").and_then(|m| m.quantity), Some(100));
    }
}
