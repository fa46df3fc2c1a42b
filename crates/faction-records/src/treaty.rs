//! Treaty Records
//!
//! Treaties are mirrored into every partner's record and move through a
//! status lifecycle; they are never deleted.

use serde::{Deserialize, Serialize};

/// Kind of agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatyKind {
    Alliance,
    MutualDefense,
    TradeAgreement,
    NonAggression,
    Vassal,
}

impl TreatyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreatyKind::Alliance => "alliance",
            TreatyKind::MutualDefense => "mutual_defense",
            TreatyKind::TradeAgreement => "trade_agreement",
            TreatyKind::NonAggression => "non_aggression",
            TreatyKind::Vassal => "vassal",
        }
    }
}

impl std::fmt::Display for TreatyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Treaty lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatyStatus {
    #[default]
    Active,
    Violated,
    Nullified,
    Expired,
}

/// An agreement between two or more factions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treaty {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TreatyKind,
    /// Every participating faction name, proposer first.
    pub parties: Vec<String>,
    #[serde(default)]
    pub terms: String,
    /// Signing date as supplied by the caller's calendar.
    pub signed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(default)]
    pub status: TreatyStatus,
    #[serde(default)]
    pub is_secret: bool,
}

impl Treaty {
    pub fn is_active(&self) -> bool {
        self.status == TreatyStatus::Active
    }

    pub fn involves(&self, faction: &str) -> bool {
        self.parties.iter().any(|p| p == faction)
    }

    /// Parties other than `faction`.
    pub fn partners_of<'a>(&'a self, faction: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.parties
            .iter()
            .map(|p| p.as_str())
            .filter(move |p| *p != faction)
    }
}
