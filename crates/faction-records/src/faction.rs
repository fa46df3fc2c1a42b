//! Faction Records
//!
//! The faction aggregate and its members. Each faction is owned
//! independently; operations that touch another faction take it explicitly.

use serde::{Deserialize, Serialize};

use crate::{
    DiplomaticIncident, EspionageOperation, IntelligenceReport, MarketEntry, MilitaryEngagement,
    NpcPersonality, ProductionChain, Relationship, Resources, TradeRoute, Treaty,
};

/// Axial hex coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

/// Where a member is. Resolving this to a map coordinate is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Position {
    Hex { hex: HexCoord },
    NamedPoint { name: String },
    Expedition { destination: String },
}

/// Member availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    #[default]
    Active,
    Injured,
    Missing,
    Dead,
}

/// Kind of work a member can be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Crafting,
    Gathering,
    Research,
    Training,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Crafting => "crafting",
            JobKind::Gathering => "gathering",
            JobKind::Research => "research",
            JobKind::Training => "training",
        }
    }
}

/// A work assignment; complete at progress 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "type")]
    pub kind: JobKind,
    #[serde(default)]
    pub progress: f64,
    /// Resource produced by gathering jobs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

impl Job {
    pub fn new(kind: JobKind) -> Self {
        Self {
            kind,
            progress: 0.0,
            resource: None,
        }
    }
}

/// A named individual or an anonymous group of `quantity` troops or workers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionMember {
    pub name: String,
    #[serde(default)]
    pub is_named: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub status: MemberStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<Job>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<NpcPersonality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morale: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<u8>,
}

impl FactionMember {
    /// Creates a named individual.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_named: true,
            quantity: None,
            role: None,
            status: MemberStatus::Active,
            job: None,
            position: None,
            personality: None,
            training: None,
            morale: None,
            equipment: None,
        }
    }

    /// Creates an anonymous group.
    pub fn group(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            is_named: false,
            quantity: Some(quantity),
            ..Self::named(name)
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_job(mut self, job: Job) -> Self {
        self.job = Some(job);
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_personality(mut self, personality: NpcPersonality) -> Self {
        self.personality = Some(personality);
        self
    }

    pub fn with_combat_stats(mut self, training: u8, morale: u8, equipment: u8) -> Self {
        self.training = Some(training.min(100));
        self.morale = Some(morale.min(100));
        self.equipment = Some(equipment.min(100));
        self
    }

    /// Number of bodies this member represents.
    pub fn headcount(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }

    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    pub fn role_is(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }
}

/// An autonomous political, economic or military entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    pub name: String,
    /// Absent until the faction holds anything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub treaties: Vec<Treaty>,
    #[serde(default)]
    pub members: Vec<FactionMember>,
    #[serde(default)]
    pub military_engagements: Vec<MilitaryEngagement>,
    #[serde(default)]
    pub markets: Vec<MarketEntry>,
    #[serde(default)]
    pub trade_routes: Vec<TradeRoute>,
    #[serde(default)]
    pub production_chains: Vec<ProductionChain>,
    #[serde(default)]
    pub espionage_operations: Vec<EspionageOperation>,
    #[serde(default)]
    pub intelligence_reports: Vec<IntelligenceReport>,
    #[serde(default)]
    pub diplomatic_incidents: Vec<DiplomaticIncident>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_faction: Option<String>,
    #[serde(default)]
    pub goal_tags: Vec<String>,
    #[serde(default)]
    pub influence_tags: Vec<String>,
    #[serde(default)]
    pub culture_tags: Vec<String>,
}

impl Faction {
    /// Creates an empty faction.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: None,
            relationships: Vec::new(),
            treaties: Vec::new(),
            members: Vec::new(),
            military_engagements: Vec::new(),
            markets: Vec::new(),
            trade_routes: Vec::new(),
            production_chains: Vec::new(),
            espionage_operations: Vec::new(),
            intelligence_reports: Vec::new(),
            diplomatic_incidents: Vec::new(),
            parent_faction: None,
            goal_tags: Vec::new(),
            influence_tags: Vec::new(),
            culture_tags: Vec::new(),
        }
    }

    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn with_member(mut self, member: FactionMember) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_relationship(mut self, target: impl Into<String>, value: i32) -> Self {
        self.relationships.push(Relationship::new(target, value));
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_faction = Some(parent.into());
        self
    }

    pub fn with_goals<I, S>(mut self, goals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.goal_tags.extend(goals.into_iter().map(Into::into));
        self
    }

    pub fn with_influences<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.influence_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_culture<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.culture_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_market(mut self, market: MarketEntry) -> Self {
        self.markets.push(market);
        self
    }

    /// Amount of a resource, 0 when absent.
    pub fn resource(&self, key: &str) -> f64 {
        self.resources.as_ref().map_or(0.0, |r| r.get(key))
    }

    /// Mutable resource bag, created empty if absent.
    pub fn resources_mut(&mut self) -> &mut Resources {
        self.resources.get_or_insert_with(Resources::new)
    }

    pub fn relationship(&self, target: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.faction_name == target)
    }

    pub fn relationship_mut(&mut self, target: &str) -> Option<&mut Relationship> {
        self.relationships.iter_mut().find(|r| r.faction_name == target)
    }

    pub fn treaty(&self, id: &str) -> Option<&Treaty> {
        self.treaties.iter().find(|t| t.id == id)
    }

    pub fn treaty_mut(&mut self, id: &str) -> Option<&mut Treaty> {
        self.treaties.iter_mut().find(|t| t.id == id)
    }

    pub fn member(&self, name: &str) -> Option<&FactionMember> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn member_mut(&mut self, name: &str) -> Option<&mut FactionMember> {
        self.members.iter_mut().find(|m| m.name == name)
    }

    pub fn engagement_mut(&mut self, id: &str) -> Option<&mut MilitaryEngagement> {
        self.military_engagements.iter_mut().find(|e| e.id == id)
    }

    /// Total bodies across all members.
    pub fn headcount(&self) -> u32 {
        self.members
            .iter()
            .fold(0u32, |total, m| total.saturating_add(m.headcount()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faction_builder() {
        let faction = Faction::new("Thornwood")
            .with_resources(Resources::from([("gold", 500.0)]))
            .with_member(FactionMember::named("Mira").with_role("Leader"))
            .with_member(FactionMember::group("Spearmen", 40))
            .with_relationship("Ironmere", 35)
            .with_goals(["trade"]);

        assert_eq!(faction.resource("gold"), 500.0);
        assert_eq!(faction.headcount(), 41);
        assert_eq!(faction.relationship("Ironmere").map(|r| r.value), Some(35));
        assert!(faction.member("Mira").is_some_and(|m| m.role_is("Leader")));
    }

    #[test]
    fn test_resources_mut_initializes_bag() {
        let mut faction = Faction::new("Empty");
        assert!(faction.resources.is_none());
        faction.resources_mut().add("food", 3.0);
        assert_eq!(faction.resource("food"), 3.0);
    }

    #[test]
    fn test_position_serializes_tagged() {
        let pos = Position::NamedPoint {
            name: "Old Mill".into(),
        };
        let json = serde_json::to_string(&pos).unwrap();
        assert!(json.contains(r#""type":"named_point""#));
    }

    #[test]
    fn test_deserializes_sparse_record() {
        let faction: Faction = serde_json::from_str(r#"{"name":"Ashen Court"}"#).unwrap();
        assert!(faction.members.is_empty());
        assert!(faction.resources.is_none());
    }
}
