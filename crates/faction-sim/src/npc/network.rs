//! Social Network
//!
//! Personal bonds between named individuals, possibly across factions.
//! Bonds are stored directed (source to target) but most queries treat the
//! pair as undirected.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use faction_records::Faction;
use serde::{Deserialize, Serialize};

use crate::SimError;

/// Network tuning
pub mod network_constants {
    pub const MIN_STRENGTH: i32 = -100;
    pub const MAX_STRENGTH: i32 = 100;
    pub const HISTORY_LIMIT: usize = 10;
    /// Strength needed before secrets are shared
    pub const SECRET_SHARING_STRENGTH: i32 = 20;
    pub const SECRET_SHARING_BONUS: i32 = 5;
    pub const FRIEND_STRENGTH: i32 = 40;
    pub const ENEMY_STRENGTH: i32 = -40;
    pub const DEFAULT_MIN_CLUSTER: usize = 3;
    pub const ADMIRER_STRENGTH: i32 = 60;
    pub const SOURED_SECRET_STRENGTH: i32 = -20;
    pub const FEUD_STRENGTH: i32 = -60;
}

use network_constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondKind {
    Friend,
    Rival,
    Mentor,
    Student,
    Family,
    Lover,
    Enemy,
    Ally,
    Colleague,
}

/// A personal bond from `source` to `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcBond {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: BondKind,
    /// In [-100, 100]
    pub strength: i32,
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default)]
    pub shared_secrets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_interaction: Option<String>,
}

impl NpcBond {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: BondKind, strength: i32) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            strength: strength.clamp(MIN_STRENGTH, MAX_STRENGTH),
            history: Vec::new(),
            shared_secrets: Vec::new(),
            last_interaction: None,
        }
    }

    /// The other end of the bond as seen from `name`.
    pub fn other(&self, name: &str) -> &str {
        if self.source == name {
            &self.target
        } else {
            &self.source
        }
    }

    pub fn involves(&self, name: &str) -> bool {
        self.source == name || self.target == name
    }

    /// Shifts strength, keeping the last ten noted reasons.
    pub fn adjust(&mut self, delta: i32, reason: Option<&str>, date: &str) -> i32 {
        self.strength = self.strength.saturating_add(delta).clamp(MIN_STRENGTH, MAX_STRENGTH);
        self.last_interaction = Some(date.to_string());
        if let Some(reason) = reason {
            self.history.push(format!("{}: {}", date, reason));
            if self.history.len() > HISTORY_LIMIT {
                let excess = self.history.len() - HISTORY_LIMIT;
                self.history.drain(..excess);
            }
        }
        self.strength
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterKind {
    FamilyUnit,
    Conspiracy,
    ProfessionalNetwork,
    FriendshipCircle,
    Cabal,
}

/// A tightly bonded group of individuals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcCluster {
    pub id: String,
    pub members: Vec<String>,
    /// Average strength of the bonds inside the cluster
    pub cohesion: f64,
    #[serde(rename = "type")]
    pub kind: ClusterKind,
}

/// A bond whose ends belong to different factions.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossFactionLink<'a> {
    pub npc1: &'a str,
    pub faction1: &'a str,
    pub npc2: &'a str,
    pub faction2: &'a str,
    pub bond: &'a NpcBond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkEventKind {
    LoveTriangle,
    BetrayalBrewing,
    SecretExposed,
    AllianceForming,
    FeudEscalating,
}

/// A brewing personal drama.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEvent {
    #[serde(rename = "type")]
    pub kind: NetworkEventKind,
    pub npcs: Vec<String>,
    pub description: String,
    /// 1 to 5
    pub urgency: u8,
}

/// All personal bonds, keyed by (source, target).
#[derive(Debug, Clone, Default)]
pub struct SocialNetwork {
    bonds: BTreeMap<(String, String), NpcBond>,
}

impl SocialNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the bond from `source` to `target`.
    pub fn connect(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        kind: BondKind,
        strength: i32,
    ) -> &mut NpcBond {
        let bond = NpcBond::new(source, target, kind, strength);
        let key = (bond.source.clone(), bond.target.clone());
        match self.bonds.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.insert(bond);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(bond),
        }
    }

    pub fn len(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bonds.is_empty()
    }

    pub fn bonds(&self) -> impl Iterator<Item = &NpcBond> {
        self.bonds.values()
    }

    /// Every bond touching `name`, in either direction.
    pub fn bonds_of(&self, name: &str) -> Vec<&NpcBond> {
        self.bonds.values().filter(|b| b.involves(name)).collect()
    }

    /// The bond between two individuals in either direction, preferring a→b.
    pub fn between(&self, a: &str, b: &str) -> Option<&NpcBond> {
        self.bonds
            .get(&(a.to_string(), b.to_string()))
            .or_else(|| self.bonds.get(&(b.to_string(), a.to_string())))
    }

    pub fn between_mut(&mut self, a: &str, b: &str) -> Option<&mut NpcBond> {
        let forward = (a.to_string(), b.to_string());
        let key = if self.bonds.contains_key(&forward) {
            forward
        } else {
            (b.to_string(), a.to_string())
        };
        self.bonds.get_mut(&key)
    }

    /// Adjusts the bond between `a` and `b`. Returns the new strength.
    pub fn adjust(&mut self, a: &str, b: &str, delta: i32, reason: Option<&str>, date: &str) -> Result<i32, SimError> {
        let bond = self
            .between_mut(a, b)
            .ok_or_else(|| SimError::not_found("Bond", format!("{} / {}", a, b)))?;
        Ok(bond.adjust(delta, reason, date))
    }

    /// Confides a secret along an existing bond, strengthening it.
    pub fn share_secret(&mut self, a: &str, b: &str, secret: impl Into<String>, date: &str) -> Result<(), SimError> {
        let bond = self
            .between_mut(a, b)
            .ok_or_else(|| SimError::not_found("Bond", format!("{} / {}", a, b)))?;
        if bond.strength < SECRET_SHARING_STRENGTH {
            return Err(SimError::RelationshipTooLow {
                required: SECRET_SHARING_STRENGTH,
                actual: bond.strength,
            });
        }
        bond.shared_secrets.push(secret.into());
        bond.adjust(SECRET_SHARING_BONUS, Some("Shared a secret"), date);
        Ok(())
    }

    /// Distinct partners of `name` in name order; a pair bonded both ways
    /// counts once.
    fn partners_where(&self, name: &str, keep: impl Fn(i32) -> bool) -> Vec<&str> {
        self.bonds
            .values()
            .filter(|b| b.involves(name) && keep(b.strength))
            .map(|b| b.other(name))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn friends(&self, name: &str) -> Vec<&str> {
        self.partners_where(name, |s| s >= FRIEND_STRENGTH)
    }

    pub fn enemies(&self, name: &str) -> Vec<&str> {
        self.partners_where(name, |s| s <= ENEMY_STRENGTH)
    }

    /// Connection count times mean absolute strength, scaled to 0..=1 per bond.
    pub fn influence(&self, name: &str) -> f64 {
        let bonds = self.bonds_of(name);
        if bonds.is_empty() {
            return 0.0;
        }
        let total: f64 = bonds.iter().map(|b| f64::from(b.strength.abs())).sum();
        let mean = total / bonds.len() as f64;
        bonds.len() as f64 * mean / 100.0
    }

    pub fn mutual_friends(&self, a: &str, b: &str) -> Vec<&str> {
        let theirs: HashSet<&str> = self.friends(b).into_iter().collect();
        self.friends(a).into_iter().filter(|f| theirs.contains(f)).collect()
    }

    /// Hops between two individuals over any bond, or `None` if unconnected.
    pub fn separation(&self, from: &str, to: &str) -> Option<usize> {
        let mut visited: HashSet<&str> = HashSet::from([from]);
        let mut queue = VecDeque::from([(from, 0usize)]);
        while let Some((name, depth)) = queue.pop_front() {
            if name == to {
                return Some(depth);
            }
            for bond in self.bonds_of(name) {
                let next = bond.other(name);
                if visited.insert(next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }
        None
    }

    fn individuals(&self) -> BTreeSet<&str> {
        self.bonds
            .values()
            .flat_map(|b| [b.source.as_str(), b.target.as_str()])
            .collect()
    }

    fn internal_bonds(&self, members: &[&str]) -> Vec<&NpcBond> {
        self.bonds
            .values()
            .filter(|b| members.contains(&b.source.as_str()) && members.contains(&b.target.as_str()))
            .collect()
    }

    fn cohesion(&self, members: &[&str]) -> f64 {
        let mut total = 0.0;
        let mut count = 0usize;
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                if let Some(bond) = self.between(a, b) {
                    total += f64::from(bond.strength);
                    count += 1;
                }
            }
        }
        if count == 0 {
            0.0
        } else {
            total / count as f64
        }
    }

    fn classify(&self, members: &[&str], cohesion: f64) -> ClusterKind {
        let bonds = self.internal_bonds(members);
        let n = bonds.len() as f64;
        let count = |kinds: &[BondKind]| bonds.iter().filter(|b| kinds.contains(&b.kind)).count() as f64;

        if count(&[BondKind::Family]) > n * 0.4 {
            ClusterKind::FamilyUnit
        } else if count(&[BondKind::Rival, BondKind::Enemy]) > n * 0.3 {
            ClusterKind::Conspiracy
        } else if count(&[BondKind::Colleague]) > n * 0.4 {
            ClusterKind::ProfessionalNetwork
        } else if count(&[BondKind::Friend]) > n * 0.5 {
            ClusterKind::FriendshipCircle
        } else if cohesion > 70.0 && bonds.iter().any(|b| !b.shared_secrets.is_empty()) {
            ClusterKind::Cabal
        } else {
            ClusterKind::FriendshipCircle
        }
    }

    /// Groups individuals around strong bonds. A seed gathers its strong
    /// partners, admitting each one strongly bonded to at least half of the
    /// group so far. Groups smaller than `min_size` are dropped.
    pub fn detect_clusters(&self, min_size: usize) -> Vec<NpcCluster> {
        let mut assigned: HashSet<&str> = HashSet::new();
        let mut clusters = Vec::new();

        for seed in self.individuals() {
            if assigned.contains(seed) {
                continue;
            }
            let candidates: BTreeSet<&str> = self
                .friends(seed)
                .into_iter()
                .filter(|c| !assigned.contains(c))
                .collect();

            let mut members = vec![seed];
            for candidate in candidates {
                let strong = members
                    .iter()
                    .filter(|m| {
                        self.between(candidate, m)
                            .is_some_and(|b| b.strength >= FRIEND_STRENGTH)
                    })
                    .count();
                if strong as f64 >= members.len() as f64 * 0.5 {
                    members.push(candidate);
                }
            }

            if members.len() >= min_size {
                let cohesion = self.cohesion(&members);
                clusters.push(NpcCluster {
                    id: format!("cluster_{}", clusters.len() + 1),
                    members: members.iter().map(|m| m.to_string()).collect(),
                    cohesion,
                    kind: self.classify(&members, cohesion),
                });
                assigned.extend(members);
            }
        }
        clusters
    }

    /// Bonds whose ends are named members of different factions.
    pub fn cross_faction_links<'a>(&'a self, factions: &'a [Faction]) -> Vec<CrossFactionLink<'a>> {
        let home = named_members(factions);
        self.bonds
            .values()
            .filter_map(|bond| {
                let faction1 = *home.get(bond.source.as_str())?;
                let faction2 = *home.get(bond.target.as_str())?;
                (faction1 != faction2).then_some(CrossFactionLink {
                    npc1: &bond.source,
                    faction1,
                    npc2: &bond.target,
                    faction2,
                    bond,
                })
            })
            .collect()
    }

    /// Mean strength of personal bonds between two factions' named members.
    pub fn diplomacy_influence(&self, a: &str, b: &str, factions: &[Faction]) -> f64 {
        let (Some(fa), Some(fb)) = (
            factions.iter().find(|f| f.name == a),
            factions.iter().find(|f| f.name == b),
        ) else {
            return 0.0;
        };

        let mut total = 0.0;
        let mut count = 0usize;
        for m1 in fa.members.iter().filter(|m| m.is_named) {
            for m2 in fb.members.iter().filter(|m| m.is_named) {
                if let Some(bond) = self.between(&m1.name, &m2.name) {
                    total += f64::from(bond.strength);
                    count += 1;
                }
            }
        }
        if count == 0 {
            0.0
        } else {
            total / count as f64
        }
    }

    /// Personal dramas worth surfacing, most urgent first.
    pub fn network_events(&self, factions: &[Faction]) -> Vec<NetworkEvent> {
        let mut events = Vec::new();

        for target in self.individuals() {
            let admirers: Vec<&NpcBond> = self
                .bonds
                .values()
                .filter(|b| {
                    b.target == target
                        && matches!(b.kind, BondKind::Lover | BondKind::Friend)
                        && b.strength >= ADMIRER_STRENGTH
                })
                .collect();
            if let [first, second, ..] = admirers.as_slice() {
                events.push(NetworkEvent {
                    kind: NetworkEventKind::LoveTriangle,
                    npcs: vec![first.source.clone(), second.source.clone(), target.to_string()],
                    description: format!(
                        "{} and {} both have strong feelings for {}",
                        first.source, second.source, target
                    ),
                    urgency: 2,
                });
            }
        }

        for member in factions.iter().flat_map(|f| f.members.iter()) {
            let Some(personality) = member.personality.as_ref().filter(|_| member.is_named) else {
                continue;
            };
            if personality.trust < 30 && personality.ambition > 70 {
                let enemies = self.enemies(&member.name);
                if !enemies.is_empty() {
                    let mut npcs = vec![member.name.clone()];
                    npcs.extend(enemies.iter().take(2).map(|e| e.to_string()));
                    events.push(NetworkEvent {
                        kind: NetworkEventKind::BetrayalBrewing,
                        npcs,
                        description: format!(
                            "{} has low loyalty, high ambition and enemies close at hand",
                            member.name
                        ),
                        urgency: 4,
                    });
                }
            }
        }

        for bond in self.bonds.values() {
            if !bond.shared_secrets.is_empty() && bond.strength < SOURED_SECRET_STRENGTH {
                events.push(NetworkEvent {
                    kind: NetworkEventKind::SecretExposed,
                    npcs: vec![bond.source.clone(), bond.target.clone()],
                    description: format!(
                        "{} and {} share secrets but have become enemies; blackmail or exposure is likely",
                        bond.source, bond.target
                    ),
                    urgency: 3,
                });
            }
        }

        for link in self.cross_faction_links(factions) {
            let mutual = self.mutual_friends(link.npc1, link.npc2);
            if mutual.len() >= 2 && link.bond.strength >= ADMIRER_STRENGTH {
                let mut npcs = vec![link.npc1.to_string(), link.npc2.to_string()];
                npcs.extend(mutual.iter().take(2).map(|m| m.to_string()));
                events.push(NetworkEvent {
                    kind: NetworkEventKind::AllianceForming,
                    npcs,
                    description: format!(
                        "{} ({}) and {} ({}) have strong ties and mutual friends; an alliance is possible",
                        link.npc1, link.faction1, link.npc2, link.faction2
                    ),
                    urgency: 2,
                });
            }
        }

        for bond in self.bonds.values() {
            if bond.strength <= FEUD_STRENGTH && bond.history.len() > 3 {
                let escalating = bond.history[bond.history.len() - 3..].iter().all(|h| {
                    h.contains("conflict") || h.contains("insult") || h.contains("betrayal")
                });
                if escalating {
                    events.push(NetworkEvent {
                        kind: NetworkEventKind::FeudEscalating,
                        npcs: vec![bond.source.clone(), bond.target.clone()],
                        description: format!(
                            "The feud between {} and {} is escalating; violence is likely",
                            bond.source, bond.target
                        ),
                        urgency: 4,
                    });
                }
            }
        }

        events.sort_by(|a, b| b.urgency.cmp(&a.urgency));
        events
    }
}

impl FromIterator<NpcBond> for SocialNetwork {
    fn from_iter<I: IntoIterator<Item = NpcBond>>(iter: I) -> Self {
        let bonds = iter
            .into_iter()
            .map(|b| ((b.source.clone(), b.target.clone()), b))
            .collect();
        Self { bonds }
    }
}

fn named_members(factions: &[Faction]) -> HashMap<&str, &str> {
    factions
        .iter()
        .flat_map(|f| {
            f.members
                .iter()
                .filter(|m| m.is_named)
                .map(move |m| (m.name.as_str(), f.name.as_str()))
        })
        .collect()
}
