//! Member Locations
//!
//! Groups members by where they stand. Named points are resolved by a
//! lookup the host supplies; the simulation never owns a map.

use std::collections::BTreeMap;

use faction_records::{Faction, FactionMember, HexCoord, Position};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bodies needed at one spot before it counts as a camp.
pub const MIN_CAMP_HEADCOUNT: u32 = 3;

/// A spot where a faction has gathered enough members to count as a camp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camp {
    pub faction: String,
    pub hex: HexCoord,
    /// Point name when the camp was placed through a named point.
    pub location_name: Option<String>,
    pub members: Vec<String>,
    pub headcount: u32,
}

/// Members standing on `hex`, per faction. Factions with nobody there are
/// left out.
pub fn members_at_hex<'a>(factions: &'a [Faction], hex: HexCoord) -> Vec<(&'a Faction, Vec<&'a FactionMember>)> {
    factions
        .iter()
        .filter_map(|faction| {
            let here: Vec<&FactionMember> = faction
                .members
                .iter()
                .filter(|m| matches!(&m.position, Some(Position::Hex { hex: h }) if *h == hex))
                .collect();
            (!here.is_empty()).then_some((faction, here))
        })
        .collect()
}

/// Resolves a member's position. Expeditions are on the road and have none.
fn resolve<F>(position: &Position, lookup: &F) -> Option<(HexCoord, Option<String>)>
where
    F: Fn(&str) -> Option<HexCoord>,
{
    match position {
        Position::Hex { hex } => Some((*hex, None)),
        Position::NamedPoint { name } => lookup(name).map(|hex| (hex, Some(name.clone()))),
        Position::Expedition { .. } => None,
    }
}

/// Camps of one faction, ordered by coordinate.
pub fn faction_camps<F>(faction: &Faction, lookup: F) -> Vec<Camp>
where
    F: Fn(&str) -> Option<HexCoord>,
{
    let mut by_hex: BTreeMap<(i32, i32), Camp> = BTreeMap::new();

    for member in &faction.members {
        let Some(position) = member.position.as_ref() else {
            continue;
        };
        let Some((hex, location_name)) = resolve(position, &lookup) else {
            if let Position::NamedPoint { name } = position {
                debug!(faction = %faction.name, member = %member.name, point = %name, "Unresolved named point");
            }
            continue;
        };

        let camp = by_hex.entry((hex.q, hex.r)).or_insert_with(|| Camp {
            faction: faction.name.clone(),
            hex,
            location_name: None,
            members: Vec::new(),
            headcount: 0,
        });
        if camp.location_name.is_none() {
            camp.location_name = location_name;
        }
        camp.members.push(member.name.clone());
        camp.headcount += member.headcount();
    }

    by_hex
        .into_values()
        .filter(|camp| camp.headcount >= MIN_CAMP_HEADCOUNT)
        .collect()
}
