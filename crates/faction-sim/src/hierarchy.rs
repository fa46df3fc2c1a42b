//! Subfaction Hierarchy
//!
//! Parent links form a forest over the faction collection. Lookups take the
//! whole collection as a slice since the records carry parent names only.

use std::collections::{HashSet, VecDeque};

use faction_records::{Faction, Resources};

use crate::SimError;

/// Default share of the parent's stock a subfaction inherits.
pub const DEFAULT_INHERITANCE_RATE: f64 = 0.1;

fn find<'a>(all: &'a [Faction], name: &str) -> Option<&'a Faction> {
    all.iter().find(|f| f.name == name)
}

/// Walks `name`'s parent chain to its root.
pub fn validate_hierarchy(name: &str, all: &[Faction]) -> Result<(), SimError> {
    let mut current = find(all, name).ok_or_else(|| SimError::MissingActor(name.to_string()))?;
    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(current.name.as_str());

    while let Some(parent_name) = current.parent_faction.as_deref() {
        let parent = find(all, parent_name).ok_or_else(|| SimError::ParentNotFound {
            faction: current.name.clone(),
            parent: parent_name.to_string(),
        })?;
        if !seen.insert(parent.name.as_str()) {
            return Err(SimError::CircularDependency {
                faction: parent.name.clone(),
            });
        }
        current = parent;
    }
    Ok(())
}

/// Validates every faction in the collection.
pub fn validate_all(all: &[Faction]) -> Result<(), SimError> {
    all.iter().try_for_each(|f| validate_hierarchy(&f.name, all))
}

/// Credits the child with `floor(parent * rate)` of every parent resource.
/// The parent is not debited. Returns what was credited.
pub fn inherit_resources(parent: &Faction, child: &mut Faction, rate: f64) -> Resources {
    let Some(source) = parent.resources.as_ref() else {
        return Resources::new();
    };
    let share: Resources = source
        .iter()
        .map(|(key, amount)| (key, (amount * rate).floor()))
        .filter(|(_, amount)| *amount > 0.0)
        .collect();

    child.resources_mut().merge(&share);
    tracing::debug!(parent = %parent.name, child = %child.name, rate, "Resources inherited");
    share
}

/// Adds the parent's culture tags the child does not already carry.
pub fn inherit_culture(parent: &Faction, child: &mut Faction) {
    for tag in &parent.culture_tags {
        if !child.culture_tags.contains(tag) {
            child.culture_tags.push(tag.clone());
        }
    }
}

/// Direct children of `name`.
pub fn subfactions<'a>(name: &str, all: &'a [Faction]) -> Vec<&'a Faction> {
    all.iter()
        .filter(|f| f.parent_faction.as_deref() == Some(name))
        .collect()
}

/// `root` followed by every descendant, breadth first.
pub fn get_hierarchy<'a>(root: &str, all: &'a [Faction]) -> Vec<&'a Faction> {
    let Some(start) = find(all, root) else {
        return Vec::new();
    };
    let mut seen: HashSet<&str> = HashSet::from([start.name.as_str()]);
    let mut queue = VecDeque::from([start]);
    let mut out = Vec::new();

    while let Some(faction) = queue.pop_front() {
        out.push(faction);
        for child in subfactions(&faction.name, all) {
            if seen.insert(child.name.as_str()) {
                queue.push_back(child);
            }
        }
    }
    out
}

/// Topmost ancestor of `name`. Stops at the last faction before a cycle or
/// a missing parent.
pub fn root_of<'a>(name: &str, all: &'a [Faction]) -> Option<&'a Faction> {
    let mut current = find(all, name)?;
    let mut seen: HashSet<&str> = HashSet::from([current.name.as_str()]);
    while let Some(parent) = current.parent_faction.as_deref().and_then(|p| find(all, p)) {
        if !seen.insert(parent.name.as_str()) {
            break;
        }
        current = parent;
    }
    Some(current)
}

/// Sums every resource key across the hierarchy under `root`, counting each
/// faction once.
pub fn hierarchy_resources(root: &str, all: &[Faction]) -> Resources {
    let mut total = Resources::new();
    for faction in get_hierarchy(root, all) {
        if let Some(resources) = &faction.resources {
            total.merge(resources);
        }
    }
    total
}

/// Moves `amounts` from `from` to `to`. Every key is checked before anything
/// is debited; on error neither record changes.
pub fn transfer_resources(from: &mut Faction, to: &mut Faction, amounts: &Resources) -> Result<(), SimError> {
    let source = from
        .resources
        .as_mut()
        .ok_or_else(|| SimError::NoResources(from.name.clone()))?;

    if let Some((key, required)) = amounts.iter().find(|(key, amount)| source.get(key) < *amount) {
        return Err(SimError::insufficient(key, required, source.get(key)));
    }

    for (key, amount) in amounts.iter() {
        source.add(key, -amount);
    }
    to.resources_mut().merge(amounts);

    tracing::info!(from = %from.name, to = %to.name, ?amounts, "Resources transferred");
    Ok(())
}
