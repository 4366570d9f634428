//! Reference in-memory host: a region graph plus a monotone fixed-point sweep.
//!
//! Production hosts bring their own graph and search. This one implements
//! [`WorldBuilder`] and [`ReachState`] just far enough to exercise compiled
//! logic end to end in tests and in the headless harness.
//!
//! The sweep alternates a BFS over traversable exits with a pass that
//! collects items from newly reachable locations, until nothing changes.
//! Every predicate is monotone, so the sweep terminates.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::Serialize;

use crate::error::GenerationError;
use crate::formula::Predicate;
use crate::world::{ItemCounts, LocationKind, ReachState, WorldBuilder};

/// A multiset of collected items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    counts: BTreeMap<String, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: &str, n: u32) {
        if n > 0 {
            *self.counts.entry(item.to_string()).or_insert(0) += n;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl ItemCounts for Inventory {
    fn count(&self, item: &str) -> u32 {
        self.counts.get(item).copied().unwrap_or(0)
    }
}

/// Snapshot of what a sweep reached.
#[derive(Debug, Clone, Default)]
pub struct Reachability {
    inventory: Inventory,
    regions: BTreeSet<String>,
    locations: BTreeSet<String>,
}

impl Reachability {
    pub fn from_inventory(inventory: Inventory) -> Self {
        Self {
            inventory,
            ..Self::default()
        }
    }

    pub fn mark_region(&mut self, region: &str) {
        self.regions.insert(region.to_string());
    }

    pub fn mark_location(&mut self, location: &str) {
        self.locations.insert(location.to_string());
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn regions(&self) -> &BTreeSet<String> {
        &self.regions
    }

    pub fn locations(&self) -> &BTreeSet<String> {
        &self.locations
    }
}

impl ItemCounts for Reachability {
    fn count(&self, item: &str) -> u32 {
        self.inventory.count(item)
    }
}

impl ReachState for Reachability {
    fn can_reach_region(&self, region: &str) -> bool {
        self.regions.contains(region)
    }

    fn can_reach_location(&self, location: &str) -> bool {
        self.locations.contains(location)
    }
}

#[derive(Debug, Clone)]
struct Exit {
    name: String,
    target: String,
    predicate: Predicate,
}

#[derive(Debug, Clone, Default)]
struct RegionNode {
    exits: Vec<Exit>,
    locations: Vec<String>,
}

#[derive(Debug, Clone)]
struct Slot {
    region: String,
    kind: LocationKind,
    predicate: Predicate,
    item: Option<String>,
    locked: bool,
}

/// In-memory region graph. The first region created is the root.
#[derive(Debug, Clone, Default)]
pub struct WorldGraph {
    regions: BTreeMap<String, RegionNode>,
    locations: BTreeMap<String, Slot>,
    root: Option<String>,
}

impl WorldGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub fn entrance_count(&self) -> usize {
        self.regions.values().map(|r| r.exits.len()).sum()
    }

    /// `(entrance, target)` pairs leaving a region, in creation order.
    pub fn exits(&self, region: &str) -> Vec<(&str, &str)> {
        self.regions
            .get(region)
            .map(|r| {
                r.exits
                    .iter()
                    .map(|e| (e.name.as_str(), e.target.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn entrance_predicate(&self, entrance: &str) -> Option<&Predicate> {
        self.regions
            .values()
            .flat_map(|r| r.exits.iter())
            .find(|e| e.name == entrance)
            .map(|e| &e.predicate)
    }

    pub fn location_predicate(&self, location: &str) -> Option<&Predicate> {
        self.locations.get(location).map(|s| &s.predicate)
    }

    pub fn location_kind(&self, location: &str) -> Option<LocationKind> {
        self.locations.get(location).map(|s| s.kind)
    }

    pub fn location_region(&self, location: &str) -> Option<&str> {
        self.locations.get(location).map(|s| s.region.as_str())
    }

    pub fn item_at(&self, location: &str) -> Option<&str> {
        self.locations.get(location).and_then(|s| s.item.as_deref())
    }

    pub fn is_locked(&self, location: &str) -> bool {
        self.locations.get(location).is_some_and(|s| s.locked)
    }

    /// Pool locations without an item, in name order.
    pub fn open_pool_locations(&self) -> Vec<&str> {
        self.locations
            .iter()
            .filter(|(_, s)| !s.kind.is_event() && s.item.is_none())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Put a shuffled item into an open pool location. Locked slots keep
    /// their item.
    pub fn fill(&mut self, location: &str, item: &str) -> Result<(), GenerationError> {
        let slot = self
            .locations
            .get_mut(location)
            .ok_or_else(|| GenerationError::UnknownLocation(location.to_string()))?;
        if slot.locked {
            return Err(GenerationError::LockedLocation(location.to_string()));
        }
        slot.item = Some(item.to_string());
        Ok(())
    }

    /// Fixed-point reachability from the root, starting with `start` items.
    pub fn sweep(&self, start: Inventory) -> Reachability {
        let mut state = Reachability::from_inventory(start);
        let Some(root) = self.root.as_deref() else {
            return state;
        };

        loop {
            let regions = self.reachable_regions(root, &state);
            let mut found = Vec::new();
            for region in &regions {
                let Some(node) = self.regions.get(region) else {
                    continue;
                };
                for location in &node.locations {
                    if state.locations.contains(location) {
                        continue;
                    }
                    if let Some(slot) = self.locations.get(location) {
                        if slot.predicate.evaluate(&state) {
                            found.push(location.clone());
                        }
                    }
                }
            }

            let grew = regions.len() > state.regions.len() || !found.is_empty();
            state.regions = regions;
            for location in found {
                if let Some(item) = self.locations.get(&location).and_then(|s| s.item.as_deref()) {
                    state.inventory.add(item, 1);
                }
                state.locations.insert(location);
            }
            if !grew {
                return state;
            }
        }
    }

    fn reachable_regions(&self, root: &str, state: &Reachability) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        visited.insert(root.to_string());
        queue.push_back(root);

        while let Some(current) = queue.pop_front() {
            let Some(node) = self.regions.get(current) else {
                continue;
            };
            for exit in &node.exits {
                if visited.contains(&exit.target) {
                    continue;
                }
                if exit.predicate.evaluate(state) {
                    visited.insert(exit.target.clone());
                    queue.push_back(exit.target.as_str());
                }
            }
        }
        visited
    }
}

impl WorldBuilder for WorldGraph {
    fn create_region(&mut self, name: &str) {
        if self.root.is_none() {
            self.root = Some(name.to_string());
        }
        self.regions.entry(name.to_string()).or_default();
    }

    fn has_region(&self, name: &str) -> bool {
        self.regions.contains_key(name)
    }

    fn connect(&mut self, from: &str, to: &str, entrance: &str, predicate: Predicate) {
        if let Some(node) = self.regions.get_mut(from) {
            node.exits.push(Exit {
                name: entrance.to_string(),
                target: to.to_string(),
                predicate,
            });
        }
    }

    fn add_location(&mut self, region: &str, name: &str, kind: LocationKind, predicate: Predicate) {
        if let Some(node) = self.regions.get_mut(region) {
            node.locations.push(name.to_string());
        }
        self.locations.insert(
            name.to_string(),
            Slot {
                region: region.to_string(),
                kind,
                predicate,
                item: None,
                locked: false,
            },
        );
    }

    fn place_locked_item(&mut self, location: &str, item: &str) -> Result<(), GenerationError> {
        let slot = self
            .locations
            .get_mut(location)
            .ok_or_else(|| GenerationError::UnknownLocation(location.to_string()))?;
        slot.item = Some(item.to_string());
        slot.locked = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::atoms::Atom;
    use crate::capability::LogicContext;
    use crate::formula::{AccessFormula, Predicate};
    use crate::tiers::{active_tiers, Difficulty, ModifierSet, Tier};

    fn needs(item: &str) -> Predicate {
        let tiers = active_tiers(Difficulty::Casual, &ModifierSet::new());
        let formula = AccessFormula::new().with(Tier::Casual, vec![Atom::Item(item.into())]);
        Predicate::compile(&formula.into(), &tiers, &Arc::new(LogicContext::default()))
    }

    fn free() -> Predicate {
        let tiers = active_tiers(Difficulty::Casual, &ModifierSet::new());
        Predicate::compile(&AccessFormula::free().into(), &tiers, &Arc::new(LogicContext::default()))
    }

    // Menu -> A (free) -> B (needs Bash); Bash sits in A.
    fn chain() -> WorldGraph {
        let mut g = WorldGraph::new();
        g.create_region("Menu");
        g.create_region("A");
        g.create_region("B");
        g.connect("Menu", "A", "Menu_to_A_1", free());
        g.connect("A", "B", "A_to_B_1", needs("Bash"));
        g.add_location("A", "BashTree", LocationKind::Pool(1), free());
        g.add_location("B", "Deep", LocationKind::Pool(2), needs("Stomp"));
        g
    }

    #[test]
    fn root_is_first_region() {
        assert_eq!(chain().root(), Some("Menu"));
    }

    #[test]
    fn sweep_without_items() {
        let g = chain();
        let state = g.sweep(Inventory::new());
        assert!(state.can_reach_region("A"));
        assert!(!state.can_reach_region("B"));
        assert!(state.can_reach_location("BashTree"));
    }

    #[test]
    fn sweep_collects_placed_items() {
        let mut g = chain();
        g.fill("BashTree", "Bash").unwrap();
        let state = g.sweep(Inventory::new());
        assert!(state.can_reach_region("B"));
        assert!(!state.can_reach_location("Deep"));
        assert_eq!(state.count("Bash"), 1);
    }

    #[test]
    fn locked_items_marked() {
        let mut g = chain();
        g.place_locked_item("Deep", "Relic").unwrap();
        assert!(g.is_locked("Deep"));
        assert_eq!(g.item_at("Deep"), Some("Relic"));
        assert_eq!(g.open_pool_locations(), vec!["BashTree"]);
    }

    #[test]
    fn fill_refuses_locked_slot() {
        let mut g = chain();
        g.place_locked_item("BashTree", "EnergyCell").unwrap();
        assert_eq!(
            g.fill("BashTree", "Bash"),
            Err(GenerationError::LockedLocation("BashTree".into()))
        );
        assert_eq!(g.item_at("BashTree"), Some("EnergyCell"));
    }

    #[test]
    fn location_predicates_are_kept() {
        let g = chain();
        assert!(!g.location_predicate("Deep").unwrap().is_never());
        assert!(g.location_predicate("Nope").is_none());
    }

    #[test]
    fn unknown_location_errors() {
        let mut g = chain();
        assert_eq!(
            g.place_locked_item("Nope", "Relic"),
            Err(GenerationError::UnknownLocation("Nope".into()))
        );
    }

    #[test]
    fn never_edges_block() {
        let mut g = chain();
        g.connect("Menu", "B", "Menu_to_B_1", Predicate::Never);
        let state = g.sweep(Inventory::new());
        assert!(!state.can_reach_region("B"));
        assert_eq!(g.entrance_count(), 3);
    }
}
