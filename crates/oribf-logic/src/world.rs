//! Seams to the host world runtime.
//!
//! The host owns the region graph, the collected-item multiset, and the
//! reachability search. This crate only reads that state through
//! [`ItemCounts`] / [`ReachState`] and writes to the graph through
//! [`WorldBuilder`]. All queries must be monotone in the collected items:
//! adding items never turns a `true` answer into `false`.

use serde::Serialize;

use crate::error::GenerationError;
use crate::formula::Predicate;

/// Owned item counts.
pub trait ItemCounts {
    fn count(&self, item: &str) -> u32;

    fn has(&self, item: &str, n: u32) -> bool {
        self.count(item) >= n
    }
}

/// Reachability queries answered by the host's fixed-point search.
pub trait ReachState: ItemCounts {
    fn can_reach_region(&self, region: &str) -> bool;
    fn can_reach_location(&self, location: &str) -> bool;
}

/// Whether a location is an exposed slot or a logic-only event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    /// A real pickup with a host-visible id.
    Pool(u64),
    /// Gates logical progress; never shown to players.
    Event,
}

impl LocationKind {
    pub fn is_event(self) -> bool {
        matches!(self, LocationKind::Event)
    }
}

/// Why an item was pinned outside the shuffled pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlacementReason {
    FirstEnergy,
    ProgressiveCounter,
    Relic,
}

/// A locked, non-shuffled grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForcedPlacement {
    pub location: String,
    pub item: String,
    pub reason: PlacementReason,
}

/// Mutation points on the host graph.
pub trait WorldBuilder {
    fn create_region(&mut self, name: &str);

    fn has_region(&self, name: &str) -> bool;

    /// Add a directed, named edge. Both regions already exist.
    fn connect(&mut self, from: &str, to: &str, entrance: &str, predicate: Predicate);

    /// Add a location to an existing region with its access predicate.
    fn add_location(&mut self, region: &str, name: &str, kind: LocationKind, predicate: Predicate);

    /// Permanently assign a non-shuffled item to a location.
    fn place_locked_item(&mut self, location: &str, item: &str) -> Result<(), GenerationError>;
}
