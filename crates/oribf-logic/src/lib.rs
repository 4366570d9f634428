//! Access logic for the Ori and the Blind Forest randomizer world.
//!
//! This crate decides *which* placements are logically valid; it never
//! shuffles items itself. It types a declarative rule table, selects the
//! difficulty tiers in force, compiles every requirement into a predicate
//! attached to the host's region graph, composes the win condition, and
//! pins the few items that are not shuffled. The host supplies item counts
//! and reachability through the traits in [`world`].
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`atoms`] | Requirement atoms: item, item count, capability, free |
//! | [`capability`] | Composite capabilities derived from items, modifiers and thresholds |
//! | [`compiler`] | Attaches regions, entrances and locations to a [`world::WorldBuilder`] |
//! | [`error`] | Fatal generation errors |
//! | [`formula`] | Tiered access formulas, reach quotas, compiled predicates |
//! | [`generation`] | The end-to-end pipeline |
//! | [`goals`] | Goal modes and the composed win condition |
//! | [`host`] | Reference in-memory host graph and fixed-point sweep |
//! | [`ids`] | Stable numeric item and location ids |
//! | [`items`] | Item table and classifications |
//! | [`options`] | Player options and their validation |
//! | [`pool`] | Item pool composition and fitting |
//! | [`progressive`] | Progressive map chain synthesis |
//! | [`relics`] | One-relic-per-area placement for the world tour |
//! | [`rules`] | Declarative rule table and its resolution |
//! | [`tiers`] | Difficulty ladder, modifiers and the active tier set |
//! | [`world`] | Seams to the host runtime |

pub mod atoms;
pub mod capability;
pub mod compiler;
pub mod error;
pub mod formula;
pub mod generation;
pub mod goals;
pub mod host;
pub mod ids;
pub mod items;
pub mod options;
pub mod pool;
pub mod progressive;
pub mod relics;
pub mod rules;
pub mod tiers;
pub mod world;
