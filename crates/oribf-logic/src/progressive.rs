//! Progressive map chain.
//!
//! With progressive maps, the M map altars stop being pickups. Each altar
//! becomes an event that grants one map stone, and M ranked locations
//! (`ProgressiveMap1..M`) take their place. Rank k opens once k altars are
//! reachable *and* k map stones are held, so discovery order is free but
//! neither axis alone can skip ahead.

use crate::atoms::Atom;
use crate::formula::{AccessFormula, AccessRule, ReachQuota};
use crate::goals::tags;
use crate::tiers::Tier;
use crate::world::{ForcedPlacement, PlacementReason};

pub const PROGRESSIVE_PREFIX: &str = "ProgressiveMap";

/// A location created by logic rather than read from the rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedLocation {
    pub region: String,
    pub name: String,
    pub tags: Vec<String>,
    pub rule: AccessRule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressiveChain {
    /// Ranked milestones, rank 1 first.
    pub milestones: Vec<SynthesizedLocation>,
    /// One counter grant per underlying event.
    pub counters: Vec<ForcedPlacement>,
}

/// Build the chain for `events`, hosting milestones in `region`.
pub fn synthesize_chain(events: &[String], counter_item: &str, region: &str) -> ProgressiveChain {
    let milestones = (1..=events.len() as u32)
        .map(|rank| SynthesizedLocation {
            region: region.to_string(),
            name: format!("{}{}", PROGRESSIVE_PREFIX, rank),
            tags: vec![tags::PROGRESSIVE_MAP.to_string()],
            rule: AccessRule {
                formula: AccessFormula::new().with(
                    Tier::Casual,
                    vec![Atom::ItemCount(counter_item.to_string(), rank)],
                ),
                quota: Some(ReachQuota {
                    locations: events.to_vec(),
                    min: rank,
                }),
            },
        })
        .collect();

    let counters = events
        .iter()
        .map(|event| ForcedPlacement {
            location: event.clone(),
            item: counter_item.to_string(),
            reason: PlacementReason::ProgressiveCounter,
        })
        .collect();

    ProgressiveChain {
        milestones,
        counters,
    }
}
