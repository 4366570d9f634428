//! Item pool construction.
//!
//! The pool is the multiset of items the host shuffler distributes over the
//! open pool locations. It starts from the item table, gains goal items,
//! loses anything already pinned by a forced placement, and is then fitted
//! to exactly the number of open slots by trimming or padding filler.

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;
use serde::Serialize;

use crate::error::GenerationError;
use crate::goals::GoalMode;
use crate::items::{filler_items, names, ItemClassification, ITEM_TABLE};
use crate::options::{ConfigError, LogicOptions};
use crate::world::ForcedPlacement;

/// One pool entry: an item and how many copies the shuffler places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolItem {
    pub name: String,
    pub classification: ItemClassification,
    pub count: u32,
}

/// Total copies across all entries.
pub fn pool_size(pool: &[PoolItem]) -> u32 {
    pool.iter().map(|p| p.count).sum()
}

fn entry_mut<'a>(pool: &'a mut [PoolItem], name: &str) -> Option<&'a mut PoolItem> {
    pool.iter_mut().find(|p| p.name == name)
}

/// Build the pool for `open_slots` shuffled locations.
///
/// Filler is removed cheapest first when the pool is too large, and drawn
/// from `rng` weighted by the base filler counts when it is too small. Fails
/// when the non-filler items alone exceed the slot count.
pub fn build_item_pool<R: Rng + ?Sized>(
    options: &LogicOptions,
    forced: &[ForcedPlacement],
    open_slots: u32,
    rng: &mut R,
) -> Result<Vec<PoolItem>, GenerationError> {
    let mut pool: Vec<PoolItem> = ITEM_TABLE
        .iter()
        .map(|d| PoolItem {
            name: d.name.to_string(),
            classification: d.classification,
            count: d.count,
        })
        .collect();

    if options.has_goal(GoalMode::WarmthFragments) {
        if let Some(entry) = entry_mut(&mut pool, names::WARMTH_FRAGMENT) {
            entry.count += options.fragments_available;
        }
    }

    for placement in forced {
        if let Some(entry) = entry_mut(&mut pool, &placement.item) {
            if entry.count > 0 {
                entry.count -= 1;
            }
        }
    }

    let required: u32 = pool
        .iter()
        .filter(|p| p.classification != ItemClassification::Filler)
        .map(|p| p.count)
        .sum();
    if required > open_slots {
        return Err(GenerationError::config(ConfigError::PoolOverflow {
            required,
            slots: open_slots,
        }));
    }

    let total = pool_size(&pool);
    if total > open_slots {
        let mut excess = total - open_slots;
        for filler in filler_items() {
            if excess == 0 {
                break;
            }
            if let Some(entry) = entry_mut(&mut pool, filler.name) {
                let cut = entry.count.min(excess);
                entry.count -= cut;
                excess -= cut;
            }
        }
        log::debug!("Trimmed {} filler items", total - open_slots);
    } else if total < open_slots {
        let fillers: Vec<_> = filler_items().collect();
        let weights = WeightedIndex::new(fillers.iter().map(|d| d.count))
            .map_err(|e| GenerationError::rule_table(format!("filler weights: {}", e)))?;
        for _ in total..open_slots {
            let pick = fillers[weights.sample(rng)].name;
            if let Some(entry) = entry_mut(&mut pool, pick) {
                entry.count += 1;
            }
        }
        log::debug!("Padded pool with {} filler items", open_slots - total);
    }

    pool.retain(|p| p.count > 0);
    log::info!(
        "Item pool: {} items ({} progression or useful) for {} slots",
        pool_size(&pool),
        required,
        open_slots
    );
    Ok(pool)
}
