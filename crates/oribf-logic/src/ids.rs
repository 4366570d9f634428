//! Stable numeric ids for items and locations.
//!
//! Items are numbered in item-table order, pool locations in the order the
//! compiler adds them (rule-table order, then synthesized locations). Both
//! sequences start at [`BASE_ID`]. Events never get an id.

use std::collections::BTreeMap;

use crate::items::ITEM_TABLE;

pub const BASE_ID: u64 = 262_144;

/// Item name → id.
pub fn item_ids() -> BTreeMap<&'static str, u64> {
    ITEM_TABLE
        .iter()
        .enumerate()
        .map(|(i, d)| (d.name, BASE_ID + i as u64))
        .collect()
}

/// Hands out consecutive location ids.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: BASE_ID }
    }
}

impl IdAllocator {
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}
