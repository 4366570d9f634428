//! World-tour relic siting.
//!
//! Relics are pinned, not shuffled: each goes to a random location in a
//! distinct area. Areas are drawn uniformly without replacement; within an
//! area, locations are drawn uniformly and redrawn while the pick is
//! reserved (already holding a forced item) or already chosen.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::Serialize;

use crate::error::GenerationError;
use crate::world::{ForcedPlacement, PlacementReason};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelicPlacement {
    pub area: String,
    pub location: String,
}

/// Which areas received a relic (in placement order) and which did not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AreaPlacementRecord {
    pub placements: Vec<RelicPlacement>,
    pub unused: Vec<String>,
}

impl AreaPlacementRecord {
    pub fn used_areas(&self) -> Vec<&str> {
        self.placements.iter().map(|p| p.area.as_str()).collect()
    }

    pub fn forced(&self, item: &str) -> Vec<ForcedPlacement> {
        self.placements
            .iter()
            .map(|p| ForcedPlacement {
                location: p.location.clone(),
                item: item.to_string(),
                reason: PlacementReason::Relic,
            })
            .collect()
    }
}

/// Place `count` relics, one per area.
///
/// Areas with no unreserved location cannot host a relic and are set aside
/// before drawing. Fails with [`GenerationError::InsufficientAreas`] when
/// fewer usable areas remain than relics requested.
pub fn place_relics<R: Rng + ?Sized>(
    count: u32,
    areas: &[String],
    locations_by_area: &BTreeMap<String, Vec<String>>,
    reserved: &BTreeSet<String>,
    rng: &mut R,
) -> Result<AreaPlacementRecord, GenerationError> {
    let mut remaining: Vec<String> = Vec::new();
    for area in areas {
        if remaining.contains(area) {
            continue;
        }
        let usable = locations_by_area
            .get(area)
            .is_some_and(|locs| locs.iter().any(|l| !reserved.contains(l)));
        if usable {
            remaining.push(area.clone());
        } else {
            log::debug!("Area {} has no free location for a relic", area);
        }
    }

    if count as usize > remaining.len() {
        return Err(GenerationError::InsufficientAreas {
            requested: count,
            available: remaining.len() as u32,
        });
    }

    let mut chosen = BTreeSet::new();
    let mut placements = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let area = remaining.remove(rng.gen_range(0..remaining.len()));
        let locations = &locations_by_area[&area];
        let eligible = |l: &String| !reserved.contains(l) && !chosen.contains(l);
        if !locations.iter().any(eligible) {
            // Only possible when areas share locations.
            return Err(GenerationError::InsufficientAreas {
                requested: count,
                available: placements.len() as u32,
            });
        }
        let location = loop {
            let pick = &locations[rng.gen_range(0..locations.len())];
            if eligible(pick) {
                break pick.clone();
            }
        };
        log::debug!("Relic {} placed at {} ({})", placements.len() + 1, location, area);
        chosen.insert(location.clone());
        placements.push(RelicPlacement { area, location });
    }

    Ok(AreaPlacementRecord {
        placements,
        unused: remaining,
    })
}
