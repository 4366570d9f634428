//! End-to-end world generation.
//!
//! Runs every stage in a fixed order against one host builder:
//!
//! 1. validate options (all errors reported together)
//! 2. derive the active tier set and the logic context
//! 3. resolve the rule table and check the final region exists
//! 4. synthesize the progressive map chain (progressive maps only)
//! 5. compile regions, connections and locations onto the host
//! 6. pin the first energy cell and the map-stone counters
//! 7. compose the win condition
//! 8. place relics (world tour only), skipping locations the active tiers
//!    make unreachable
//! 9. build the item pool for the remaining open slots
//!
//! A single `StdRng` seeded from the options drives the random stages, relics
//! before filler, so the same options always produce the same world.

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::compiler::{compile_world, CompileReport};
use crate::error::GenerationError;
use crate::goals::{compose_win_condition, tags, GoalMode, WinCondition, FINAL_REGION};
use crate::items::names;
use crate::options::{validate_options, ConfigError, LogicOptions, MapMode};
use crate::pool::{build_item_pool, PoolItem};
use crate::progressive::{synthesize_chain, SynthesizedLocation};
use crate::relics::{place_relics, AreaPlacementRecord};
use crate::rules::{resolve_rules, Diagnostic, RuleTable};
use crate::tiers::{active_tiers, TierSet};
use crate::world::{ForcedPlacement, PlacementReason, WorldBuilder};

/// Location that always holds the first energy cell.
pub const FIRST_ENERGY_LOCATION: &str = "GladesFirstEnergyCell";

/// Everything the host needs after generation.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedWorld {
    pub tiers: TierSet,
    pub win: WinCondition,
    /// Locked grants in the order they were placed.
    pub forced: Vec<ForcedPlacement>,
    pub relic_areas: Option<AreaPlacementRecord>,
    pub pool: Vec<PoolItem>,
    pub report: CompileReport,
    pub diagnostics: Vec<Diagnostic>,
}

impl GeneratedWorld {
    /// Pool locations not holding a forced item.
    pub fn open_slot_count(&self) -> u32 {
        open_slots(&self.report, &self.forced)
    }
}

fn open_slots(report: &CompileReport, forced: &[ForcedPlacement]) -> u32 {
    let pinned = forced
        .iter()
        .filter(|f| report.location_ids.contains_key(&f.location))
        .count();
    (report.pool_location_count() - pinned) as u32
}

/// Generate a world from `table` onto `builder`.
pub fn generate<B: WorldBuilder>(
    options: &LogicOptions,
    table: &RuleTable,
    builder: &mut B,
) -> Result<GeneratedWorld, GenerationError> {
    let errors = validate_options(options);
    if !errors.is_empty() {
        for e in &errors {
            log::warn!("Option error: {}", e);
        }
        return Err(GenerationError::Configuration(errors));
    }

    let modifiers = options.modifier_set();
    let tiers = active_tiers(options.difficulty, &modifiers);
    let ctx = Arc::new(options.logic_context());
    log::info!(
        "Generating seed {} at {} ({} tiers active, modifiers {:?})",
        options.seed,
        options.difficulty.tier(),
        tiers.len(),
        modifiers
    );

    let rules = resolve_rules(table, options.strict_rules)?;
    if options.require_final_gate && !rules.regions.iter().any(|r| r.name == FINAL_REGION) {
        return Err(GenerationError::config(ConfigError::WorldShape(format!(
            "final region {} is not in the world",
            FINAL_REGION
        ))));
    }
    let mut rng = StdRng::seed_from_u64(options.seed);

    let mut events = BTreeSet::new();
    let mut synthesized: Vec<SynthesizedLocation> = Vec::new();
    let mut forced = Vec::new();
    if options.map_mode == MapMode::Progressive {
        let altars: Vec<String> = rules
            .locations
            .iter()
            .filter(|l| l.has_tag(tags::MAP_ALTAR))
            .map(|l| l.name.clone())
            .collect();
        let chain = synthesize_chain(&altars, names::MAP_STONE, &rules.root);
        log::info!("Progressive maps: {} altars become events", altars.len());
        events.extend(altars);
        synthesized = chain.milestones;
        forced.extend(chain.counters);
    }

    let report = compile_world(&rules, &synthesized, &events, &tiers, ctx, builder)?;

    let first_energy = ForcedPlacement {
        location: FIRST_ENERGY_LOCATION.to_string(),
        item: names::ENERGY_CELL.to_string(),
        reason: PlacementReason::FirstEnergy,
    };
    forced.insert(0, first_energy);
    for placement in &forced {
        builder.place_locked_item(&placement.location, &placement.item)?;
    }

    let win = compose_win_condition(
        &options.goal_config(),
        &report.tags,
        &report.never_locations,
        options.map_mode,
        FINAL_REGION,
    )?;

    let relic_areas = if options.has_goal(GoalMode::WorldTour) {
        let mut areas: Vec<String> = Vec::new();
        for region in &rules.regions {
            if let Some(area) = &region.area {
                if !areas.contains(area) {
                    areas.push(area.clone());
                }
            }
        }
        let reserved: BTreeSet<String> = forced
            .iter()
            .map(|f| f.location.clone())
            .chain(report.never_locations.iter().cloned())
            .collect();
        let record = place_relics(
            options.relic_count,
            &areas,
            &report.pool_by_area,
            &reserved,
            &mut rng,
        )?;
        let relics = record.forced(names::RELIC);
        for placement in &relics {
            builder.place_locked_item(&placement.location, &placement.item)?;
        }
        log::info!(
            "Placed {} relics, {} areas left empty",
            relics.len(),
            record.unused.len()
        );
        forced.extend(relics);
        Some(record)
    } else {
        None
    };

    let slots = open_slots(&report, &forced);
    let pool = build_item_pool(options, &forced, slots, &mut rng)?;

    Ok(GeneratedWorld {
        tiers,
        win,
        forced,
        relic_areas,
        pool,
        report,
        diagnostics: rules.diagnostics,
    })
}
