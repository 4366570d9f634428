//! Ori and the Blind Forest Logic Harness
//!
//! Validates the bundled rule table and the generation pipeline end to end
//! against the in-memory reference host. No game, no shuffler, no network.
//!
//! Usage:
//!   cargo run -p oribf-simtest
//!   cargo run -p oribf-simtest -- --verbose
//!   cargo run -p oribf-simtest -- --json

use std::collections::BTreeSet;

use oribf_logic::generation::{generate, GeneratedWorld};
use oribf_logic::goals::{tags, GoalMode, FINAL_REGION};
use oribf_logic::host::{Inventory, WorldGraph};
use oribf_logic::items::{names, ITEM_TABLE};
use oribf_logic::options::{validate_options, LogicOptions, MapMode};
use oribf_logic::pool::pool_size;
use oribf_logic::rules::{resolve_rules, RuleTable};
use oribf_logic::tiers::{active_tiers, Difficulty, Modifier, ModifierSet, Tier};
use serde::Serialize;

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: impl Into<String>, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    let json = std::env::args().any(|a| a == "--json");
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "warn" }),
    )
    .init();
    println!("=== Ori Logic Harness ===\n");

    let table = match RuleTable::builtin() {
        Ok(t) => t,
        Err(e) => {
            println!("bundled rule table failed to load: {}", e);
            std::process::exit(1);
        }
    };

    let mut results = Vec::new();

    // 1. Rule table shape
    results.extend(validate_rule_table(&table));

    // 2. Tier policy sweep
    results.extend(validate_tier_policy());

    // 3. Option validation
    results.extend(validate_option_checks());

    // 4. Generation across difficulties and goals
    results.extend(validate_generation(&table));

    // 5. Relic placement across seeds
    results.extend(validate_relics(&table));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    if json {
        match serde_json::to_string_pretty(&results) {
            Ok(out) => println!("{}", out),
            Err(e) => println!("could not serialize results: {}", e),
        }
    } else {
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

/// Every item at its base count, goal items excluded.
fn all_items() -> Inventory {
    let mut inv = Inventory::new();
    for def in ITEM_TABLE {
        if [names::RELIC, names::MAP_STONE, names::WARMTH_FRAGMENT].contains(&def.name) {
            continue;
        }
        inv.add(def.name, def.count.max(1));
    }
    inv
}

// ── 1. Rule Table ───────────────────────────────────────────────────────

fn validate_rule_table(table: &RuleTable) -> Vec<TestResult> {
    println!("--- Rule Table ---");
    let mut results = Vec::new();

    let resolved = match resolve_rules(table, true) {
        Ok(r) => r,
        Err(e) => {
            results.push(check("rules_resolve_strict", false, e.to_string()));
            return results;
        }
    };
    results.push(check(
        "rules_resolve_strict",
        true,
        format!(
            "{} regions, {} connections, {} locations",
            resolved.regions.len(),
            resolved.connections.len(),
            resolved.locations.len()
        ),
    ));

    let count_tag = |tag: &str| resolved.locations.iter().filter(|l| l.has_tag(tag)).count();
    let trees = count_tag(tags::SKILL_TREE);
    results.push(check(
        "rules_skill_trees",
        trees == 10,
        format!("{} skill trees", trees),
    ));
    let altars = count_tag(tags::MAP_ALTAR);
    results.push(check(
        "rules_map_altars",
        altars == 9,
        format!("{} map altars", altars),
    ));

    let areas: BTreeSet<_> = resolved.regions.iter().filter_map(|r| r.area.as_deref()).collect();
    results.push(check(
        "rules_areas",
        areas.len() >= 8,
        format!("{} areas: {:?}", areas.len(), areas),
    ));

    let no_casual: Vec<_> = resolved
        .locations
        .iter()
        .filter(|l| !l.rule.formula.tiers().any(|(tier, _)| tier == Tier::Casual))
        .map(|l| l.name.as_str())
        .collect();
    results.push(check(
        "rules_casual_route_everywhere",
        no_casual.is_empty(),
        if no_casual.is_empty() {
            "every location has a casual access set".to_string()
        } else {
            format!("{} without casual rule: {}", no_casual.len(), no_casual.join(", "))
        },
    ));

    let has_final = resolved.regions.iter().any(|r| r.name == FINAL_REGION);
    results.push(check(
        "rules_final_region",
        has_final,
        format!("{} declared: {}", FINAL_REGION, has_final),
    ));

    results
}

// ── 2. Tier Policy ──────────────────────────────────────────────────────

fn validate_tier_policy() -> Vec<TestResult> {
    println!("--- Tier Policy ---");
    let mut results = Vec::new();

    let mut previous = 0;
    let mut ladder_ok = true;
    for difficulty in Difficulty::ALL {
        let tiers = active_tiers(difficulty, &ModifierSet::new());
        if tiers.len() <= previous || !tiers.contains(Tier::Casual) {
            ladder_ok = false;
        }
        previous = tiers.len();
    }
    results.push(check(
        "tiers_cumulative_ladder",
        ladder_ok,
        "each level adds exactly its own tier on top of the lower ones",
    ));

    let glitches: ModifierSet = [Modifier::Glitches].into_iter().collect();
    let glitched_casual = active_tiers(Difficulty::Casual, &glitches);
    let plain_master = active_tiers(Difficulty::Master, &ModifierSet::new());
    results.push(check(
        "tiers_glitched_independent",
        glitched_casual.contains(Tier::Glitched) && !plain_master.contains(Tier::Glitched),
        "glitched follows the modifier, not the level",
    ));

    results
}

// ── 3. Options ──────────────────────────────────────────────────────────

fn validate_option_checks() -> Vec<TestResult> {
    println!("--- Options ---");
    let mut results = Vec::new();

    let defaults = validate_options(&LogicOptions::default());
    results.push(check(
        "options_defaults_valid",
        defaults.is_empty(),
        format!("{} errors", defaults.len()),
    ));

    let broken = LogicOptions {
        goals: vec![GoalMode::None, GoalMode::None],
        require_final_gate: false,
        ..LogicOptions::default()
    };
    let errors = validate_options(&broken);
    results.push(check(
        "options_all_errors_reported",
        errors.len() >= 2,
        errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; "),
    ));

    results
}

// ── 4. Generation ───────────────────────────────────────────────────────

fn scenarios() -> Vec<(String, LogicOptions)> {
    let mut out = Vec::new();
    for difficulty in Difficulty::ALL {
        out.push((
            format!("{}_skill_trees", difficulty.tier()),
            LogicOptions {
                difficulty,
                ..LogicOptions::default()
            },
        ));
    }
    out.push((
        "progressive_maps".to_string(),
        LogicOptions {
            goals: vec![GoalMode::Maps],
            map_mode: MapMode::Progressive,
            ..LogicOptions::default()
        },
    ));
    out.push((
        "warmth_fragments".to_string(),
        LogicOptions {
            goals: vec![GoalMode::WarmthFragments],
            ..LogicOptions::default()
        },
    ));
    out.push((
        "world_tour_no_gate".to_string(),
        LogicOptions {
            goals: vec![GoalMode::WorldTour, GoalMode::SkillTrees],
            require_final_gate: false,
            seed: 7,
            ..LogicOptions::default()
        },
    ));
    out
}

fn validate_generation(table: &RuleTable) -> Vec<TestResult> {
    println!("--- Generation ---");
    let mut results = Vec::new();

    for (label, options) in scenarios() {
        log::info!("Scenario {}", label);
        let mut graph = WorldGraph::new();
        let world = match generate(&options, table, &mut graph) {
            Ok(w) => w,
            Err(e) => {
                results.push(check(format!("gen_{}", label), false, e.to_string()));
                continue;
            }
        };
        results.push(check(
            format!("gen_{}_pool_fits", label),
            pool_size(&world.pool) == world.open_slot_count(),
            format!(
                "{} pool items for {} open slots",
                pool_size(&world.pool),
                world.open_slot_count()
            ),
        ));

        let mut start = all_items();
        if options.has_goal(GoalMode::WarmthFragments) {
            start.add(names::WARMTH_FRAGMENT, options.fragments_available);
        }
        results.push(beatable(&label, &graph, &world, start));
    }

    results
}

fn beatable(label: &str, graph: &WorldGraph, world: &GeneratedWorld, start: Inventory) -> TestResult {
    let state = graph.sweep(start);
    let missing = graph.location_count() - state.locations().len();
    check(
        format!("gen_{}_beatable", label),
        missing == 0 && world.win.is_met(&state),
        format!(
            "{} of {} locations reached, pending goals {:?}",
            state.locations().len(),
            graph.location_count(),
            world.win.pending(&state)
        ),
    )
}

// ── 5. Relics ───────────────────────────────────────────────────────────

fn validate_relics(table: &RuleTable) -> Vec<TestResult> {
    println!("--- Relics ---");
    let mut results = Vec::new();

    let mut distinct_ok = true;
    let mut layouts = BTreeSet::new();
    for seed in 0..16 {
        let options = LogicOptions {
            goals: vec![GoalMode::WorldTour],
            seed,
            ..LogicOptions::default()
        };
        let mut graph = WorldGraph::new();
        match generate(&options, table, &mut graph) {
            Ok(world) => {
                if let Some(record) = world.relic_areas {
                    let areas: BTreeSet<_> = record.used_areas().into_iter().collect();
                    distinct_ok &= areas.len() == options.relic_count as usize;
                    layouts.insert(
                        record
                            .placements
                            .iter()
                            .map(|p| p.location.clone())
                            .collect::<Vec<_>>(),
                    );
                } else {
                    distinct_ok = false;
                }
            }
            Err(e) => {
                results.push(check(format!("relics_seed_{}", seed), false, e.to_string()));
                distinct_ok = false;
            }
        }
    }
    results.push(check(
        "relics_one_per_area",
        distinct_ok,
        "16 seeds, every relic in its own area",
    ));
    results.push(check(
        "relics_vary_by_seed",
        layouts.len() > 1,
        format!("{} distinct layouts", layouts.len()),
    ));

    let options = LogicOptions {
        goals: vec![GoalMode::WorldTour],
        relic_count: 64,
        ..LogicOptions::default()
    };
    let rejected = generate(&options, table, &mut WorldGraph::new()).is_err();
    results.push(check(
        "relics_insufficient_areas",
        rejected,
        "more relics than areas is rejected",
    ));

    results
}
