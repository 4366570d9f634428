//! Attaches compiled predicates to the host graph.
//!
//! Regions are all declared before any connection is made, so forward
//! references in the table are legal; a connection whose target never
//! appears is an [`GenerationError::UnresolvedRegion`]. Connections whose
//! formulas have no active access-set are still created, with a
//! [`Predicate::Never`] predicate, so the graph keeps the same shape under
//! every policy. Synthesized locations go through the same path as table
//! locations.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;

use crate::capability::LogicContext;
use crate::error::GenerationError;
use crate::formula::{AccessFormula, AccessRule, Predicate};
use crate::ids::IdAllocator;
use crate::options::ConfigError;
use crate::progressive::SynthesizedLocation;
use crate::rules::{entrance_name, ResolvedRules};
use crate::tiers::TierSet;
use crate::world::{LocationKind, WorldBuilder};

/// Tag → location names, in compile order.
pub type TagIndex = BTreeMap<String, Vec<String>>;

/// What the compiler attached.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompileReport {
    pub regions: usize,
    pub connections: usize,
    /// Entrances that exist but can never be used under this policy.
    pub never_connections: Vec<String>,
    pub locations: usize,
    pub never_locations: Vec<String>,
    pub events: usize,
    pub location_ids: BTreeMap<String, u64>,
    pub tags: TagIndex,
    /// Area tag → pool locations in that area.
    pub pool_by_area: BTreeMap<String, Vec<String>>,
}

impl CompileReport {
    pub fn pool_location_count(&self) -> usize {
        self.location_ids.len()
    }
}

/// Compile the resolved table plus synthesized locations onto `builder`.
///
/// Locations named in `events` are added as [`LocationKind::Event`].
pub fn compile_world<B: WorldBuilder>(
    rules: &ResolvedRules,
    synthesized: &[SynthesizedLocation],
    events: &BTreeSet<String>,
    tiers: &TierSet,
    ctx: Arc<LogicContext>,
    builder: &mut B,
) -> Result<CompileReport, GenerationError> {
    check_shape(rules)?;

    let mut compiler = Compiler {
        tiers,
        ctx,
        builder,
        ids: IdAllocator::default(),
        names: BTreeSet::new(),
        areas: rules
            .regions
            .iter()
            .filter_map(|r| r.area.clone().map(|a| (r.name.clone(), a)))
            .collect(),
        report: CompileReport::default(),
    };

    compiler.builder.create_region(&rules.root);
    for region in rules.regions.iter().filter(|r| r.name != rules.root) {
        compiler.builder.create_region(&region.name);
    }
    compiler.report.regions = rules.regions.len();

    let from_root = rules.connections.iter().filter(|c| c.from == rules.root).count();
    if !rules
        .connections
        .iter()
        .any(|c| c.from == rules.root && c.to == rules.start)
    {
        let entrance = entrance_name(&rules.root, &rules.start, from_root + 1);
        let always = Predicate::compile(&AccessFormula::free().into(), tiers, &compiler.ctx);
        compiler
            .builder
            .connect(&rules.root, &rules.start, &entrance, always);
        compiler.report.connections += 1;
    }

    for conn in &rules.connections {
        let predicate = Predicate::compile(&conn.formula.clone().into(), tiers, &compiler.ctx);
        log::debug!("{}: {}", conn.entrance, predicate);
        if predicate.is_never() {
            compiler.report.never_connections.push(conn.entrance.clone());
        }
        compiler
            .builder
            .connect(&conn.from, &conn.to, &conn.entrance, predicate);
        compiler.report.connections += 1;
    }

    for loc in &rules.locations {
        let event = events.contains(&loc.name);
        compiler.compile_location(&loc.region, &loc.name, &loc.tags, &loc.rule, event)?;
    }
    for loc in synthesized {
        let event = events.contains(&loc.name);
        compiler.compile_location(&loc.region, &loc.name, &loc.tags, &loc.rule, event)?;
    }

    let report = compiler.report;
    log::info!(
        "Compiled {} regions, {} connections ({} never), {} locations ({} events, {} never)",
        report.regions,
        report.connections,
        report.never_connections.len(),
        report.locations,
        report.events,
        report.never_locations.len()
    );
    Ok(report)
}

struct Compiler<'a, B: WorldBuilder> {
    tiers: &'a TierSet,
    ctx: Arc<LogicContext>,
    builder: &'a mut B,
    ids: IdAllocator,
    names: BTreeSet<String>,
    areas: BTreeMap<String, String>,
    report: CompileReport,
}

impl<B: WorldBuilder> Compiler<'_, B> {
    fn compile_location(
        &mut self,
        region: &str,
        name: &str,
        tags: &[String],
        rule: &AccessRule,
        event: bool,
    ) -> Result<(), GenerationError> {
        if !self.builder.has_region(region) {
            return Err(GenerationError::UnresolvedRegion {
                region: region.to_string(),
                referenced_by: name.to_string(),
            });
        }
        if !self.names.insert(name.to_string()) {
            return Err(GenerationError::config(ConfigError::WorldShape(format!(
                "location {} declared twice",
                name
            ))));
        }

        let predicate = Predicate::compile(rule, self.tiers, &self.ctx);
        log::debug!("{}: {}", name, predicate);
        if predicate.is_never() {
            self.report.never_locations.push(name.to_string());
        }

        let kind = if event {
            self.report.events += 1;
            LocationKind::Event
        } else {
            let id = self.ids.next_id();
            self.report.location_ids.insert(name.to_string(), id);
            if let Some(area) = self.areas.get(region) {
                self.report
                    .pool_by_area
                    .entry(area.clone())
                    .or_default()
                    .push(name.to_string());
            }
            LocationKind::Pool(id)
        };

        for tag in tags {
            self.report
                .tags
                .entry(tag.clone())
                .or_default()
                .push(name.to_string());
        }

        self.builder.add_location(region, name, kind, predicate);
        self.report.locations += 1;
        Ok(())
    }
}

fn check_shape(rules: &ResolvedRules) -> Result<(), GenerationError> {
    let mut declared = BTreeSet::new();
    for region in &rules.regions {
        if !declared.insert(region.name.as_str()) {
            return Err(GenerationError::config(ConfigError::WorldShape(format!(
                "region {} declared twice",
                region.name
            ))));
        }
    }

    for (name, referenced_by) in [(&rules.root, "root"), (&rules.start, "start")] {
        if !declared.contains(name.as_str()) {
            return Err(GenerationError::UnresolvedRegion {
                region: name.clone(),
                referenced_by: referenced_by.to_string(),
            });
        }
    }

    for conn in &rules.connections {
        if !declared.contains(conn.to.as_str()) {
            return Err(GenerationError::UnresolvedRegion {
                region: conn.to.clone(),
                referenced_by: conn.entrance.clone(),
            });
        }
        if conn.to == rules.root {
            return Err(GenerationError::config(ConfigError::WorldShape(format!(
                "root {} has incoming connection {}",
                rules.root, conn.entrance
            ))));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Inventory, WorldGraph};
    use crate::rules::{resolve_rules, RuleTable};
    use crate::tiers::{active_tiers, Difficulty, ModifierSet};
    use crate::world::ReachState;

    const TABLE: &str = r#"{
        "root": "Menu",
        "start": "Runaway",
        "regions": [
            { "name": "Menu" },
            { "name": "Runaway", "area": "Glades",
              "connections": [
                  { "to": "Cave", "rules": { "casual": [["WallJump"]] } },
                  { "to": "Ledge", "rules": { "expert": [["Free"]] } }
              ],
              "locations": [
                  { "name": "RunawayCell", "tags": ["pickup"], "rules": { "casual": [["Free"]] } },
                  { "name": "RunawayAltar", "tags": ["map_altar"], "rules": { "casual": [["Free"]] } }
              ] },
            { "name": "Cave", "area": "Grotto",
              "locations": [
                  { "name": "CaveTree", "tags": ["skill_tree"], "rules": { "casual": [[["KeyStone", 2]]] } }
              ] },
            { "name": "Ledge" }
        ]
    }"#;

    fn compile(table: &str, difficulty: Difficulty) -> Result<(WorldGraph, CompileReport), GenerationError> {
        let rules = resolve_rules(&RuleTable::from_json(table)?, true)?;
        let tiers = active_tiers(difficulty, &ModifierSet::new());
        let mut graph = WorldGraph::new();
        let report = compile_world(
            &rules,
            &[],
            &BTreeSet::new(),
            &tiers,
            Arc::new(LogicContext::default()),
            &mut graph,
        )?;
        Ok((graph, report))
    }

    #[test]
    fn root_connects_to_start() {
        let (graph, report) = compile(TABLE, Difficulty::Casual).unwrap();
        assert_eq!(graph.root(), Some("Menu"));
        assert_eq!(graph.exits("Menu"), vec![("Menu_to_Runaway_1", "Runaway")]);
        assert_eq!(report.connections, 3);
    }

    #[test]
    fn inactive_connection_kept_as_never() {
        let (graph, report) = compile(TABLE, Difficulty::Casual).unwrap();
        assert_eq!(report.never_connections, vec!["Runaway_to_Ledge_2"]);
        let pred = graph.entrance_predicate("Runaway_to_Ledge_2").unwrap();
        assert!(pred.is_never());
        let mut inv = Inventory::new();
        inv.add("WallJump", 1);
        let state = graph.sweep(inv);
        assert!(!state.can_reach_region("Ledge"));
        assert!(state.can_reach_region("Cave"));
    }

    #[test]
    fn expert_opens_ledge() {
        let (graph, report) = compile(TABLE, Difficulty::Expert).unwrap();
        assert!(report.never_connections.is_empty());
        assert!(graph.sweep(Inventory::new()).can_reach_region("Ledge"));
    }

    #[test]
    fn ids_tags_and_areas() {
        let (_, report) = compile(TABLE, Difficulty::Casual).unwrap();
        assert_eq!(report.location_ids["RunawayCell"], crate::ids::BASE_ID);
        assert_eq!(report.location_ids["CaveTree"], crate::ids::BASE_ID + 2);
        assert_eq!(report.tags["skill_tree"], vec!["CaveTree"]);
        assert_eq!(report.pool_by_area["Glades"], vec!["RunawayCell", "RunawayAltar"]);
        assert_eq!(report.pool_by_area["Grotto"], vec!["CaveTree"]);
    }

    #[test]
    fn events_get_no_id() {
        let rules = resolve_rules(&RuleTable::from_json(TABLE).unwrap(), true).unwrap();
        let tiers = active_tiers(Difficulty::Casual, &ModifierSet::new());
        let mut graph = WorldGraph::new();
        let events: BTreeSet<String> = ["RunawayAltar".to_string()].into_iter().collect();
        let report = compile_world(
            &rules,
            &[],
            &events,
            &tiers,
            Arc::new(LogicContext::default()),
            &mut graph,
        )
        .unwrap();
        assert_eq!(report.events, 1);
        assert!(!report.location_ids.contains_key("RunawayAltar"));
        assert_eq!(graph.location_kind("RunawayAltar"), Some(LocationKind::Event));
    }

    #[test]
    fn unresolved_target_errors() {
        let table = TABLE.replace("\"to\": \"Cave\"", "\"to\": \"Cavern\"");
        let err = compile(&table, Difficulty::Casual).unwrap_err();
        assert_eq!(
            err,
            GenerationError::UnresolvedRegion {
                region: "Cavern".into(),
                referenced_by: "Runaway_to_Cavern_1".into(),
            }
        );
    }

    #[test]
    fn forward_references_are_fine() {
        // Cave is declared after Runaway references it.
        assert!(compile(TABLE, Difficulty::Casual).is_ok());
    }

    #[test]
    fn duplicate_location_rejected() {
        let table = TABLE.replace("\"RunawayAltar\"", "\"RunawayCell\"");
        assert!(matches!(
            compile(&table, Difficulty::Casual),
            Err(GenerationError::Configuration(_))
        ));
    }

    #[test]
    fn incoming_root_edge_rejected() {
        let table = TABLE.replace("\"to\": \"Ledge\"", "\"to\": \"Menu\"");
        assert!(matches!(
            compile(&table, Difficulty::Casual),
            Err(GenerationError::Configuration(_))
        ));
    }
}
