//! Goal composition: turns the selected goal modes into one win condition.
//!
//! Each mode compiles to an independent check over host state. The win
//! condition is the conjunction of all checks, plus reaching the final
//! escape when the final gate is required.
//!
//! # Completion without the final gate
//!
//! When the gate is disabled the seed has no in-world finish line. The
//! condition then carries [`Completion::PlayerTriggered`]: the host must
//! offer an explicit "release" command and accept it only while
//! [`WinCondition::objectives_met`] holds. Logic never fires it on its own.

use std::cmp::min;

use serde::{Deserialize, Serialize};

use crate::compiler::TagIndex;
use crate::error::GenerationError;
use crate::items::names;
use crate::options::{ConfigError, MapMode};
use crate::world::ReachState;

/// Region whose reachability is the final gate.
pub const FINAL_REGION: &str = "HoruEscape";

/// Location tags the goals read.
pub mod tags {
    pub const SKILL_TREE: &str = "skill_tree";
    pub const MAP_ALTAR: &str = "map_altar";
    pub const PROGRESSIVE_MAP: &str = "progressive_map";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalMode {
    /// Reach every skill tree.
    SkillTrees,
    /// Reach every map altar (or every progressive map rank).
    Maps,
    /// Collect enough warmth fragments.
    WarmthFragments,
    /// Collect the relics pinned across the world's areas.
    WorldTour,
    /// No objective beyond the completion itself.
    None,
}

/// Goal selection and thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalConfig {
    pub modes: Vec<GoalMode>,
    pub require_final_gate: bool,
    pub fragments_available: u32,
    pub fragments_required: u32,
    pub relic_count: u32,
}

impl GoalConfig {
    /// Fragments actually needed. Clamped so an over-large requirement
    /// never produces an unwinnable seed.
    pub fn effective_fragments(&self) -> u32 {
        min(self.fragments_available, self.fragments_required)
    }
}

/// A single compiled objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GoalCheck {
    ReachAll { tag: String, locations: Vec<String> },
    Own { item: String, count: u32 },
    Always,
}

impl GoalCheck {
    pub fn is_met(&self, state: &impl ReachState) -> bool {
        match self {
            GoalCheck::ReachAll { locations, .. } => {
                locations.iter().all(|l| state.can_reach_location(l))
            }
            GoalCheck::Own { item, count } => state.has(item, *count),
            GoalCheck::Always => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Completion {
    /// Objectives plus reaching this region.
    FinalGate(String),
    /// Objectives, then an explicit player command handled by the host.
    PlayerTriggered,
}

/// The composed win condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WinCondition {
    pub objectives: Vec<(GoalMode, GoalCheck)>,
    pub completion: Completion,
}

impl WinCondition {
    /// Every selected goal mode is individually satisfied.
    pub fn objectives_met(&self, state: &impl ReachState) -> bool {
        self.objectives.iter().all(|(_, check)| check.is_met(state))
    }

    /// Logical completion. For [`Completion::PlayerTriggered`] this is the
    /// point from which the host may accept the completion command.
    pub fn is_met(&self, state: &impl ReachState) -> bool {
        if !self.objectives_met(state) {
            return false;
        }
        match &self.completion {
            Completion::FinalGate(region) => state.can_reach_region(region),
            Completion::PlayerTriggered => true,
        }
    }

    /// Modes not yet satisfied, in configured order.
    pub fn pending(&self, state: &impl ReachState) -> Vec<GoalMode> {
        self.objectives
            .iter()
            .filter(|(_, check)| !check.is_met(state))
            .map(|(mode, _)| *mode)
            .collect()
    }
}

/// Compose the win condition from the selected modes.
///
/// `unreachable` lists locations whose access compiled to never under the
/// active tiers. A goal that needs one of them is rejected.
pub fn compose_win_condition(
    config: &GoalConfig,
    tag_index: &TagIndex,
    unreachable: &[String],
    map_mode: MapMode,
    final_region: &str,
) -> Result<WinCondition, GenerationError> {
    if config.modes.is_empty() {
        return Err(GenerationError::config(ConfigError::NoGoalModes));
    }

    let never_reachable = |tag: &str| -> Result<(), GenerationError> {
        let blocked: Vec<&str> = tag_index
            .get(tag)
            .into_iter()
            .flatten()
            .filter(|l| unreachable.contains(*l))
            .map(String::as_str)
            .collect();
        if blocked.is_empty() {
            return Ok(());
        }
        Err(GenerationError::config(ConfigError::WorldShape(format!(
            "{} locations never reachable at this difficulty: {}",
            tag,
            blocked.join(", ")
        ))))
    };

    let reach_all = |tag: &str| -> Result<GoalCheck, GenerationError> {
        let locations = tag_index.get(tag).cloned().unwrap_or_default();
        if locations.is_empty() {
            return Err(GenerationError::config(ConfigError::WorldShape(format!(
                "no locations tagged {}",
                tag
            ))));
        }
        never_reachable(tag)?;
        Ok(GoalCheck::ReachAll {
            tag: tag.to_string(),
            locations,
        })
    };

    let mut objectives = Vec::with_capacity(config.modes.len());
    for mode in &config.modes {
        let check = match mode {
            GoalMode::SkillTrees => reach_all(tags::SKILL_TREE)?,
            GoalMode::Maps => match map_mode {
                MapMode::Plain => reach_all(tags::MAP_ALTAR)?,
                MapMode::Progressive => {
                    // Every rank counts altar events, so each altar must be usable.
                    never_reachable(tags::MAP_ALTAR)?;
                    reach_all(tags::PROGRESSIVE_MAP)?
                }
            },
            GoalMode::WarmthFragments => GoalCheck::Own {
                item: names::WARMTH_FRAGMENT.to_string(),
                count: config.effective_fragments(),
            },
            GoalMode::WorldTour => GoalCheck::Own {
                item: names::RELIC.to_string(),
                count: config.relic_count,
            },
            GoalMode::None => GoalCheck::Always,
        };
        objectives.push((*mode, check));
    }

    let completion = if config.require_final_gate {
        Completion::FinalGate(final_region.to_string())
    } else {
        Completion::PlayerTriggered
    };

    log::info!(
        "Win condition: {:?}, completion {:?}",
        config.modes,
        completion
    );

    Ok(WinCondition {
        objectives,
        completion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Inventory, Reachability};

    fn config(modes: Vec<GoalMode>) -> GoalConfig {
        GoalConfig {
            modes,
            require_final_gate: true,
            fragments_available: 10,
            fragments_required: 30,
            relic_count: 3,
        }
    }

    fn tag_index() -> TagIndex {
        let mut index = TagIndex::new();
        index.insert(tags::SKILL_TREE.into(), vec!["TreeA".into(), "TreeB".into()]);
        index.insert(tags::MAP_ALTAR.into(), vec!["GladesMap".into()]);
        index.insert(tags::PROGRESSIVE_MAP.into(), vec!["ProgressiveMap1".into()]);
        index
    }

    fn state(items: &[(&str, u32)], regions: &[&str], locations: &[&str]) -> Reachability {
        let mut inv = Inventory::new();
        for (item, n) in items {
            inv.add(item, *n);
        }
        let mut state = Reachability::from_inventory(inv);
        for r in regions {
            state.mark_region(r);
        }
        for l in locations {
            state.mark_location(l);
        }
        state
    }

    #[test]
    fn fragment_requirement_is_clamped() {
        let win = compose_win_condition(
            &config(vec![GoalMode::WarmthFragments]),
            &tag_index(),
            &[],
            MapMode::Plain,
            FINAL_REGION,
        )
        .unwrap();
        assert!(!win.is_met(&state(&[("WarmthFragment", 9)], &[FINAL_REGION], &[])));
        assert!(win.is_met(&state(&[("WarmthFragment", 10)], &[FINAL_REGION], &[])));
    }

    #[test]
    fn final_gate_required() {
        let win = compose_win_condition(
            &config(vec![GoalMode::None]),
            &tag_index(),
            &[],
            MapMode::Plain,
            FINAL_REGION,
        )
        .unwrap();
        assert!(!win.is_met(&state(&[], &[], &[])));
        assert!(win.is_met(&state(&[], &[FINAL_REGION], &[])));
    }

    #[test]
    fn player_triggered_without_gate() {
        let mut cfg = config(vec![GoalMode::WorldTour]);
        cfg.require_final_gate = false;
        let win =
            compose_win_condition(&cfg, &tag_index(), &[], MapMode::Plain, FINAL_REGION).unwrap();
        assert_eq!(win.completion, Completion::PlayerTriggered);
        assert!(!win.objectives_met(&state(&[("Relic", 2)], &[], &[])));
        assert!(win.is_met(&state(&[("Relic", 3)], &[], &[])));
    }

    #[test]
    fn skill_trees_need_every_tree() {
        let win = compose_win_condition(
            &config(vec![GoalMode::SkillTrees]),
            &tag_index(),
            &[],
            MapMode::Plain,
            FINAL_REGION,
        )
        .unwrap();
        assert!(!win.is_met(&state(&[], &[FINAL_REGION], &["TreeA"])));
        assert!(win.is_met(&state(&[], &[FINAL_REGION], &["TreeA", "TreeB"])));
    }

    #[test]
    fn map_tag_follows_mode() {
        let cfg = config(vec![GoalMode::Maps]);
        let plain =
            compose_win_condition(&cfg, &tag_index(), &[], MapMode::Plain, FINAL_REGION).unwrap();
        let prog =
            compose_win_condition(&cfg, &tag_index(), &[], MapMode::Progressive, FINAL_REGION).unwrap();
        let s = state(&[], &[FINAL_REGION], &["GladesMap"]);
        assert!(plain.is_met(&s));
        assert!(!prog.is_met(&s));
    }

    #[test]
    fn conjunction_and_pending() {
        let win = compose_win_condition(
            &config(vec![GoalMode::SkillTrees, GoalMode::WorldTour]),
            &tag_index(),
            &[],
            MapMode::Plain,
            FINAL_REGION,
        )
        .unwrap();
        let s = state(&[("Relic", 3)], &[FINAL_REGION], &["TreeA"]);
        assert!(!win.is_met(&s));
        assert_eq!(win.pending(&s), vec![GoalMode::SkillTrees]);
    }

    #[test]
    fn empty_modes_is_configuration_error() {
        let err = compose_win_condition(
            &config(vec![]),
            &tag_index(),
            &[],
            MapMode::Plain,
            FINAL_REGION,
        )
        .unwrap_err();
        assert_eq!(err, GenerationError::config(ConfigError::NoGoalModes));
    }

    #[test]
    fn missing_tag_is_configuration_error() {
        let err = compose_win_condition(
            &config(vec![GoalMode::SkillTrees]),
            &TagIndex::new(),
            &[],
            MapMode::Plain,
            FINAL_REGION,
        )
        .unwrap_err();
        assert!(matches!(err, GenerationError::Configuration(_)));
    }

    #[test]
    fn never_reachable_tree_is_rejected() {
        let err = compose_win_condition(
            &config(vec![GoalMode::SkillTrees]),
            &tag_index(),
            &["TreeB".to_string()],
            MapMode::Plain,
            FINAL_REGION,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Configuration(ref errors)
                if matches!(&errors[0], ConfigError::WorldShape(msg) if msg.contains("TreeB"))
        ));
    }

    #[test]
    fn unreachable_altar_blocks_progressive_maps_only() {
        let cfg = config(vec![GoalMode::Maps]);
        let never = ["GladesMap".to_string()];
        assert!(
            compose_win_condition(&cfg, &tag_index(), &never, MapMode::Progressive, FINAL_REGION)
                .is_err()
        );
        assert!(compose_win_condition(
            &config(vec![GoalMode::SkillTrees]),
            &tag_index(),
            &never,
            MapMode::Progressive,
            FINAL_REGION
        )
        .is_ok());
    }
}
