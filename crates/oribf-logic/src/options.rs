//! Generation options and their validation.
//!
//! Options arrive as data (typically JSON from the host) and are checked
//! as a whole before anything else runs, so the player sees every problem
//! at once rather than the first one.
//!
//! ```
//! use oribf_logic::goals::GoalMode;
//! use oribf_logic::options::{validate_options, LogicOptions};
//!
//! let mut options = LogicOptions::default();
//! options.goals = vec![GoalMode::SkillTrees, GoalMode::WorldTour];
//! assert!(validate_options(&options).is_empty());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capability::{AbilityThresholds, LogicContext};
use crate::goals::{GoalConfig, GoalMode};
use crate::items::{item_def, names};
use crate::tiers::{Difficulty, Modifier, ModifierSet};

/// How map altars feed the goal and the pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    /// Each altar is an ordinary pickup location.
    #[default]
    Plain,
    /// Altars grant map stones; the k-th turned-in stone unlocks a ranked location.
    Progressive,
}

/// Player-facing generation options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicOptions {
    pub difficulty: Difficulty,
    /// Explicit modifier list. `None` uses the difficulty preset.
    pub modifiers: Option<Vec<Modifier>>,
    pub thresholds: AbilityThresholds,
    pub goals: Vec<GoalMode>,
    /// Require reaching the Horu escape in addition to the goals.
    pub require_final_gate: bool,
    pub fragments_available: u32,
    pub fragments_required: u32,
    pub relic_count: u32,
    pub map_mode: MapMode,
    /// Reject rule tables with unknown atoms instead of failing them closed.
    pub strict_rules: bool,
    pub seed: u64,
}

impl Default for LogicOptions {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Casual,
            modifiers: None,
            thresholds: AbilityThresholds::default(),
            goals: vec![GoalMode::SkillTrees],
            require_final_gate: true,
            fragments_available: 30,
            fragments_required: 20,
            relic_count: 8,
            map_mode: MapMode::Plain,
            strict_rules: true,
            seed: 0,
        }
    }
}

impl LogicOptions {
    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn modifier_set(&self) -> ModifierSet {
        match &self.modifiers {
            Some(list) => list.iter().copied().collect(),
            None => self.difficulty.default_modifiers(),
        }
    }

    pub fn logic_context(&self) -> LogicContext {
        LogicContext::new(self.modifier_set(), self.thresholds)
    }

    pub fn has_goal(&self, mode: GoalMode) -> bool {
        self.goals.contains(&mode)
    }

    pub fn goal_config(&self) -> GoalConfig {
        GoalConfig {
            modes: self.goals.clone(),
            require_final_gate: self.require_final_gate,
            fragments_available: self.fragments_available,
            fragments_required: self.fragments_required,
            relic_count: self.relic_count,
        }
    }
}

/// A structurally invalid option combination.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no goal mode selected")]
    NoGoalModes,
    #[error("goal {0:?} listed more than once")]
    DuplicateGoal(GoalMode),
    /// Only `None` goals and no final gate: nothing would ever finish the seed.
    #[error("no completion condition: goal is None and the final gate is disabled")]
    NoCompletionCondition,
    #[error("warmth fragment goal needs a non-zero fragment count")]
    ZeroFragments,
    #[error("world tour goal needs at least one relic")]
    ZeroRelics,
    #[error("air dash threshold {air_dash} must be below charge dash threshold {charge_dash}")]
    ThresholdOrder { air_dash: u32, charge_dash: u32 },
    #[error("{name} threshold {value} exceeds the {available} ability cells in the world")]
    UnreachableThreshold {
        name: &'static str,
        value: u32,
        available: u32,
    },
    #[error("more pinned and progression items ({required}) than open locations ({slots})")]
    PoolOverflow { required: u32, slots: u32 },
    #[error("{0}")]
    WorldShape(String),
}

/// Validate options, returning all errors found.
pub fn validate_options(options: &LogicOptions) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if options.goals.is_empty() {
        errors.push(ConfigError::NoGoalModes);
    }
    let mut seen = Vec::new();
    for mode in &options.goals {
        if seen.contains(mode) {
            errors.push(ConfigError::DuplicateGoal(*mode));
        } else {
            seen.push(*mode);
        }
    }
    if !options.goals.is_empty()
        && options.goals.iter().all(|m| *m == GoalMode::None)
        && !options.require_final_gate
    {
        errors.push(ConfigError::NoCompletionCondition);
    }

    if options.has_goal(GoalMode::WarmthFragments)
        && (options.fragments_available == 0 || options.fragments_required == 0)
    {
        errors.push(ConfigError::ZeroFragments);
    }
    if options.has_goal(GoalMode::WorldTour) && options.relic_count == 0 {
        errors.push(ConfigError::ZeroRelics);
    }

    let t = &options.thresholds;
    if t.air_dash >= t.charge_dash {
        errors.push(ConfigError::ThresholdOrder {
            air_dash: t.air_dash,
            charge_dash: t.charge_dash,
        });
    }
    let available = item_def(names::ABILITY_CELL).map_or(0, |d| d.count);
    for (name, value) in [
        ("charge flame burn", t.charge_flame_burn),
        ("air dash", t.air_dash),
        ("charge dash", t.charge_dash),
        ("triple jump", t.triple_jump),
        ("ultra defense", t.ultra_defense),
    ] {
        if value > available {
            errors.push(ConfigError::UnreachableThreshold {
                name,
                value,
                available,
            });
        }
    }

    errors
}
