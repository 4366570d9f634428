//! Access formulas and the predicates compiled from them.
//!
//! A formula maps each [`Tier`] to an ordered list of access-sets. An
//! access-set is a conjunction of [`Atom`]s; the formula holds when any
//! access-set of any *active* tier holds. Compiling against a frozen
//! [`TierSet`] flattens the active sets into a [`Predicate`], an immutable
//! value evaluated lazily against host state. A formula with no active set
//! compiles to [`Predicate::Never`], never to an always-true default.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::atoms::Atom;
use crate::capability::LogicContext;
use crate::tiers::{Tier, TierSet};
use crate::world::{ItemCounts, ReachState};

/// A conjunction of atoms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessSet(pub Vec<Atom>);

impl AccessSet {
    pub fn is_satisfied(&self, items: &impl ItemCounts, ctx: &LogicContext) -> bool {
        self.0.iter().all(|atom| atom.is_satisfied(items, ctx))
    }
}

impl fmt::Display for AccessSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, atom) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{}", atom)?;
        }
        Ok(())
    }
}

/// Tiered OR-of-ANDs condition for one access point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessFormula {
    tiers: BTreeMap<Tier, Vec<AccessSet>>,
}

impl AccessFormula {
    pub fn new() -> Self {
        Self::default()
    }

    /// `casual: [[Free]]`; used for connections the table leaves unconstrained.
    pub fn free() -> Self {
        let mut formula = Self::new();
        formula.push(Tier::Casual, AccessSet(vec![Atom::Free]));
        formula
    }

    pub fn push(&mut self, tier: Tier, set: AccessSet) {
        self.tiers.entry(tier).or_default().push(set);
    }

    pub fn with(mut self, tier: Tier, atoms: Vec<Atom>) -> Self {
        self.push(tier, AccessSet(atoms));
        self
    }

    pub fn tiers(&self) -> impl Iterator<Item = (Tier, &[AccessSet])> {
        self.tiers.iter().map(|(t, sets)| (*t, sets.as_slice()))
    }

    /// Access-sets belonging to active tiers, in tier then table order.
    pub fn active_sets(&self, active: &TierSet) -> Vec<AccessSet> {
        self.tiers
            .iter()
            .filter(|(tier, _)| active.contains(**tier))
            .flat_map(|(_, sets)| sets.iter().cloned())
            .collect()
    }

    /// Evaluate directly without compiling.
    pub fn evaluate(&self, active: &TierSet, items: &impl ItemCounts, ctx: &LogicContext) -> bool {
        self.tiers
            .iter()
            .filter(|(tier, _)| active.contains(**tier))
            .any(|(_, sets)| sets.iter().any(|set| set.is_satisfied(items, ctx)))
    }

    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.tiers.values().flatten().flat_map(|set| set.0.iter())
    }
}

/// "At least `min` of these locations are reachable."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachQuota {
    pub locations: Vec<String>,
    pub min: u32,
}

impl ReachQuota {
    pub fn is_met(&self, state: &impl ReachState) -> bool {
        let mut reached = 0u32;
        for location in &self.locations {
            if state.can_reach_location(location) {
                reached += 1;
                if reached >= self.min {
                    return true;
                }
            }
        }
        reached >= self.min
    }
}

/// Everything attached to one access point before compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    pub formula: AccessFormula,
    pub quota: Option<ReachQuota>,
}

impl From<AccessFormula> for AccessRule {
    fn from(formula: AccessFormula) -> Self {
        Self {
            formula,
            quota: None,
        }
    }
}

#[derive(Debug)]
pub struct CompiledRule {
    sets: Vec<AccessSet>,
    quota: Option<ReachQuota>,
    ctx: Arc<LogicContext>,
}

/// An evaluable access predicate. Cheap to clone, immutable once built.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// No active access-set; the access point exists but is never usable.
    Never,
    Rule(Arc<CompiledRule>),
}

impl Predicate {
    pub fn compile(rule: &AccessRule, active: &TierSet, ctx: &Arc<LogicContext>) -> Predicate {
        let sets = rule.formula.active_sets(active);
        if sets.is_empty() {
            return Predicate::Never;
        }
        Predicate::Rule(Arc::new(CompiledRule {
            sets,
            quota: rule.quota.clone(),
            ctx: Arc::clone(ctx),
        }))
    }

    pub fn evaluate(&self, state: &impl ReachState) -> bool {
        match self {
            Predicate::Never => false,
            Predicate::Rule(rule) => {
                if let Some(quota) = &rule.quota {
                    if !quota.is_met(state) {
                        return false;
                    }
                }
                rule.sets.iter().any(|set| set.is_satisfied(state, &rule.ctx))
            }
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Predicate::Never)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Never => f.write_str("never"),
            Predicate::Rule(rule) => {
                if let Some(q) = &rule.quota {
                    write!(f, "[{} of {}] ", q.min, q.locations.len())?;
                }
                for (i, set) in rule.sets.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "({})", set)?;
                }
                Ok(())
            }
        }
    }
}
