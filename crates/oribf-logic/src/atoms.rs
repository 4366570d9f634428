//! Requirement atoms, the leaves of every access formula.

use std::fmt;

use serde::Serialize;

use crate::capability::{Capability, LogicContext};
use crate::items::names;
use crate::tiers::Modifier;
use crate::world::ItemCounts;

/// The smallest unit of an access condition. Resolved from raw rule-table
/// entries once, at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Atom {
    /// Own at least one copy.
    Item(String),
    /// Own at least `n` copies; `n >= 1`.
    ItemCount(String, u32),
    Capability(Capability),
    /// Always satisfied.
    Free,
}

impl Atom {
    pub fn is_satisfied(&self, items: &impl ItemCounts, ctx: &LogicContext) -> bool {
        match self {
            Atom::Item(name) => health_allowed(name, ctx) && items.has(name, 1),
            Atom::ItemCount(name, n) => health_allowed(name, ctx) && items.has(name, *n),
            Atom::Capability(cap) => cap.resolve(items, ctx),
            Atom::Free => true,
        }
    }
}

/// Health-cell requirements model damage boosting and only count when the
/// player opted into it.
fn health_allowed(item: &str, ctx: &LogicContext) -> bool {
    item != names::HEALTH_CELL || ctx.enabled(Modifier::DamageBoost)
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Item(name) => f.write_str(name),
            Atom::ItemCount(name, n) => write!(f, "{}x{}", name, n),
            Atom::Capability(cap) => write!(f, "{:?}", cap),
            Atom::Free => f.write_str("Free"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::AbilityThresholds;
    use crate::host::Inventory;
    use crate::tiers::ModifierSet;

    fn dboost() -> LogicContext {
        let mods: ModifierSet = [Modifier::DamageBoost].into_iter().collect();
        LogicContext::new(mods, AbilityThresholds::default())
    }

    #[test]
    fn item_and_count() {
        let ctx = LogicContext::default();
        let mut inv = Inventory::new();
        inv.add("KeyStone", 3);
        assert!(Atom::Item("KeyStone".into()).is_satisfied(&inv, &ctx));
        assert!(Atom::ItemCount("KeyStone".into(), 3).is_satisfied(&inv, &ctx));
        assert!(!Atom::ItemCount("KeyStone".into(), 4).is_satisfied(&inv, &ctx));
        assert!(!Atom::Item("Bash".into()).is_satisfied(&inv, &ctx));
    }

    #[test]
    fn free_always() {
        assert!(Atom::Free.is_satisfied(&Inventory::new(), &LogicContext::default()));
    }

    #[test]
    fn health_cells_suppressed_without_damage_boost() {
        let mut inv = Inventory::new();
        inv.add("HealthCell", 12);
        let plain = Atom::Item("HealthCell".into());
        let counted = Atom::ItemCount("HealthCell".into(), 4);
        assert!(!plain.is_satisfied(&inv, &LogicContext::default()));
        assert!(!counted.is_satisfied(&inv, &LogicContext::default()));
        assert!(plain.is_satisfied(&inv, &dboost()));
        assert!(counted.is_satisfied(&inv, &dboost()));
    }

    #[test]
    fn display_forms() {
        assert_eq!(Atom::ItemCount("KeyStone".into(), 4).to_string(), "KeyStonex4");
        assert_eq!(Atom::Capability(Capability::Lure).to_string(), "Lure");
    }
}
