//! Derived capabilities: named techniques that combine item ownership,
//! ability-cell thresholds and modifier toggles.
//!
//! Resolution is a pure function of the owned item counts and an explicit
//! [`LogicContext`]; nothing is read from global state, so several worlds
//! can be generated side by side. Every test is monotone in item counts.
//!
//! | Token | Requires |
//! |-------|----------|
//! | `Lure` | Lure modifier |
//! | `DoubleBash` | modifier, Bash |
//! | `GrenadeJump` | modifier, Climb, ChargeJump, Grenade |
//! | `AirDash` | modifier, Dash, ability cells |
//! | `ChargeDash` / `RocketJump` | modifier, Dash, ability cells |
//! | `TripleJump` | modifier, DoubleJump, ability cells |
//! | `ChargeFlameBurn` | modifier, ChargeFlame, ability cells |
//! | `UltraDefense` | DamageBoost modifier, ability cells |
//! | `BashGrenade` | Bash, Grenade |
//! | `Rekindle` | modifier |
//! | `Open` / `OpenWorld` | always |

use serde::{Deserialize, Serialize};

use crate::items::names;
use crate::tiers::{Modifier, ModifierSet};
use crate::world::ItemCounts;

/// Ability-cell counts needed before a tree upgrade counts as learned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityThresholds {
    pub charge_flame_burn: u32,
    pub air_dash: u32,
    pub charge_dash: u32,
    pub triple_jump: u32,
    pub ultra_defense: u32,
}

impl Default for AbilityThresholds {
    fn default() -> Self {
        Self {
            charge_flame_burn: 3,
            air_dash: 5,
            charge_dash: 9,
            triple_jump: 16,
            ultra_defense: 19,
        }
    }
}

/// Everything a predicate needs besides the host state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicContext {
    pub modifiers: ModifierSet,
    pub thresholds: AbilityThresholds,
}

impl LogicContext {
    pub fn new(modifiers: ModifierSet, thresholds: AbilityThresholds) -> Self {
        Self {
            modifiers,
            thresholds,
        }
    }

    pub fn enabled(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// A closed set of capability tokens usable in the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Lure,
    DoubleBash,
    GrenadeJump,
    AirDash,
    ChargeDash,
    RocketJump,
    TripleJump,
    ChargeFlameBurn,
    UltraDefense,
    BashGrenade,
    Rekindle,
    Open,
}

impl Capability {
    /// Parse a rule-table token. `OpenWorld` is accepted as an alias of `Open`.
    pub fn from_token(token: &str) -> Option<Capability> {
        let cap = match token {
            "Lure" => Capability::Lure,
            "DoubleBash" => Capability::DoubleBash,
            "GrenadeJump" => Capability::GrenadeJump,
            "AirDash" => Capability::AirDash,
            "ChargeDash" => Capability::ChargeDash,
            "RocketJump" => Capability::RocketJump,
            "TripleJump" => Capability::TripleJump,
            "ChargeFlameBurn" => Capability::ChargeFlameBurn,
            "UltraDefense" => Capability::UltraDefense,
            "BashGrenade" => Capability::BashGrenade,
            "Rekindle" => Capability::Rekindle,
            "Open" | "OpenWorld" => Capability::Open,
            _ => return None,
        };
        Some(cap)
    }

    pub fn resolve(self, items: &impl ItemCounts, ctx: &LogicContext) -> bool {
        let cells = items.count(names::ABILITY_CELL);
        let t = &ctx.thresholds;
        match self {
            Capability::Lure => ctx.enabled(Modifier::Lure),
            Capability::DoubleBash => ctx.enabled(Modifier::DoubleBash) && items.has(names::BASH, 1),
            Capability::GrenadeJump => {
                ctx.enabled(Modifier::GrenadeJump)
                    && items.has(names::CLIMB, 1)
                    && items.has(names::CHARGE_JUMP, 1)
                    && items.has(names::GRENADE, 1)
            }
            Capability::AirDash => {
                ctx.enabled(Modifier::AirDash) && items.has(names::DASH, 1) && cells >= t.air_dash
            }
            Capability::ChargeDash | Capability::RocketJump => {
                ctx.enabled(Modifier::ChargeDash)
                    && items.has(names::DASH, 1)
                    && cells >= t.charge_dash
            }
            Capability::TripleJump => {
                ctx.enabled(Modifier::TripleJump)
                    && items.has(names::DOUBLE_JUMP, 1)
                    && cells >= t.triple_jump
            }
            Capability::ChargeFlameBurn => {
                ctx.enabled(Modifier::ChargeFlameBurn)
                    && items.has(names::CHARGE_FLAME, 1)
                    && cells >= t.charge_flame_burn
            }
            Capability::UltraDefense => {
                ctx.enabled(Modifier::DamageBoost) && cells >= t.ultra_defense
            }
            Capability::BashGrenade => items.has(names::BASH, 1) && items.has(names::GRENADE, 1),
            Capability::Rekindle => ctx.enabled(Modifier::Rekindle),
            // Closed dungeons are not modelled; every dungeon counts as open.
            Capability::Open => true,
        }
    }
}

/// Resolve a raw token. Unknown tokens are `false`.
pub fn resolve_token(token: &str, items: &impl ItemCounts, ctx: &LogicContext) -> bool {
    Capability::from_token(token).is_some_and(|cap| cap.resolve(items, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Inventory;

    fn all_modifiers() -> ModifierSet {
        [
            Modifier::Lure,
            Modifier::DoubleBash,
            Modifier::GrenadeJump,
            Modifier::AirDash,
            Modifier::ChargeDash,
            Modifier::TripleJump,
            Modifier::ChargeFlameBurn,
            Modifier::DamageBoost,
            Modifier::Rekindle,
        ]
        .into_iter()
        .collect()
    }

    fn ctx_with(modifiers: ModifierSet) -> LogicContext {
        LogicContext::new(modifiers, AbilityThresholds::default())
    }

    #[test]
    fn lure_follows_modifier() {
        let inv = Inventory::new();
        assert!(!Capability::Lure.resolve(&inv, &LogicContext::default()));
        assert!(Capability::Lure.resolve(&inv, &ctx_with(all_modifiers())));
    }

    #[test]
    fn double_bash_needs_bash() {
        let ctx = ctx_with(all_modifiers());
        let mut inv = Inventory::new();
        assert!(!Capability::DoubleBash.resolve(&inv, &ctx));
        inv.add("Bash", 1);
        assert!(Capability::DoubleBash.resolve(&inv, &ctx));
    }

    #[test]
    fn grenade_jump_needs_all_three() {
        let ctx = ctx_with(all_modifiers());
        let mut inv = Inventory::new();
        inv.add("Climb", 1);
        inv.add("ChargeJump", 1);
        assert!(!Capability::GrenadeJump.resolve(&inv, &ctx));
        inv.add("Grenade", 1);
        assert!(Capability::GrenadeJump.resolve(&inv, &ctx));
    }

    #[test]
    fn dash_upgrades_follow_thresholds() {
        let ctx = ctx_with(all_modifiers());
        let mut inv = Inventory::new();
        inv.add("Dash", 1);
        inv.add("AbilityCell", 4);
        assert!(!Capability::AirDash.resolve(&inv, &ctx));
        inv.add("AbilityCell", 1);
        assert!(Capability::AirDash.resolve(&inv, &ctx));
        assert!(!Capability::ChargeDash.resolve(&inv, &ctx));
        inv.add("AbilityCell", 4);
        assert!(Capability::ChargeDash.resolve(&inv, &ctx));
        assert!(Capability::RocketJump.resolve(&inv, &ctx));
    }

    #[test]
    fn upgrades_need_modifier_even_with_cells() {
        let ctx = LogicContext::default();
        let mut inv = Inventory::new();
        for item in ["Dash", "DoubleJump", "ChargeFlame"] {
            inv.add(item, 1);
        }
        inv.add("AbilityCell", 33);
        for cap in [
            Capability::AirDash,
            Capability::ChargeDash,
            Capability::TripleJump,
            Capability::ChargeFlameBurn,
        ] {
            assert!(!cap.resolve(&inv, &ctx), "{:?} ignored its modifier", cap);
        }
    }

    #[test]
    fn ultra_defense_requires_damage_boost() {
        let mut inv = Inventory::new();
        inv.add("AbilityCell", 1_000);
        let mut mods = all_modifiers();
        mods.remove(&Modifier::DamageBoost);
        assert!(!Capability::UltraDefense.resolve(&inv, &ctx_with(mods)));
        assert!(Capability::UltraDefense.resolve(&inv, &ctx_with(all_modifiers())));
    }

    #[test]
    fn bash_grenade_has_no_modifier_gate() {
        let mut inv = Inventory::new();
        inv.add("Bash", 1);
        inv.add("Grenade", 1);
        assert!(Capability::BashGrenade.resolve(&inv, &LogicContext::default()));
    }

    #[test]
    fn open_is_always_true() {
        assert!(Capability::Open.resolve(&Inventory::new(), &LogicContext::default()));
        assert_eq!(Capability::from_token("OpenWorld"), Some(Capability::Open));
    }

    #[test]
    fn unknown_token_fails_closed() {
        let mut inv = Inventory::new();
        inv.add("AbilityCell", 33);
        assert!(!resolve_token("QuadJump", &inv, &ctx_with(all_modifiers())));
        assert!(resolve_token("Rekindle", &inv, &ctx_with(all_modifiers())));
    }

    #[test]
    fn custom_thresholds_apply() {
        let thresholds = AbilityThresholds {
            triple_jump: 2,
            ..AbilityThresholds::default()
        };
        let ctx = LogicContext::new(all_modifiers(), thresholds);
        let mut inv = Inventory::new();
        inv.add("DoubleJump", 1);
        inv.add("AbilityCell", 2);
        assert!(Capability::TripleJump.resolve(&inv, &ctx));
    }
}
