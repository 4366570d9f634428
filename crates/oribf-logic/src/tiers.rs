//! Tier policy: which rule tiers are live for a generation run.
//!
//! Difficulty levels form a cumulative ladder: choosing a level activates
//! that tier and every tier below it. The `glitched` tier sits outside the
//! ladder and is switched on only by the [`Modifier::Glitches`] modifier.
//!
//! ```
//! use std::collections::BTreeSet;
//! use oribf_logic::tiers::{active_tiers, Difficulty, Tier};
//!
//! let tiers = active_tiers(Difficulty::Expert, &BTreeSet::new());
//! assert!(tiers.contains(Tier::Standard));
//! assert!(!tiers.contains(Tier::Master));
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A named bucket of access-sets in the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Casual,
    Standard,
    Expert,
    Master,
    Glitched,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Casual,
        Tier::Standard,
        Tier::Expert,
        Tier::Master,
        Tier::Glitched,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Casual => "casual",
            Tier::Standard => "standard",
            Tier::Expert => "expert",
            Tier::Master => "master",
            Tier::Glitched => "glitched",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logic difficulty chosen by the player. Ordered lowest to highest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Casual,
    Standard,
    Expert,
    Master,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Casual,
        Difficulty::Standard,
        Difficulty::Expert,
        Difficulty::Master,
    ];

    /// The ladder tier this level unlocks.
    pub fn tier(self) -> Tier {
        match self {
            Difficulty::Casual => Tier::Casual,
            Difficulty::Standard => Tier::Standard,
            Difficulty::Expert => Tier::Expert,
            Difficulty::Master => Tier::Master,
        }
    }

    /// Modifiers implied by this level when the options name none.
    ///
    /// Each level includes everything the level below enables.
    pub fn default_modifiers(self) -> ModifierSet {
        use Modifier::*;
        let mut set = ModifierSet::new();
        if self >= Difficulty::Standard {
            set.extend([Lure, DamageBoost, Rekindle]);
        }
        if self >= Difficulty::Expert {
            set.extend([DoubleBash, ChargeFlameBurn, AirDash]);
        }
        if self >= Difficulty::Master {
            set.extend([GrenadeJump, ChargeDash, TripleJump]);
        }
        set
    }
}

/// Technique toggles that gate capability tokens (and the glitched tier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Modifier {
    Lure,
    DoubleBash,
    GrenadeJump,
    AirDash,
    ChargeDash,
    TripleJump,
    ChargeFlameBurn,
    /// Taking damage to cross hazards; unlocks health-cell requirements.
    DamageBoost,
    Rekindle,
    Glitches,
}

pub type ModifierSet = BTreeSet<Modifier>;

/// Frozen set of active tiers. Built once per run by [`active_tiers`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierSet(BTreeSet<Tier>);

impl TierSet {
    pub fn contains(&self, tier: Tier) -> bool {
        self.0.contains(&tier)
    }

    pub fn iter(&self) -> impl Iterator<Item = Tier> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Compute the active tier set for a difficulty and modifier set.
pub fn active_tiers(difficulty: Difficulty, modifiers: &ModifierSet) -> TierSet {
    let mut tiers: BTreeSet<Tier> = Difficulty::ALL
        .iter()
        .filter(|level| **level <= difficulty)
        .map(|level| level.tier())
        .collect();
    if modifiers.contains(&Modifier::Glitches) {
        tiers.insert(Tier::Glitched);
    }
    TierSet(tiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tiers: &[Tier]) -> Vec<Tier> {
        tiers.to_vec()
    }

    #[test]
    fn casual_only_casual() {
        let tiers = active_tiers(Difficulty::Casual, &ModifierSet::new());
        assert_eq!(tiers.iter().collect::<Vec<_>>(), set(&[Tier::Casual]));
    }

    #[test]
    fn expert_is_cumulative() {
        let tiers = active_tiers(Difficulty::Expert, &ModifierSet::new());
        assert_eq!(
            tiers.iter().collect::<Vec<_>>(),
            set(&[Tier::Casual, Tier::Standard, Tier::Expert])
        );
    }

    #[test]
    fn master_is_cumulative() {
        let tiers = active_tiers(Difficulty::Master, &ModifierSet::new());
        assert_eq!(
            tiers.iter().collect::<Vec<_>>(),
            set(&[Tier::Casual, Tier::Standard, Tier::Expert, Tier::Master])
        );
    }

    #[test]
    fn glitches_adds_glitched_at_any_level() {
        let mods: ModifierSet = [Modifier::Glitches].into_iter().collect();
        for level in Difficulty::ALL {
            let tiers = active_tiers(level, &mods);
            assert!(tiers.contains(Tier::Glitched));
            assert!(tiers.contains(Tier::Casual));
            assert!(tiers.contains(level.tier()));
        }
    }

    #[test]
    fn glitched_absent_without_modifier() {
        let tiers = active_tiers(Difficulty::Master, &Difficulty::Master.default_modifiers());
        assert!(!tiers.contains(Tier::Glitched));
    }

    #[test]
    fn presets_are_nested() {
        let mut prev = ModifierSet::new();
        for level in Difficulty::ALL {
            let mods = level.default_modifiers();
            assert!(prev.is_subset(&mods), "{:?} drops a modifier", level);
            prev = mods;
        }
        assert!(Difficulty::Casual.default_modifiers().is_empty());
    }

    #[test]
    fn tier_serde_lowercase() {
        let json = serde_json::to_string(&Tier::Glitched).unwrap();
        assert_eq!(json, "\"glitched\"");
        let back: Tier = serde_json::from_str("\"expert\"").unwrap();
        assert_eq!(back, Tier::Expert);
    }
}
