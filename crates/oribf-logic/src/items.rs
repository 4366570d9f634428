//! The item table: every item the world can place, with classification and
//! base pool count.
//!
//! Counts are the vanilla distribution of pickups. Options may scale them
//! (warmth fragments are added by the fragment goal, relics are pinned by
//! the world-tour goal) before the pool is built, never after.

use serde::{Deserialize, Serialize};

/// How the host's shuffler treats an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemClassification {
    /// Can unlock access; placed with logic.
    Progression,
    /// Nice to have, never required.
    Useful,
    /// Experience orbs and other padding.
    Filler,
}

/// One row of the item table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemDef {
    pub name: &'static str,
    pub classification: ItemClassification,
    /// Copies in the base pool.
    pub count: u32,
}

/// Item name constants referenced by logic code.
pub mod names {
    pub const ABILITY_CELL: &str = "AbilityCell";
    pub const HEALTH_CELL: &str = "HealthCell";
    pub const ENERGY_CELL: &str = "EnergyCell";
    pub const KEY_STONE: &str = "KeyStone";
    pub const MAP_STONE: &str = "MapStone";
    pub const WARMTH_FRAGMENT: &str = "WarmthFragment";
    pub const RELIC: &str = "Relic";

    pub const BASH: &str = "Bash";
    pub const CHARGE_FLAME: &str = "ChargeFlame";
    pub const CHARGE_JUMP: &str = "ChargeJump";
    pub const CLIMB: &str = "Climb";
    pub const DASH: &str = "Dash";
    pub const DOUBLE_JUMP: &str = "DoubleJump";
    pub const GRENADE: &str = "Grenade";
}

use ItemClassification::{Filler, Progression};

const fn def(name: &'static str, classification: ItemClassification, count: u32) -> ItemDef {
    ItemDef {
        name,
        classification,
        count,
    }
}

/// The full item table, in id order.
pub static ITEM_TABLE: &[ItemDef] = &[
    def("AbilityCell", Progression, 33),
    def("HealthCell", Progression, 12),
    def("EnergyCell", Progression, 14),
    def("KeyStone", Progression, 40),
    def("MapStone", Progression, 9),
    // World events
    def("GinsoKey", Progression, 1),
    def("ForlornKey", Progression, 1),
    def("HoruKey", Progression, 1),
    def("CleanWater", Progression, 1),
    def("Wind", Progression, 1),
    // Skills
    def("WallJump", Progression, 1),
    def("ChargeFlame", Progression, 1),
    def("DoubleJump", Progression, 1),
    def("Bash", Progression, 1),
    def("Stomp", Progression, 1),
    def("Glide", Progression, 1),
    def("Climb", Progression, 1),
    def("ChargeJump", Progression, 1),
    def("Dash", Progression, 1),
    def("Grenade", Progression, 1),
    // Teleporters
    def("TPGlades", Progression, 1),
    def("TPGrove", Progression, 1),
    def("TPSwamp", Progression, 1),
    def("TPGrotto", Progression, 1),
    def("TPGinso", Progression, 1),
    def("TPValley", Progression, 1),
    def("TPForlorn", Progression, 1),
    def("TPSorrow", Progression, 1),
    def("TPHoru", Progression, 1),
    def("TPBlackroot", Progression, 1),
    // Goal items, added by options
    def("WarmthFragment", Progression, 0),
    def("Relic", Progression, 0),
    // Experience
    def("EX15", Filler, 10),
    def("EX50", Filler, 20),
    def("EX100", Filler, 53),
    def("EX200", Filler, 29),
];

/// Look up an item definition by name.
pub fn item_def(name: &str) -> Option<&'static ItemDef> {
    ITEM_TABLE.iter().find(|d| d.name == name)
}

/// Whether `name` is a real item (as opposed to a capability token).
pub fn is_item(name: &str) -> bool {
    item_def(name).is_some()
}

/// Filler items in ascending value order.
pub fn filler_items() -> impl Iterator<Item = &'static ItemDef> {
    ITEM_TABLE
        .iter()
        .filter(|d| d.classification == ItemClassification::Filler)
}
