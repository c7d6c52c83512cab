//! Derived combat attributes.

use serde::{Deserialize, Serialize};
use warboard_protocol::BaseAttributes;

/// The combat-relevant numbers computed from the six base attributes.
///
/// Derivation happens exactly once, when a character is created; after
/// that only current health and mana move during play. Re-deriving from
/// mutated base attributes is deliberately impossible through the public
/// API, which keeps every character's numbers stable for the whole
/// session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAttributes {
    pub max_health: u32,
    pub max_mana: u32,
    pub melee_attack: u32,
    pub ranged_attack: u32,
    pub magic_attack: u32,
    /// Mana spent by one magic attack.
    pub magic_cost: u32,
    /// Maximum Chebyshev distance for a ranged attack.
    pub ranged_range: u32,
    /// Maximum Chebyshev distance for a magic attack.
    pub magic_range: u32,
    /// Maximum Chebyshev distance for one move.
    pub speed: u32,
    pub initiative: u32,
}

impl DerivedAttributes {
    /// Derives the full attribute block from the six base values.
    ///
    /// The coefficients are a fixed policy, not tunables: clients display
    /// the results, and tests pin the table. Integer division throughout.
    pub fn from_base(base: &BaseAttributes) -> Self {
        Self {
            max_health: base.constitution * 10,
            max_mana: base.intelligence * 10,
            melee_attack: base.strength * 2,
            ranged_attack: base.dexterity * 2,
            magic_attack: base.intelligence * 2,
            magic_cost: 20u32.saturating_sub(base.wisdom).max(5),
            ranged_range: 2 + base.dexterity / 4,
            magic_range: 2 + base.wisdom / 4,
            speed: 3 + base.dexterity / 4,
            initiative: base.dexterity + base.wisdom,
        }
    }
}
