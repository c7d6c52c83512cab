//! The character entity and its health/mana transitions.

use serde::{Deserialize, Serialize};
use warboard_protocol::{
    BaseAttributes, CharacterId, CharacterView, DisplayProperty, SessionId, UserId,
};

use crate::{DerivedAttributes, Position};

/// Everything needed to create a character, minus the id (ids are assigned
/// by the persistence layer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCharacter {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub name: String,
    pub avatar_id: Option<u64>,
    pub position: Position,
    pub base: BaseAttributes,
}

/// How much health a revive restores.
///
/// The revival policy is a session-server configuration, not a game rule
/// the client can observe ahead of time, so it lives on the engine config
/// and defaults to [`RevivePolicy::Half`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevivePolicy {
    /// Restore to half of max health, rounded up. Never less than 1.
    #[default]
    Half,
    /// Restore to full max health.
    Full,
}

impl RevivePolicy {
    /// The health a character of the given maximum wakes up with.
    pub fn restored_health(&self, max_health: u32) -> u32 {
        match self {
            Self::Half => max_health.div_ceil(2).max(1),
            Self::Full => max_health,
        }
    }
}

/// A character on the board.
///
/// Invariants, maintained by the methods below and relied on everywhere:
/// - `health <= derived.max_health` and `mana <= derived.max_mana`;
/// - `defeated` is set exactly when `health` reaches 0 and cleared only
///   by [`revive`](Self::revive);
/// - `derived` never changes after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub user_id: UserId,
    pub session_id: SessionId,
    pub name: String,
    pub avatar_id: Option<u64>,
    pub position: Position,
    pub base: BaseAttributes,
    pub derived: DerivedAttributes,
    pub health: u32,
    pub mana: u32,
    pub defeated: bool,
}

impl Character {
    /// Builds a fresh character: derives the attribute block and starts
    /// at full health and mana.
    pub fn create(id: CharacterId, new: NewCharacter) -> Self {
        let derived = DerivedAttributes::from_base(&new.base);
        Self {
            id,
            user_id: new.user_id,
            session_id: new.session_id,
            name: new.name,
            avatar_id: new.avatar_id,
            position: new.position,
            base: new.base,
            derived,
            health: derived.max_health,
            mana: derived.max_mana,
            defeated: false,
        }
    }

    /// Applies damage, flooring health at 0. Returns `true` if this blow
    /// defeated the character (i.e. the flag flipped just now).
    pub fn apply_damage(&mut self, damage: u32) -> bool {
        self.health = self.health.saturating_sub(damage);
        if self.health == 0 && !self.defeated {
            self.defeated = true;
            return true;
        }
        false
    }

    /// Deducts mana. Callers check affordability first (the combat
    /// resolver reports `LowMana`); saturation here is a floor, not a
    /// budget check.
    pub fn spend_mana(&mut self, cost: u32) {
        self.mana = self.mana.saturating_sub(cost);
    }

    /// Clears the defeated flag and restores health per `policy`.
    /// Mana is untouched. The caller verifies the character is actually
    /// defeated first.
    pub fn revive(&mut self, policy: RevivePolicy) {
        self.health = policy.restored_health(self.derived.max_health);
        self.defeated = false;
    }

    /// The wire representation broadcast to clients.
    pub fn view(&self) -> CharacterView {
        CharacterView {
            id: self.id,
            user_id: self.user_id,
            session_id: self.session_id,
            name: self.name.clone(),
            row: self.position.row,
            col: self.position.col,
            basic_properties: self.base,
            defeated: self.defeated,
            avatar_id: self.avatar_id,
            properties: vec![
                DisplayProperty {
                    name: "health".into(),
                    value: self.health,
                    max: self.derived.max_health,
                },
                DisplayProperty {
                    name: "mana".into(),
                    value: self.mana,
                    max: self.derived.max_mana,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Character {
        Character::create(
            CharacterId(1),
            NewCharacter {
                user_id: UserId(1),
                session_id: SessionId(1),
                name: "Brynn".into(),
                avatar_id: None,
                position: Position::new(1, 1),
                base: BaseAttributes::default(),
            },
        )
    }

    #[test]
    fn test_create_starts_at_full_pools() {
        let c = sample();
        assert_eq!(c.health, c.derived.max_health);
        assert_eq!(c.mana, c.derived.max_mana);
        assert!(!c.defeated);
    }

    #[test]
    fn test_apply_damage_floors_at_zero_and_defeats() {
        let mut c = sample();
        assert!(!c.apply_damage(30));
        assert_eq!(c.health, 70);

        // Overkill floors at zero and flips the flag exactly once.
        assert!(c.apply_damage(1000));
        assert_eq!(c.health, 0);
        assert!(c.defeated);
        assert!(!c.apply_damage(10), "already defeated, no second flip");
    }

    #[test]
    fn test_revive_half_restores_half_rounded_up() {
        let mut c = sample();
        c.apply_damage(1000);
        c.revive(RevivePolicy::Half);
        assert!(!c.defeated);
        assert_eq!(c.health, 50);
    }

    #[test]
    fn test_revive_full_restores_max() {
        let mut c = sample();
        c.apply_damage(1000);
        c.revive(RevivePolicy::Full);
        assert_eq!(c.health, c.derived.max_health);
    }

    #[test]
    fn test_revive_leaves_mana_alone() {
        let mut c = sample();
        c.spend_mana(40);
        c.apply_damage(1000);
        c.revive(RevivePolicy::Half);
        assert_eq!(c.mana, 60);
    }

    #[test]
    fn test_restored_health_odd_max_rounds_up() {
        assert_eq!(RevivePolicy::Half.restored_health(55), 28);
        assert_eq!(RevivePolicy::Half.restored_health(1), 1);
        assert_eq!(RevivePolicy::Full.restored_health(55), 55);
    }

    #[test]
    fn test_view_exposes_display_properties() {
        let mut c = sample();
        c.apply_damage(30);
        let view = c.view();
        assert_eq!(view.properties[0].name, "health");
        assert_eq!(view.properties[0].value, 70);
        assert_eq!(view.properties[0].max, 100);
        assert_eq!(view.properties[1].name, "mana");
        assert_eq!(view.row, 1);
        assert_eq!(view.col, 1);
    }
}
