//! The typed rule failures.

/// Every way a player action can be rejected by the game rules.
///
/// Each variant maps to a stable machine-readable reason code that rides
/// in the error envelope's `reason` field, so clients can branch on the
/// code while showing the human message. These are *expected* failures:
/// they are sent back to the acting connection and never tear anything
/// down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// The destination (or the attack target) is farther than the
    /// character's speed/range allows.
    #[error("target is out of reach")]
    BigDist,

    /// The destination tile is impassable or outside the map.
    #[error("destination tile is blocked")]
    TileObstacle,

    /// The acting player does not hold the turn.
    #[error("it is not your turn")]
    NotYourTurn,

    /// The acting character is defeated and cannot move or attack.
    #[error("character is defeated")]
    IsDefeated,

    /// Not enough mana for a magic attack.
    #[error("not enough mana")]
    LowMana,

    /// The attack target is already defeated.
    #[error("opponent is already defeated")]
    OpponentIsDefeated,

    /// Revive was attempted on a character that is not defeated.
    #[error("character is not defeated")]
    IsNotDefeated,
}

impl ActionError {
    /// The wire reason code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BigDist => "big_dist",
            Self::TileObstacle => "tile_obstacle",
            Self::NotYourTurn => "not_your_turn",
            Self::IsDefeated => "is_defeated",
            Self::LowMana => "low_mana",
            Self::OpponentIsDefeated => "opponent_is_defeated",
            Self::IsNotDefeated => "is_not_defeated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        // These strings are part of the client protocol.
        assert_eq!(ActionError::BigDist.code(), "big_dist");
        assert_eq!(ActionError::TileObstacle.code(), "tile_obstacle");
        assert_eq!(ActionError::NotYourTurn.code(), "not_your_turn");
        assert_eq!(ActionError::IsDefeated.code(), "is_defeated");
        assert_eq!(ActionError::LowMana.code(), "low_mana");
        assert_eq!(ActionError::OpponentIsDefeated.code(), "opponent_is_defeated");
        assert_eq!(ActionError::IsNotDefeated.code(), "is_not_defeated");
    }
}
