//! The Movement Validator and the tile model.

use serde::{Deserialize, Serialize};

use crate::ActionError;

/// A board position. Rows and columns are zero-based and bounded by the
/// session's map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u32,
    pub col: u32,
}

impl Position {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// One cell of a tile map, as reported by the map collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    /// Impassable: characters can neither be placed here nor move here.
    pub obstacle: bool,
    /// Environmental damage applied once to any character entering the
    /// tile. Zero for ordinary ground.
    pub hazard_damage: u32,
}

/// Chebyshev distance: the number of king moves between two positions.
///
/// Diagonal steps count the same as orthogonal ones, so "range 1" means
/// the 8 surrounding tiles. Used for both movement and attack range.
pub fn chebyshev(a: Position, b: Position) -> u32 {
    a.row.abs_diff(b.row).max(a.col.abs_diff(b.col))
}

/// Validates a proposed move.
///
/// Checks in a fixed, observable order:
/// 1. distance: `chebyshev(from, to)` must not exceed `speed`, else
///    [`ActionError::BigDist`];
/// 2. obstacle: the destination tile must exist (`None` means out of
///    bounds) and not be impassable, else [`ActionError::TileObstacle`].
///
/// When both rules are violated the reported error is `BigDist`; callers
/// and clients rely on that precedence.
pub fn validate_move(
    from: Position,
    to: Position,
    speed: u32,
    tile: Option<Tile>,
) -> Result<(), ActionError> {
    if chebyshev(from, to) > speed {
        return Err(ActionError::BigDist);
    }
    validate_placement(tile)
}

/// The obstacle rule alone, used for character creation: a new character
/// must land on an existing, passable tile, but no distance applies.
pub fn validate_placement(tile: Option<Tile>) -> Result<(), ActionError> {
    match tile {
        Some(t) if !t.obstacle => Ok(()),
        _ => Err(ActionError::TileObstacle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUND: Option<Tile> = Some(Tile {
        obstacle: false,
        hazard_damage: 0,
    });
    const WALL: Option<Tile> = Some(Tile {
        obstacle: true,
        hazard_damage: 0,
    });

    fn p(row: u32, col: u32) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn test_chebyshev_diagonal_counts_once() {
        assert_eq!(chebyshev(p(0, 0), p(3, 3)), 3);
        assert_eq!(chebyshev(p(0, 0), p(3, 1)), 3);
        assert_eq!(chebyshev(p(5, 5), p(5, 5)), 0);
        assert_eq!(chebyshev(p(2, 7), p(0, 7)), 2);
    }

    #[test]
    fn test_validate_move_within_speed_on_ground_ok() {
        assert_eq!(validate_move(p(1, 1), p(4, 2), 5, GROUND), Ok(()));
    }

    #[test]
    fn test_validate_move_beyond_speed_fails_big_dist() {
        let result = validate_move(p(1, 1), p(1, 21), 5, GROUND);
        assert_eq!(result, Err(ActionError::BigDist));
    }

    #[test]
    fn test_validate_move_onto_obstacle_fails_tile_obstacle() {
        let result = validate_move(p(1, 1), p(1, 2), 5, WALL);
        assert_eq!(result, Err(ActionError::TileObstacle));
    }

    #[test]
    fn test_distance_checked_before_obstacle() {
        // A far-away wall reports BigDist, never TileObstacle.
        let result = validate_move(p(0, 0), p(0, 20), 5, WALL);
        assert_eq!(result, Err(ActionError::BigDist));
    }

    #[test]
    fn test_validate_move_off_map_fails_tile_obstacle() {
        assert_eq!(validate_move(p(0, 0), p(0, 1), 5, None), Err(ActionError::TileObstacle));
    }

    #[test]
    fn test_validate_placement_ignores_distance() {
        assert_eq!(validate_placement(GROUND), Ok(()));
        assert_eq!(validate_placement(WALL), Err(ActionError::TileObstacle));
        assert_eq!(validate_placement(None), Err(ActionError::TileObstacle));
    }
}
