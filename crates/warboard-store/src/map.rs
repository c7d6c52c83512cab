//! The map collaborator interface and an in-memory grid implementation.

use std::future::Future;

use warboard_protocol::MapId;
use warboard_rules::Tile;

use crate::StoreError;

/// Tile lookup for the maps characters play on.
///
/// The engine asks for exactly one tile per validated operation (the
/// destination of a move, the placement of a new character), so a real
/// implementation can serve straight from a tileset file or a cache
/// without any bulk-loading protocol.
pub trait MapSource: Send + Sync + 'static {
    /// Returns the tile at `(row, col)` on the given map, or `Ok(None)`
    /// when the coordinates are outside the map (the movement validator
    /// treats that the same as an obstacle).
    fn tile(
        &self,
        map_id: MapId,
        row: u32,
        col: u32,
    ) -> impl Future<Output = Result<Option<Tile>, StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// GridMap
// ---------------------------------------------------------------------------

/// A dense rectangular tile map held in memory.
///
/// Starts as open ground; carve it with [`with_obstacle`](Self::with_obstacle)
/// and [`with_hazard`](Self::with_hazard):
///
/// ```rust
/// use warboard_protocol::MapId;
/// use warboard_store::GridMap;
///
/// let map = GridMap::new(MapId(1), 32, 32)
///     .with_obstacle(4, 4)
///     .with_hazard(10, 10, 15);
/// ```
#[derive(Debug, Clone)]
pub struct GridMap {
    id: MapId,
    rows: u32,
    cols: u32,
    tiles: Vec<Tile>,
}

impl GridMap {
    /// Creates an all-ground map of the given dimensions.
    pub fn new(id: MapId, rows: u32, cols: u32) -> Self {
        Self {
            id,
            rows,
            cols,
            tiles: vec![Tile::default(); (rows * cols) as usize],
        }
    }

    /// Marks a tile impassable.
    pub fn with_obstacle(mut self, row: u32, col: u32) -> Self {
        if let Some(tile) = self.tile_mut(row, col) {
            tile.obstacle = true;
        }
        self
    }

    /// Gives a tile environmental damage, applied once to any character
    /// entering it.
    pub fn with_hazard(mut self, row: u32, col: u32, damage: u32) -> Self {
        if let Some(tile) = self.tile_mut(row, col) {
            tile.hazard_damage = damage;
        }
        self
    }

    fn tile_mut(&mut self, row: u32, col: u32) -> Option<&mut Tile> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.tiles.get_mut((row * self.cols + col) as usize)
    }

    fn lookup(&self, map_id: MapId, row: u32, col: u32) -> Option<Tile> {
        if map_id != self.id || row >= self.rows || col >= self.cols {
            return None;
        }
        self.tiles.get((row * self.cols + col) as usize).copied()
    }
}

impl MapSource for GridMap {
    async fn tile(
        &self,
        map_id: MapId,
        row: u32,
        col: u32,
    ) -> Result<Option<Tile>, StoreError> {
        Ok(self.lookup(map_id, row, col))
    }
}
