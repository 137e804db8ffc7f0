//! Dense per-tile community indexing.
//!
//! Interaction kernels size their counter arrays by the number of occupied
//! communities in a tile, not by the tile's full cell count. This index maps
//! an agent's current cell to a compact index in `[0, len)`. It is rebuilt
//! once per tile per kernel invocation because commuting and travel change
//! which cells are occupied.

use crate::agents::store::Tile;
use crate::geom::TileBox;

pub struct CommunityIndex {
    bx: TileBox,
    /// Dense index per cell of the tile box, `-1` for unoccupied cells.
    index: Vec<i32>,
    len: usize,
}

impl CommunityIndex {
    /// Enumerates the occupied cells of `tile` in raster order, so the index
    /// assignment is independent of agent storage order.
    #[must_use]
    pub fn build(tile: &Tile) -> Self {
        let bx = tile.bx;
        let mut index = vec![-1i32; bx.num_cells()];
        for k in 0..tile.len() {
            index[bx.cell_offset(tile.pos_i[k], tile.pos_j[k])] = 0;
        }
        let mut next = 0i32;
        for slot in &mut index {
            if *slot == 0 {
                *slot = next;
                next += 1;
            } else {
                *slot = -1;
            }
        }
        CommunityIndex {
            bx,
            index,
            len: next as usize,
        }
    }

    /// Number of occupied communities in the tile.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Dense index of the community containing agent `idx` of `tile`.
    #[must_use]
    pub fn of_agent(&self, tile: &Tile, idx: usize) -> usize {
        let slot = self.index[self.bx.cell_offset(tile.pos_i[idx], tile.pos_j[idx])];
        debug_assert!(slot >= 0);
        slot as usize
    }
}
