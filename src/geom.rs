//! The simulation domain: a rectangle of integer cells (communities),
//! decomposed into rectangular tiles. Each tile is owned by exactly one
//! worker during a kernel pass; agents move between tiles only through
//! [`crate::agents::AgentStore::redistribute`].

use crate::error::EpigridError;

/// A rectangular box of cells. `lo` bounds are inclusive, `hi` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBox {
    pub i_lo: i32,
    pub j_lo: i32,
    pub i_hi: i32,
    pub j_hi: i32,
}

impl TileBox {
    #[must_use]
    pub fn contains(&self, i: i32, j: i32) -> bool {
        i >= self.i_lo && i < self.i_hi && j >= self.j_lo && j < self.j_hi
    }

    #[must_use]
    pub fn num_cells(&self) -> usize {
        ((self.i_hi - self.i_lo) * (self.j_hi - self.j_lo)) as usize
    }

    /// Raster offset of a cell within this box.
    #[must_use]
    pub fn cell_offset(&self, i: i32, j: i32) -> usize {
        debug_assert!(self.contains(i, j));
        let w = self.i_hi - self.i_lo;
        ((j - self.j_lo) * w + (i - self.i_lo)) as usize
    }
}

/// The full cell grid plus its tile decomposition.
#[derive(Debug, Clone, Copy)]
pub struct Domain {
    nx: i32,
    ny: i32,
    tile_size: i32,
    tiles_x: i32,
    tiles_y: i32,
}

impl Domain {
    /// Builds a `nx` x `ny` grid cut into square tiles of `tile_size` cells
    /// on a side (boundary tiles may be smaller).
    pub fn new(nx: i32, ny: i32, tile_size: i32) -> Result<Self, EpigridError> {
        if nx <= 0 || ny <= 0 {
            return Err(EpigridError::BadConfig(format!(
                "domain extents must be positive, got {nx} x {ny}"
            )));
        }
        if tile_size <= 0 {
            return Err(EpigridError::BadConfig(format!(
                "tile size must be positive, got {tile_size}"
            )));
        }
        Ok(Domain {
            nx,
            ny,
            tile_size,
            tiles_x: (nx + tile_size - 1) / tile_size,
            tiles_y: (ny + tile_size - 1) / tile_size,
        })
    }

    #[must_use]
    pub fn extent(&self) -> (i32, i32) {
        (self.nx, self.ny)
    }

    #[must_use]
    pub fn num_cells(&self) -> usize {
        (self.nx * self.ny) as usize
    }

    #[must_use]
    pub fn num_tiles(&self) -> usize {
        (self.tiles_x * self.tiles_y) as usize
    }

    #[must_use]
    pub fn contains(&self, i: i32, j: i32) -> bool {
        i >= 0 && i < self.nx && j >= 0 && j < self.ny
    }

    /// Global raster index of a cell, used by the statistics grids.
    #[must_use]
    pub fn cell_index(&self, i: i32, j: i32) -> usize {
        debug_assert!(self.contains(i, j));
        (j * self.nx + i) as usize
    }

    /// Index of the tile owning a cell.
    #[must_use]
    pub fn tile_of_cell(&self, i: i32, j: i32) -> usize {
        debug_assert!(self.contains(i, j));
        let ti = i / self.tile_size;
        let tj = j / self.tile_size;
        (tj * self.tiles_x + ti) as usize
    }

    /// The cell box of tile `t`.
    #[must_use]
    pub fn tile_box(&self, t: usize) -> TileBox {
        debug_assert!(t < self.num_tiles());
        let ti = (t as i32) % self.tiles_x;
        let tj = (t as i32) / self.tiles_x;
        let i_lo = ti * self.tile_size;
        let j_lo = tj * self.tile_size;
        TileBox {
            i_lo,
            j_lo,
            i_hi: (i_lo + self.tile_size).min(self.nx),
            j_hi: (j_lo + self.tile_size).min(self.ny),
        }
    }
}
