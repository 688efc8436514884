use tessera_image::ImageSize;

use crate::error::FilterError;

/// Default tile edge length for linear filtering.
pub const DEFAULT_LINEAR_TILE_SIZE: usize = 1024;

/// Default tile edge length for rank filtering.
///
/// Smaller than the linear default because median/quantile tiles keep a
/// scratch value per tap.
pub const DEFAULT_RANK_TILE_SIZE: usize = 256;

/// A rectangular region of the output coordinate space.
///
/// Ranges are half-open: rows `row_start..row_end`, columns `col_start..col_end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    /// First output row of the tile.
    pub row_start: usize,
    /// One past the last output row of the tile.
    pub row_end: usize,
    /// First output column of the tile.
    pub col_start: usize,
    /// One past the last output column of the tile.
    pub col_end: usize,
}

impl Tile {
    /// Number of output rows in the tile.
    pub fn height(&self) -> usize {
        self.row_end - self.row_start
    }

    /// Number of output columns in the tile.
    pub fn width(&self) -> usize {
        self.col_end - self.col_start
    }

    /// Whether the output row `row` belongs to the tile.
    pub fn contains_row(&self, row: usize) -> bool {
        self.row_start <= row && row < self.row_end
    }
}

/// Partition an output of the given size into a grid of tiles.
///
/// Tiles are emitted band by band (top to bottom) and, within a band, left
/// to right. Boundary tiles are clipped to the output extent, so the tiles
/// are disjoint and their union is the whole output.
///
/// # Arguments
///
/// * `out_size` - The size of the output image.
/// * `tile_size` - The edge length of a full tile.
///
/// # Errors
///
/// Returns [`FilterError::InvalidTileSize`] if `tile_size` is zero.
///
/// # Example
///
/// ```
/// use tessera_imgproc::tiling::plan_tiles;
///
/// let tiles = plan_tiles([5, 3].into(), 2).unwrap();
/// assert_eq!(tiles.len(), 6);
/// assert_eq!(tiles[5].col_end, 5);
/// ```
pub fn plan_tiles(out_size: ImageSize, tile_size: usize) -> Result<Vec<Tile>, FilterError> {
    if tile_size == 0 {
        return Err(FilterError::InvalidTileSize);
    }

    let mut tiles = Vec::with_capacity(
        out_size.height.div_ceil(tile_size) * out_size.width.div_ceil(tile_size),
    );
    for row_start in (0..out_size.height).step_by(tile_size) {
        let row_end = (row_start + tile_size).min(out_size.height);
        for col_start in (0..out_size.width).step_by(tile_size) {
            let col_end = (col_start + tile_size).min(out_size.width);
            tiles.push(Tile {
                row_start,
                row_end,
                col_start,
                col_end,
            });
        }
    }

    Ok(tiles)
}

/// Size the worker pool.
///
/// At least one execution unit is always left to the caller, and the pool
/// never drops below a single worker.
///
/// # Arguments
///
/// * `available` - Parallel execution units on the machine.
/// * `reserved` - Units requested to stay free (treated as at least one).
pub fn worker_count(available: usize, reserved: usize) -> usize {
    available.saturating_sub(reserved.max(1)).max(1)
}
