use crate::error::FilterError;
use crate::parallel::ExecutionStrategy;

/// Tunables of a filter call.
///
/// The defaults match [`apply_linear_filter`](super::apply_linear_filter) and
/// [`apply_rank_filter`](super::apply_rank_filter).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterOptions {
    /// Tile edge length. `None` picks the default of the filter family.
    pub tile_size: Option<usize>,
    /// Execution units kept free for the caller when sizing the pool.
    pub reserved_workers: usize,
    /// How tiles are scheduled.
    pub strategy: ExecutionStrategy,
    /// Use the separable path for kernels that factor into two 1-D kernels.
    pub allow_separable: bool,
    /// Zero the outer half-kernel rows and columns of linear filter outputs.
    pub suppress_border: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            tile_size: None,
            reserved_workers: 1,
            strategy: ExecutionStrategy::Auto,
            allow_separable: true,
            suppress_border: true,
        }
    }
}

impl FilterOptions {
    /// Options that run every tile on the calling thread.
    pub fn serial() -> Self {
        Self {
            strategy: ExecutionStrategy::Serial,
            ..Default::default()
        }
    }

    /// Set the tile edge length.
    pub fn with_tile_size(mut self, tile_size: usize) -> Self {
        self.tile_size = Some(tile_size);
        self
    }

    /// Set the execution strategy.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub(crate) fn resolve_tile_size(&self, default: usize) -> Result<usize, FilterError> {
        match self.tile_size {
            Some(0) => Err(FilterError::InvalidTileSize),
            Some(size) => Ok(size),
            None => Ok(default),
        }
    }
}
