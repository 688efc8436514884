use tessera_image::{ElementType, ImageError};

use crate::parallel::ParallelError;

/// Errors raised by the filter engine.
///
/// Configuration errors are detected before any buffer is staged. Resource
/// errors come from the worker pool and are surfaced once every tile has
/// been joined; no partial result is returned alongside them.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// The kernel has an even number of rows or columns (including zero).
    #[error("kernel dimensions must be odd, got {rows}x{cols}")]
    EvenKernelDimensions {
        /// Number of kernel rows.
        rows: usize,
        /// Number of kernel columns.
        cols: usize,
    },

    /// A kernel row has a different length than the first row.
    #[error("kernel row {row} has {got} cells, expected {expected}")]
    RaggedKernel {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        got: usize,
    },

    /// The kernel data length does not match its declared shape.
    #[error("kernel data has {got} weights, expected {expected}")]
    InvalidKernelLength {
        /// rows * cols of the declared shape.
        expected: usize,
        /// Length of the provided data.
        got: usize,
    },

    /// A stride component is zero.
    #[error("stride must be >= 1 on both axes, got ({0}, {1})")]
    InvalidStride(usize, usize),

    /// The image element type cannot be filtered.
    #[error("unsupported image element type {0}, expected u8 or f32")]
    UnsupportedElementType(ElementType),

    /// A linear kernel weight is NaN or infinite.
    #[error("kernel weight at ({row}, {col}) is not finite")]
    NonFiniteWeight {
        /// Kernel row of the weight.
        row: usize,
        /// Kernel column of the weight.
        col: usize,
    },

    /// An included rank kernel cell does not carry a finite weight.
    #[error("rank kernel entry at ({row}, {col}) must be a finite weight or excluded")]
    MalformedRankEntry {
        /// Kernel row of the entry.
        row: usize,
        /// Kernel column of the entry.
        col: usize,
    },

    /// No kernel of the requested size exists for this kernel family.
    #[error("unsupported kernel size {0}")]
    UnsupportedKernelSize(usize),

    /// The tile edge length is zero.
    #[error("tile size must be > 0")]
    InvalidTileSize,

    /// A worker received an output view that does not match its tile.
    #[error("tile view has {got} rows, expected {expected}")]
    TileShapeMismatch {
        /// Rows in the tile.
        expected: usize,
        /// Rows in the view.
        got: usize,
    },

    /// A worker panicked while computing a tile.
    #[error("filter worker panicked: {0}")]
    WorkerPanicked(String),

    /// The worker pool could not be created.
    #[error(transparent)]
    Parallel(#[from] ParallelError),

    /// An image buffer could not be built.
    #[error(transparent)]
    Image(#[from] ImageError),
}
