#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color reductions used by the filter engine.
pub mod color;

/// Error types for the filter engine.
pub mod error;

/// image filtering module.
pub mod filter;

/// image border padding module.
pub mod padding;

/// module containing parallization utilities.
pub mod parallel;

/// output tile planning and pool sizing.
pub mod tiling;

pub use crate::error::FilterError;
