//! Tiled linear and rank-order filtering.
//!
//! Both entry points share one pipeline: validate, pad the input by half a
//! kernel, plan output tiles, run one worker per tile on a local pool, then
//! finalize. Workers read the padded input and write to disjoint rows of the
//! output, so no locking is needed.

mod dense;
mod finalize;
mod kernel;
mod options;
mod ops;
mod rank;
mod separability;
mod separable_filter;
mod stage;

/// Filter kernels
pub mod kernels;

pub use finalize::{suppress_border, to_display_u8};
pub use kernel::{InclusionKernel, Kernel2d, Stride, Tap};
pub use options::FilterOptions;
pub use ops::*;
pub use rank::RankMode;
pub use separability::{factorize, SeparableKernel, SEPARABILITY_TOLERANCE};
