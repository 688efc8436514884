#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// user-authored filter definitions.
pub mod definition;

/// mapping of definitions onto the filter engine.
pub mod dispatch;

/// Error types for the action layer.
pub mod error;

/// presets, project files and the filter queue.
pub mod queue;

pub use crate::definition::{FilterCell, FilterDefinition, FilterKind, FilterSettings};
pub use crate::dispatch::{apply_filter, rank_mode};
pub use crate::error::ActionError;
pub use crate::queue::{FilterQueue, PresetRegistry, ProjectFile, QueueEntry};
