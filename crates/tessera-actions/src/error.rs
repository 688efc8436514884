use tessera_image::ImageError;
use tessera_imgproc::FilterError;

/// Errors raised while applying filter actions.
#[derive(thiserror::Error, Debug)]
pub enum ActionError {
    /// The filter engine rejected or failed a call.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// An image buffer could not be built.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// A definition or project document is not valid JSON for its type.
    #[error("failed to parse filter document: {0}")]
    Json(#[from] serde_json::Error),

    /// The grid of a definition does not match its declared size.
    #[error("filter grid is {got:?} but settings declare {expected:?}")]
    GridShapeMismatch {
        /// `[rows, cols]` from the settings.
        expected: [usize; 2],
        /// `[rows, cols]` of the grid.
        got: [usize; 2],
    },

    /// A queue entry names a preset that is not registered.
    #[error("unknown filter preset '{0}'")]
    UnknownPreset(String),

    /// The run was cancelled before it finished.
    #[error("filter queue cancelled")]
    Cancelled,
}
