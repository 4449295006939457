use thiserror::Error;

/// Precondition violations raised by pipeline steps.
///
/// Steps return `anyhow::Result`, so these are wrapped into `anyhow::Error`
/// on the way out. Callers that need to tell them apart can use
/// `err.downcast_ref::<PipelineError>()`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// A step needed a key the sample does not carry.
    #[error("{step}: sample has no `{key}`")]
    MissingKey {
        step: &'static str,
        key: &'static str,
    },

    /// Boxes must be an N x 4 array of `[x1, y1, x2, y2]`.
    #[error("{step}: boxes must have 4 columns [x1, y1, x2, y2] (got {cols})")]
    InvalidBoxes { step: &'static str, cols: usize },

    #[error("Image dimensions must be positive (got {width}x{height})")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Unknown flip axis code {0} (expected 1, 0 or -1)")]
    UnknownFlipAxis(i32),
}
