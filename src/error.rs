//! Error types for GAN graph construction.

use thiserror::Error;

/// Errors surfaced while assembling generator/discriminator graphs.
///
/// Graph construction is deterministic: every variant is fatal and none of
/// them is retryable.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration rejected before any layer is built.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An input batch disagrees with the configured shapes.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A stored parameter was reused under an incompatible shape.
    #[error("shape mismatch for parameter `{name}`: requested {requested:?}, stored {stored:?}")]
    ShapeMismatch {
        /// Fully qualified parameter name (scope + layer).
        name: String,
        /// Shape requested by the current invocation.
        requested: Vec<usize>,
        /// Shape of the tensor already held by the store.
        stored: Vec<usize>,
    },

    /// A build path that exists in the API surface but has not been built.
    #[error("not implemented: {0}")]
    Unimplemented(&'static str),

    /// Shape error bubbled up from the numeric backend.
    #[error("backend shape error: {0}")]
    Backend(#[from] ndarray::ShapeError),
}

/// Result type for GAN operations.
pub type Result<T> = std::result::Result<T, Error>;
