//! Error type shared by every rhc crate.

use thiserror::Error;

/// Result alias used across the rhc workspace.
pub type Result<T> = std::result::Result<T, RhcError>;

/// Errors raised by vector, distance, linear-algebra and tree operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RhcError {
    /// Two vectors of different dimensionality were compared or combined.
    #[error("Rank mismatch: expected {expected}, actual {actual}")]
    RankMismatch {
        /// Rank of the reference vector.
        expected: usize,
        /// Rank of the offending vector.
        actual: usize,
    },

    /// A parameter is outside its valid domain.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// What is wrong with the parameter.
        message: String,
    },

    /// LU decomposition found no usable pivot in `column`.
    #[error("Singular matrix: no usable pivot in column {column}")]
    SingularMatrix {
        /// Column at which elimination broke down.
        column: usize,
    },

    /// A strategy name could not be resolved.
    #[error("Unsupported strategy: {0}")]
    UnsupportedStrategy(String),

    /// An operation that needs at least one element received none.
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),
}

impl RhcError {
    /// Create a RankMismatch error.
    pub fn rank_mismatch(expected: usize, actual: usize) -> Self {
        Self::RankMismatch { expected, actual }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }
}
