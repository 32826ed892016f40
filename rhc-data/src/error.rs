//! Error type for dataset I/O.

use rhc_core::RhcError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataError>;

/// Errors raised while reading, writing or reshaping datasets.
#[derive(Debug, Error)]
pub enum DataError {
    /// Reading or writing the underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A field could not be converted.
    #[error("Parse error at line {line}, column {column}: {value:?}")]
    Parse {
        /// 1-based line in the input, skipped rows included.
        line: usize,
        /// 1-based column before any discarding.
        column: usize,
        value: String,
    },

    /// A row does not have the expected shape.
    #[error("Format error at line {line}: {message}")]
    Format { line: usize, message: String },

    #[error(transparent)]
    Core(#[from] RhcError),
}

impl DataError {
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }
}
