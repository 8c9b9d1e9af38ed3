//! Error types for the codec crate.

use std::io;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The input ended before a complete record was read.
    #[error("truncated record: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Number of bytes a complete record needs.
        expected: usize,
        /// Number of bytes actually available.
        actual: usize,
    },

    /// Reading from or writing to the underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    /// Create a truncated record error.
    pub fn truncated(expected: usize, actual: usize) -> Self {
        Self::Truncated { expected, actual }
    }
}
