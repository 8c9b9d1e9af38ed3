//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backing data is not a valid registry image.
    #[error("storage corrupted: {0}")]
    Corrupted(String),

    /// A record was written under a key that does not exist.
    #[error("key not found: {path}")]
    KeyNotFound {
        /// Normalized key path.
        path: String,
    },

    /// A key path, record name or string value does not fit the image format.
    #[error("{what} is {len} bytes, limit is {max}")]
    TooLong {
        /// What was too long.
        what: &'static str,
        /// Length in bytes.
        len: usize,
        /// Largest accepted length in bytes.
        max: usize,
    },

    /// The backing file is locked by another handle.
    #[error("{} is locked by another process", path.display())]
    Locked {
        /// The backing file.
        path: PathBuf,
    },

    /// Import or export was requested before a system name was set.
    #[error("store has no system name")]
    NoSystemName,

    /// The backing file could not be replaced.
    #[error("failed to replace {path}: {source}")]
    Replace {
        /// The backing file that was being written.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
}

impl StorageError {
    /// Creates a corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted(message.into())
    }

    /// Creates a too-long error.
    pub fn too_long(what: &'static str, len: usize, max: usize) -> Self {
        Self::TooLong { what, len, max }
    }

    /// Creates a key not found error.
    pub fn key_not_found(path: impl Into<String>) -> Self {
        Self::KeyNotFound { path: path.into() }
    }
}
