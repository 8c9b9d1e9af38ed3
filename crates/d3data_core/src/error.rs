//! Error types for d3data core.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in d3data core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] d3data_storage::StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A lock record could not be written.
    #[error("lock record error: {0}")]
    Codec(#[from] d3data_codec::CodecError),

    /// The target of a lock or enumeration is not a directory.
    #[error("not a directory: {}", path.display())]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The lock file is too short or could not be read.
    #[error("lock file {} is truncated or corrupt: {source}", path.display())]
    TruncatedOrCorrupt {
        /// Path of the lock file.
        path: PathBuf,
        /// The decoding error.
        source: d3data_codec::CodecError,
    },

    /// A file named like a lock file does not carry the lock tag.
    #[error("{} is not a lock file", path.display())]
    NotALockFile {
        /// Path of the file.
        path: PathBuf,
    },

    /// The lock belongs to another process.
    #[error("lock {} is owned by process {owner_pid}", path.display())]
    OwnershipConflict {
        /// Path of the lock file.
        path: PathBuf,
        /// Process id recorded in the lock file.
        owner_pid: i32,
    },

    /// A key or record does not exist.
    #[error("not found: {what}")]
    NotFound {
        /// Description of what was looked up.
        what: String,
    },

    /// An integer read asked for a width other than 1, 2 or 4 bytes.
    #[error("unable to read {label}: unsupported width {width}")]
    UnsupportedWidth {
        /// The record label.
        label: String,
        /// The requested width in bytes.
        width: usize,
    },

    /// A record holds a different type than the read asked for.
    #[error("record {label} is not a {expected}")]
    TypeMismatch {
        /// The record label.
        label: String,
        /// The type the caller expected.
        expected: &'static str,
    },

    /// A value cannot be stored.
    #[error("invalid value: {message}")]
    InvalidValue {
        /// Why the value was rejected.
        message: String,
    },

    /// The database has no open store.
    #[error("database is not open")]
    NotOpen,

    /// A file name pattern could not be compiled.
    #[error("invalid file pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// An OS directory could not be resolved.
    #[error("{which} directory is unavailable")]
    DirectoryUnavailable {
        /// Which directory was requested.
        which: &'static str,
    },
}

impl CoreError {
    /// Creates a not-a-directory error.
    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Self::NotADirectory { path: path.into() }
    }

    /// Creates a not found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }

    /// Returns true if the error reports a missing key or record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
