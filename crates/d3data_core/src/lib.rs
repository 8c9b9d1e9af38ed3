//! # d3data Core
//!
//! Platform data services for a game runtime.
//!
//! This crate provides:
//! - Single-instance lock files with stale-owner reclamation
//! - Directory enumeration and temporary file naming
//! - Preference and executable directory resolution
//! - A typed registry over a [`d3data_storage::KeyValueStore`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use d3data_core::{AppDatabase, LockCoordinator};
//! use std::path::Path;
//!
//! let dir = Path::new("/tmp/d3");
//! let locks = LockCoordinator::new();
//! if !locks.acquire_lock(dir) {
//!     eprintln!("another instance is running");
//!     return;
//! }
//!
//! let mut db = AppDatabase::open("Outrage", "Descent 3").unwrap();
//! db.write_integer("LastRun", 1).unwrap();
//! db.close().unwrap();
//! locks.release_lock(dir);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod lock;
mod paths;
mod process;
mod registry;
mod user;

pub use config::{
    Config, DEFAULT_APP, DEFAULT_ORG, LOCK_FILE_NAME, REGISTRY_FILE_NAME, TEMP_NAME_ATTEMPTS,
    TEMP_NAME_RANDOM_LEN,
};
pub use error::{CoreError, CoreResult};
pub use lock::{
    acquire_lock, release_lock, LockCoordinator, LockGuard, LockOutcome, LockState,
    ReleaseOutcome,
};
pub use paths::{
    collect_matching_files, enumerate_matching_files, executable_base_directory,
    generate_temp_file_name, generate_temp_file_name_for, generate_temp_file_name_with,
    glob_to_regex, writable_preference_directory, DirectoryResolver, FilePattern, OsDirectories,
    TEMP_EXTENSION,
};
pub use process::{ProcessProbe, SystemProbe};
pub use registry::{AppDatabase, KeyScope, NO_PREFERENCE_DIR_EXIT_CODE, VERSION_KEY};
pub use user::{current_user_name, UNKNOWN_USER};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
