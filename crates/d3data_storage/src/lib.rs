//! # d3data Storage
//!
//! The key-value store capability used by the d3data registry.
//!
//! A store is an **opaque hierarchical key-value database** that lives
//! entirely in memory between an [`import`](KeyValueStore::import) and an
//! [`export`](KeyValueStore::export). It knows nothing about typed reads,
//! cursors or lock files; the core crate layers those on top.
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing; exports to a shared [`MemoryMedium`]
//! - [`FileStore`] - For persistent storage in a single backing file
//!
//! ## Example
//!
//! ```rust
//! use d3data_storage::{InMemoryStore, KeyValueStore, RecordValue};
//!
//! let mut store = InMemoryStore::named("registry");
//! store.create_key("Version").unwrap();
//! store.create_record("Version", "Build", RecordValue::Dword(1)).unwrap();
//! store.export().unwrap();
//! assert!(store.medium().contains("registry".as_ref()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod format;
mod memory;
mod store;
mod tree;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use format::{decode_tree, encode_tree, REGISTRY_MAGIC, REGISTRY_VERSION};
pub use memory::{InMemoryStore, MemoryMedium};
pub use store::KeyValueStore;
pub use tree::{
    normalize_key_path, KeyTree, RecordType, RecordValue, KEY_SEPARATOR, MAX_NAME_LEN,
    MAX_STRING_LEN, ROOT_KEY,
};
