//! Key-value store trait definition.

use crate::error::StorageResult;
use crate::tree::RecordValue;
use std::path::Path;

/// An opaque hierarchical key-value store.
///
/// A store keeps its whole content in memory. [`import`](Self::import) loads
/// everything from the medium identified by the system name and
/// [`export`](Self::export) replaces the medium's content with everything in
/// memory. Nothing is written incrementally.
///
/// Keys are paths whose components are separated by `\` or `/`. The root key
/// (the empty path) always exists. Record operations name their key
/// explicitly; cursor handling belongs to the caller.
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing
/// - [`super::FileStore`] - For persistent storage
pub trait KeyValueStore: Send {
    /// Creates a key and any missing ancestors.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot record the key.
    fn create_key(&mut self, path: &str) -> StorageResult<()>;

    /// Returns true if the key exists.
    fn lookup_key(&self, path: &str) -> bool;

    /// Creates or overwrites the record `name` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` does not exist.
    fn create_record(&mut self, key: &str, name: &str, value: RecordValue) -> StorageResult<()>;

    /// Returns the record `name` under `key`, if any.
    fn lookup_record(&self, key: &str, name: &str) -> Option<RecordValue>;

    /// Returns the stored size of a record in bytes, or 0 if it does not exist.
    ///
    /// String sizes include the NUL terminator.
    fn data_size(&self, key: &str, name: &str) -> usize;

    /// Replaces the in-memory content with the content of the medium.
    ///
    /// A medium that does not exist yet imports as an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if no system name is set, the medium cannot be read
    /// or its content is corrupted.
    fn import(&mut self) -> StorageResult<()>;

    /// Replaces the content of the medium with the in-memory content.
    ///
    /// # Errors
    ///
    /// Returns an error if no system name is set or the medium cannot be
    /// written.
    fn export(&mut self) -> StorageResult<()>;

    /// Returns the name of the medium this store imports from and exports to.
    fn system_name(&self) -> &Path;

    /// Sets the name of the medium.
    fn set_system_name(&mut self, name: &Path);

    /// Creates an empty, unnamed store on the same kind of medium.
    ///
    /// Used to open an independent copy of an exported store.
    fn new_instance(&self) -> Self
    where
        Self: Sized;

    /// Returns every key path in path order, including the root.
    fn key_paths(&self) -> Vec<String>;

    /// Returns the records of `key` in name order.
    fn records(&self, key: &str) -> Vec<(String, RecordValue)>;
}
