//! In-memory store for testing.

use crate::error::{StorageError, StorageResult};
use crate::format::{decode_tree, encode_tree};
use crate::store::KeyValueStore;
use crate::tree::{KeyTree, RecordValue};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A shared in-memory medium holding exported images by system name.
///
/// Cloning a medium yields another handle to the same images, so stores
/// created from one medium see each other's exports the way files on one
/// disk would.
#[derive(Debug, Clone, Default)]
pub struct MemoryMedium {
    images: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
}

impl MemoryMedium {
    /// Creates an empty medium.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if an image was exported under `name`.
    #[must_use]
    pub fn contains(&self, name: &Path) -> bool {
        self.images.read().contains_key(name)
    }

    /// Returns a copy of the image exported under `name`.
    #[must_use]
    pub fn image(&self, name: &Path) -> Option<Vec<u8>> {
        self.images.read().get(name).cloned()
    }

    /// Stores raw bytes under `name`.
    ///
    /// Useful for testing corrupted images.
    pub fn put_image(&self, name: &Path, data: Vec<u8>) {
        self.images.write().insert(name.to_path_buf(), data);
    }
}

/// An in-memory key-value store.
///
/// Exports go to a [`MemoryMedium`] instead of a file.
///
/// # Example
///
/// ```rust
/// use d3data_storage::{InMemoryStore, KeyValueStore, RecordValue};
///
/// let mut store = InMemoryStore::named("registry");
/// store.create_key("Version").unwrap();
/// store.create_record("Version", "Build", RecordValue::Dword(7)).unwrap();
/// assert_eq!(store.data_size("Version", "Build"), 4);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    medium: MemoryMedium,
    name: PathBuf,
    tree: KeyTree,
}

impl InMemoryStore {
    /// Creates an empty, unnamed store on a fresh medium.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with a system name on a fresh medium.
    #[must_use]
    pub fn named(name: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates an empty store with a system name on an existing medium.
    #[must_use]
    pub fn on_medium(medium: MemoryMedium, name: impl Into<PathBuf>) -> Self {
        Self {
            medium,
            name: name.into(),
            tree: KeyTree::new(),
        }
    }

    /// Returns the medium backing this store.
    #[must_use]
    pub fn medium(&self) -> &MemoryMedium {
        &self.medium
    }

    fn require_name(&self) -> StorageResult<&Path> {
        if self.name.as_os_str().is_empty() {
            return Err(StorageError::NoSystemName);
        }
        Ok(&self.name)
    }
}

impl KeyValueStore for InMemoryStore {
    fn create_key(&mut self, path: &str) -> StorageResult<()> {
        self.tree.create_key(path)
    }

    fn lookup_key(&self, path: &str) -> bool {
        self.tree.contains_key(path)
    }

    fn create_record(&mut self, key: &str, name: &str, value: RecordValue) -> StorageResult<()> {
        self.tree.set_record(key, name, value)
    }

    fn lookup_record(&self, key: &str, name: &str) -> Option<RecordValue> {
        self.tree.record(key, name).cloned()
    }

    fn data_size(&self, key: &str, name: &str) -> usize {
        self.tree.record(key, name).map_or(0, RecordValue::data_size)
    }

    fn import(&mut self) -> StorageResult<()> {
        let name = self.require_name()?;
        self.tree = match self.medium.image(name) {
            Some(image) => decode_tree(&image)?,
            None => KeyTree::new(),
        };
        Ok(())
    }

    fn export(&mut self) -> StorageResult<()> {
        let name = self.require_name()?.to_path_buf();
        self.medium.put_image(&name, encode_tree(&self.tree)?);
        Ok(())
    }

    fn system_name(&self) -> &Path {
        &self.name
    }

    fn set_system_name(&mut self, name: &Path) {
        self.name = name.to_path_buf();
    }

    fn new_instance(&self) -> Self {
        Self {
            medium: self.medium.clone(),
            name: PathBuf::new(),
            tree: KeyTree::new(),
        }
    }

    fn key_paths(&self) -> Vec<String> {
        self.tree.keys().map(str::to_string).collect()
    }

    fn records(&self, key: &str) -> Vec<(String, RecordValue)> {
        self.tree
            .records(key)
            .map(|(n, v)| (n.to_string(), v.clone()))
            .collect()
    }
}
