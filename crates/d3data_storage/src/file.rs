//! File-based store for persistent storage.

use crate::error::{StorageError, StorageResult};
use crate::format::{decode_tree, encode_tree};
use crate::store::KeyValueStore;
use crate::tree::{KeyTree, RecordValue};
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A file-backed key-value store.
///
/// The system name is the path of the backing file. The whole file is read
/// on [`import`](KeyValueStore::import) and replaced on
/// [`export`](KeyValueStore::export).
///
/// # Durability
///
/// Export holds an exclusive advisory lock on the backing file while it
/// writes a sibling `<name>.tmp`, syncs it and renames it over the backing
/// file. Import reads under a shared lock on the same file. Readers see
/// either the old or the new image.
///
/// # Example
///
/// ```no_run
/// use d3data_storage::{FileStore, KeyValueStore, RecordValue};
/// use std::path::Path;
///
/// let mut store = FileStore::open(Path::new(".Descent3Registry")).unwrap();
/// store.create_record("", "Detail", RecordValue::Dword(3)).unwrap();
/// store.export().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct FileStore {
    path: PathBuf,
    tree: KeyTree,
}

impl FileStore {
    /// Creates an empty store bound to `path` without reading it.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            tree: KeyTree::new(),
        }
    }

    /// Creates a store bound to `path` and imports it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let mut store = Self::new(path);
        store.import()?;
        Ok(store)
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn require_path(&self) -> StorageResult<&Path> {
        if self.path.as_os_str().is_empty() {
            return Err(StorageError::NoSystemName);
        }
        Ok(&self.path)
    }

    /// Writes `data` to the temp sibling of `path` and renames it into place.
    fn replace(path: &Path, data: &[u8]) -> StorageResult<()> {
        let temp_path = Self::temp_path(path);
        if let Err(e) = write_synced(&temp_path, data) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        fs::rename(&temp_path, path).map_err(|source| StorageError::Replace {
            path: path.to_path_buf(),
            source,
        })
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().map_or_else(OsString::new, OsString::from);
        name.push(".tmp");
        path.with_file_name(name)
    }
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

impl KeyValueStore for FileStore {
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
        let path = self.require_path()?;

        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "registry file missing, starting empty");
                self.tree = KeyTree::new();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        file.lock_shared()?;
        let mut data = Vec::new();
        let read = file.read_to_end(&mut data);
        file.unlock()?;
        read?;

        self.tree = if data.is_empty() {
            KeyTree::new()
        } else {
            decode_tree(&data)?
        };
        Ok(())
    }

    fn export(&mut self) -> StorageResult<()> {
        let path = self.require_path()?.to_path_buf();
        let data = encode_tree(&self.tree)?;

        let backing = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        if backing.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked { path });
        }

        let replaced = Self::replace(&path, &data);
        let unlocked = backing.unlock();
        replaced?;
        unlocked?;

        debug!(path = %path.display(), bytes = data.len(), "registry exported");
        Ok(())
    }

    fn system_name(&self) -> &Path {
        &self.path
    }

    fn set_system_name(&mut self, name: &Path) {
        self.path = name.to_path_buf();
    }

    fn new_instance(&self) -> Self {
        Self::default()
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
