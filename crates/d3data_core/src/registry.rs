//! Typed application registry.
//!
//! [`AppDatabase`] layers typed reads and writes and a current-key cursor
//! over a [`KeyValueStore`]. The store is imported when the database opens
//! and exported when it closes or is dropped; nothing reaches disk in
//! between unless [`AppDatabase::export`] is called.
//!
//! Records are either strings or 32-bit integers. Integer reads narrow the
//! stored value to 1, 2 or 4 bytes.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::paths::{DirectoryResolver, OsDirectories};
use d3data_storage::{normalize_key_path, FileStore, KeyValueStore, RecordValue};
use tracing::{debug, error, warn};

/// Key created in every freshly opened registry.
pub const VERSION_KEY: &str = "Version";

/// Exit status used when [`AppDatabase::open`] finds no preference directory.
pub const NO_PREFERENCE_DIR_EXIT_CODE: i32 = 43;

/// A typed configuration database over a key-value store.
///
/// # Cursor
///
/// Reads and writes on the database target the *current key*. It starts at
/// [`VERSION_KEY`] after [`open_store`](Self::open_store) and at the root in
/// a child database, and moves with
/// [`create_record_path`](Self::create_record_path) and
/// [`select_record_path`](Self::select_record_path). For access that must
/// not depend on the cursor, use [`key`](Self::key).
///
/// # Example
///
/// ```rust
/// use d3data_core::AppDatabase;
/// use d3data_storage::InMemoryStore;
///
/// let mut db = AppDatabase::open_store(InMemoryStore::named("registry")).unwrap();
/// db.create_record_path("Settings\\Video").unwrap();
/// db.write_integer("Width", 640).unwrap();
/// assert_eq!(db.read_integer("Width", 4).unwrap(), 640);
/// ```
#[derive(Debug)]
pub struct AppDatabase<S: KeyValueStore = FileStore> {
    store: Option<S>,
    current_key: String,
}

impl AppDatabase<FileStore> {
    /// Opens the registry in the preference directory of `org`/`app`.
    ///
    /// Terminates the process with status 43 if the preference directory
    /// cannot be resolved, since no registry could ever be stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry file exists but cannot be imported.
    pub fn open(org: &str, app: &str) -> CoreResult<Self> {
        let config = Config::new().org(org).app(app);
        match Self::open_with(&config, &OsDirectories) {
            Err(CoreError::DirectoryUnavailable { .. }) => {
                error!(org, app, "couldn't find preference directory");
                std::process::exit(NO_PREFERENCE_DIR_EXIT_CODE);
            }
            result => result,
        }
    }

    /// Opens the registry named by `config` in the directory `resolver`
    /// reports.
    ///
    /// # Errors
    ///
    /// - [`CoreError::DirectoryUnavailable`] if there is no preference
    ///   directory
    /// - [`CoreError::Storage`] if the registry file cannot be imported
    pub fn open_with<R: DirectoryResolver>(config: &Config, resolver: &R) -> CoreResult<Self> {
        let dir = resolver
            .preference_dir(&config.org, &config.app)
            .ok_or(CoreError::DirectoryUnavailable {
                which: "preference",
            })?;
        let path = dir.join(&config.registry_file_name);
        debug!(path = %path.display(), "opening registry");
        Self::open_store(FileStore::new(&path))
    }
}

impl<S: KeyValueStore> AppDatabase<S> {
    /// Imports `store` and makes sure [`VERSION_KEY`] exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be imported.
    pub fn open_store(mut store: S) -> CoreResult<Self> {
        store.import()?;
        store.create_key(VERSION_KEY)?;
        Ok(Self {
            store: Some(store),
            current_key: normalize_key_path(VERSION_KEY),
        })
    }

    /// Opens an independent copy of `parent`.
    ///
    /// The parent is exported first; the child imports that image into a
    /// new store with the same system name. Later changes to either side
    /// are not seen by the other.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotOpen`] if `parent` is closed
    /// - [`CoreError::Storage`] if export or import fails
    pub fn open_child_of(parent: &mut Self) -> CoreResult<Self> {
        let parent_store = parent.store_mut("open child database")?;
        parent_store.export()?;

        let mut store = parent_store.new_instance();
        store.set_system_name(parent_store.system_name());
        store.import()?;

        Ok(Self {
            store: Some(store),
            current_key: String::new(),
        })
    }

    /// Returns true until the database is closed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    /// Returns the underlying store while open.
    #[must_use]
    pub fn store(&self) -> Option<&S> {
        self.store.as_ref()
    }

    /// Returns the normalized path of the current key.
    #[must_use]
    pub fn current_key(&self) -> &str {
        &self.current_key
    }

    /// Creates `path` and its ancestors and makes it the current key.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotOpen`] if the database is closed.
    pub fn create_record_path(&mut self, path: &str) -> CoreResult<()> {
        self.store_mut("create key")?.create_key(path)?;
        self.current_key = normalize_key_path(path);
        Ok(())
    }

    /// Makes an existing key the current key.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotOpen`] if the database is closed
    /// - [`CoreError::NotFound`] if the key does not exist
    pub fn select_record_path(&mut self, path: &str) -> CoreResult<()> {
        if !self.store_ref("look up key")?.lookup_key(path) {
            warn!(path, "key not found");
            return Err(CoreError::not_found(format!("key {path}")));
        }
        self.current_key = normalize_key_path(path);
        Ok(())
    }

    /// Returns a handle bound to the existing key `path`.
    ///
    /// The handle's reads and writes ignore and do not move the cursor.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotOpen`] if the database is closed
    /// - [`CoreError::NotFound`] if the key does not exist
    pub fn key(&mut self, path: &str) -> CoreResult<KeyScope<'_, S>> {
        let store = self.store_mut("open key")?;
        if !store.lookup_key(path) {
            return Err(CoreError::not_found(format!("key {path}")));
        }
        Ok(KeyScope {
            store,
            key: normalize_key_path(path),
        })
    }

    /// Reads a string record under the current key.
    ///
    /// Returns the value and its length in bytes, excluding the terminator.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotOpen`] if the database is closed
    /// - [`CoreError::NotFound`] if the record is absent
    /// - [`CoreError::TypeMismatch`] if the record is an integer
    pub fn read_string(&self, label: &str) -> CoreResult<(String, usize)> {
        read_string_at(self.store_ref("read record")?, &self.current_key, label)
    }

    /// Reads an integer record under the current key, narrowed to `width`
    /// bytes.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotOpen`] if the database is closed
    /// - [`CoreError::NotFound`] if the record is absent
    /// - [`CoreError::TypeMismatch`] if the record is a string
    /// - [`CoreError::UnsupportedWidth`] if `width` is not 1, 2 or 4
    pub fn read_integer(&self, label: &str, width: usize) -> CoreResult<u32> {
        read_integer_at(
            self.store_ref("read record")?,
            &self.current_key,
            label,
            width,
        )
    }

    /// Reads a one-byte integer record as a flag.
    ///
    /// # Errors
    ///
    /// Same as [`read_integer`](Self::read_integer).
    pub fn read_bool(&self, label: &str) -> CoreResult<bool> {
        Ok(self.read_integer(label, 1)? != 0)
    }

    /// Writes a string record under the current key.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotOpen`] if the database is closed
    /// - [`CoreError::InvalidValue`] if `value` contains NUL
    pub fn write_string(&mut self, label: &str, value: &str) -> CoreResult<()> {
        let key = self.current_key.clone();
        write_string_at(self.store_mut("write record")?, &key, label, value)
    }

    /// Writes an integer record under the current key.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotOpen`] if the database is closed.
    pub fn write_integer(&mut self, label: &str, value: i32) -> CoreResult<()> {
        let key = self.current_key.clone();
        write_integer_at(self.store_mut("write record")?, &key, label, value)
    }

    /// Writes a flag as an integer record under the current key.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotOpen`] if the database is closed.
    pub fn write_bool(&mut self, label: &str, value: bool) -> CoreResult<()> {
        self.write_integer(label, i32::from(value))
    }

    /// Returns the name of the user running this process, or `"Unknown"`.
    #[must_use]
    pub fn current_user_name(&self) -> String {
        crate::user::current_user_name()
    }

    /// Exports the in-memory state without closing.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotOpen`] if the database is closed
    /// - [`CoreError::Storage`] if the export fails
    pub fn export(&mut self) -> CoreResult<()> {
        self.store_mut("export")?.export()?;
        Ok(())
    }

    /// Exports the in-memory state and releases the store.
    ///
    /// The store is released even if the export fails.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotOpen`] if the database was already closed
    /// - [`CoreError::Storage`] if the export fails
    pub fn close(&mut self) -> CoreResult<()> {
        match self.store.take() {
            Some(mut store) => {
                store.export()?;
                Ok(())
            }
            None => {
                error!("can't export database since it's not there");
                Err(CoreError::NotOpen)
            }
        }
    }

    fn store_ref(&self, op: &str) -> CoreResult<&S> {
        self.store.as_ref().ok_or_else(|| {
            error!("can't {op} because database is not open");
            CoreError::NotOpen
        })
    }

    fn store_mut(&mut self, op: &str) -> CoreResult<&mut S> {
        self.store.as_mut().ok_or_else(|| {
            error!("can't {op} because database is not open");
            CoreError::NotOpen
        })
    }
}

impl<S: KeyValueStore> Drop for AppDatabase<S> {
    fn drop(&mut self) {
        if let Some(mut store) = self.store.take() {
            if let Err(e) = store.export() {
                error!(error = %e, "failed to export registry on drop");
            }
        }
    }
}

/// Typed access to one key of an open [`AppDatabase`].
#[derive(Debug)]
pub struct KeyScope<'a, S: KeyValueStore> {
    store: &'a mut S,
    key: String,
}

impl<S: KeyValueStore> KeyScope<'_, S> {
    /// Returns the normalized key path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.key
    }

    /// See [`AppDatabase::read_string`].
    ///
    /// # Errors
    ///
    /// Same as [`AppDatabase::read_string`].
    pub fn read_string(&self, label: &str) -> CoreResult<(String, usize)> {
        read_string_at(&*self.store, &self.key, label)
    }

    /// See [`AppDatabase::read_integer`].
    ///
    /// # Errors
    ///
    /// Same as [`AppDatabase::read_integer`].
    pub fn read_integer(&self, label: &str, width: usize) -> CoreResult<u32> {
        read_integer_at(&*self.store, &self.key, label, width)
    }

    /// See [`AppDatabase::read_bool`].
    ///
    /// # Errors
    ///
    /// Same as [`AppDatabase::read_bool`].
    pub fn read_bool(&self, label: &str) -> CoreResult<bool> {
        Ok(self.read_integer(label, 1)? != 0)
    }

    /// See [`AppDatabase::write_string`].
    ///
    /// # Errors
    ///
    /// Same as [`AppDatabase::write_string`].
    pub fn write_string(&mut self, label: &str, value: &str) -> CoreResult<()> {
        write_string_at(self.store, &self.key, label, value)
    }

    /// See [`AppDatabase::write_integer`].
    ///
    /// # Errors
    ///
    /// Same as [`AppDatabase::write_integer`].
    pub fn write_integer(&mut self, label: &str, value: i32) -> CoreResult<()> {
        write_integer_at(self.store, &self.key, label, value)
    }

    /// See [`AppDatabase::write_bool`].
    ///
    /// # Errors
    ///
    /// Same as [`AppDatabase::write_bool`].
    pub fn write_bool(&mut self, label: &str, value: bool) -> CoreResult<()> {
        self.write_integer(label, i32::from(value))
    }
}

fn record_not_found(key: &str, label: &str) -> CoreError {
    CoreError::not_found(format!("record {label} under key '{key}'"))
}

fn read_string_at<S: KeyValueStore>(
    store: &S,
    key: &str,
    label: &str,
) -> CoreResult<(String, usize)> {
    let size = store.data_size(key, label);
    if size == 0 {
        return Err(record_not_found(key, label));
    }

    match store.lookup_record(key, label) {
        Some(RecordValue::String(value)) => Ok((value, size - 1)),
        Some(RecordValue::Dword(_)) => Err(CoreError::TypeMismatch {
            label: label.to_string(),
            expected: "string",
        }),
        None => Err(record_not_found(key, label)),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn read_integer_at<S: KeyValueStore>(
    store: &S,
    key: &str,
    label: &str,
    width: usize,
) -> CoreResult<u32> {
    if store.data_size(key, label) == 0 {
        return Err(record_not_found(key, label));
    }

    let data = match store.lookup_record(key, label) {
        Some(RecordValue::Dword(value)) => value,
        Some(RecordValue::String(_)) => {
            return Err(CoreError::TypeMismatch {
                label: label.to_string(),
                expected: "dword",
            })
        }
        None => return Err(record_not_found(key, label)),
    };

    match width {
        1 => Ok(u32::from(data as u8)),
        2 => Ok(u32::from(data as u16)),
        4 => Ok(data),
        _ => {
            error!(label, width, "unable to read key, unsupported size");
            Err(CoreError::UnsupportedWidth {
                label: label.to_string(),
                width,
            })
        }
    }
}

fn write_string_at<S: KeyValueStore>(
    store: &mut S,
    key: &str,
    label: &str,
    value: &str,
) -> CoreResult<()> {
    if value.contains('\0') {
        return Err(CoreError::invalid_value(format!(
            "string for {label} contains NUL"
        )));
    }
    store.create_record(key, label, RecordValue::String(value.to_string()))?;
    Ok(())
}

#[allow(clippy::cast_sign_loss)]
fn write_integer_at<S: KeyValueStore>(
    store: &mut S,
    key: &str,
    label: &str,
    value: i32,
) -> CoreResult<()> {
    store.create_record(key, label, RecordValue::Dword(value as u32))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use d3data_storage::InMemoryStore;
    use proptest::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    fn open_memory() -> AppDatabase<InMemoryStore> {
        AppDatabase::open_store(InMemoryStore::named("registry")).unwrap()
    }

    struct FixedDirs(Option<PathBuf>);

    impl DirectoryResolver for FixedDirs {
        fn preference_dir(&self, _org: &str, _app: &str) -> Option<PathBuf> {
            self.0.clone()
        }

        fn executable_base_dir(&self) -> Option<PathBuf> {
            None
        }
    }

    #[test]
    fn open_creates_version_key() {
        let db = open_memory();
        assert!(db.store().unwrap().lookup_key(VERSION_KEY));
        assert_eq!(db.current_key(), VERSION_KEY);
    }

    #[test]
    fn integer_roundtrip() {
        let mut db = open_memory();
        db.write_integer("Foo", 42).unwrap();
        assert_eq!(db.read_integer("Foo", 4).unwrap(), 42);
    }

    #[test]
    fn missing_integer_is_not_found() {
        let db = open_memory();
        assert!(db.read_integer("Never", 4).unwrap_err().is_not_found());
    }

    #[test]
    fn integer_narrowing() {
        let mut db = open_memory();
        db.write_integer("Wide", 0x1234_5678).unwrap();

        assert_eq!(db.read_integer("Wide", 1).unwrap(), 0x78);
        assert_eq!(db.read_integer("Wide", 2).unwrap(), 0x5678);
        assert_eq!(db.read_integer("Wide", 4).unwrap(), 0x1234_5678);
    }

    #[test]
    fn negative_integer_keeps_bits() {
        let mut db = open_memory();
        db.write_integer("Neg", -2).unwrap();
        assert_eq!(db.read_integer("Neg", 4).unwrap() as i32, -2);
        assert_eq!(db.read_integer("Neg", 1).unwrap(), 0xFE);
    }

    #[test]
    fn unsupported_width_is_an_error() {
        let mut db = open_memory();
        db.write_integer("Foo", 1).unwrap();

        for width in [0, 3, 8] {
            assert!(matches!(
                db.read_integer("Foo", width),
                Err(CoreError::UnsupportedWidth { .. })
            ));
        }
    }

    #[test]
    fn string_roundtrip_reports_length() {
        let mut db = open_memory();
        db.write_string("Pilot", "Dravis").unwrap();
        assert_eq!(db.read_string("Pilot").unwrap(), ("Dravis".to_string(), 6));
    }

    #[test]
    fn empty_string_is_found() {
        let mut db = open_memory();
        db.write_string("Blank", "").unwrap();
        assert_eq!(db.read_string("Blank").unwrap(), (String::new(), 0));
    }

    #[test]
    fn string_with_nul_is_rejected() {
        let mut db = open_memory();
        assert!(matches!(
            db.write_string("Bad", "a\0b"),
            Err(CoreError::InvalidValue { .. })
        ));
        assert!(db.read_string("Bad").unwrap_err().is_not_found());
    }

    #[test]
    fn overlong_label_is_rejected() {
        let mut db = open_memory();
        let label = "x".repeat(70_000);

        assert!(matches!(
            db.write_integer(&label, 1),
            Err(CoreError::Storage(d3data_storage::StorageError::TooLong { .. }))
        ));
        assert!(matches!(
            db.create_record_path(&label),
            Err(CoreError::Storage(_))
        ));
        assert_eq!(db.current_key(), VERSION_KEY);
    }

    #[test]
    fn type_mismatch_is_reported() {
        let mut db = open_memory();
        db.write_string("Text", "x").unwrap();
        db.write_integer("Number", 5).unwrap();

        assert!(matches!(
            db.read_integer("Text", 4),
            Err(CoreError::TypeMismatch { .. })
        ));
        assert!(matches!(
            db.read_string("Number"),
            Err(CoreError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn bool_roundtrip() {
        let mut db = open_memory();
        db.write_bool("Fullscreen", true).unwrap();
        db.write_bool("Windowed", false).unwrap();
        db.write_integer("Odd", 0x100).unwrap();

        assert!(db.read_bool("Fullscreen").unwrap());
        assert!(!db.read_bool("Windowed").unwrap());
        // Only the low byte counts.
        assert!(!db.read_bool("Odd").unwrap());
    }

    #[test]
    fn cursor_scopes_records() {
        let mut db = open_memory();
        db.create_record_path("Settings/Video").unwrap();
        db.write_integer("Width", 640).unwrap();

        db.create_record_path("Settings/Audio").unwrap();
        assert!(db.read_integer("Width", 4).unwrap_err().is_not_found());

        db.select_record_path("Settings\\Video").unwrap();
        assert_eq!(db.read_integer("Width", 4).unwrap(), 640);
    }

    #[test]
    fn select_missing_key_keeps_cursor() {
        let mut db = open_memory();
        db.create_record_path("Settings").unwrap();

        assert!(db.select_record_path("Nope").unwrap_err().is_not_found());
        assert_eq!(db.current_key(), "Settings");
    }

    #[test]
    fn key_scope_ignores_cursor() {
        let mut db = open_memory();
        db.create_record_path("Pilots\\Dravis").unwrap();
        db.create_record_path("Settings").unwrap();

        {
            let mut pilot = db.key("Pilots/Dravis").unwrap();
            assert_eq!(pilot.path(), "Pilots\\Dravis");
            pilot.write_string("Ship", "Pyro-GL").unwrap();
            pilot.write_bool("Hud", true).unwrap();
            assert!(pilot.read_bool("Hud").unwrap());
        }

        assert_eq!(db.current_key(), "Settings");
        assert!(db.read_string("Ship").unwrap_err().is_not_found());

        db.select_record_path("Pilots/Dravis").unwrap();
        assert_eq!(db.read_string("Ship").unwrap().0, "Pyro-GL");
    }

    #[test]
    fn key_scope_for_missing_key_fails() {
        let mut db = open_memory();
        assert!(db.key("Missing").unwrap_err().is_not_found());
    }

    #[test]
    fn closed_database_reports_not_open() {
        let mut db = open_memory();
        db.close().unwrap();

        assert!(!db.is_open());
        assert!(matches!(db.create_record_path("A"), Err(CoreError::NotOpen)));
        assert!(matches!(db.select_record_path("A"), Err(CoreError::NotOpen)));
        assert!(matches!(db.write_integer("A", 1), Err(CoreError::NotOpen)));
        assert!(matches!(db.write_string("A", "a"), Err(CoreError::NotOpen)));
        assert!(matches!(db.read_integer("A", 4), Err(CoreError::NotOpen)));
        assert!(matches!(db.read_string("A"), Err(CoreError::NotOpen)));
        assert!(matches!(db.close(), Err(CoreError::NotOpen)));
    }

    #[test]
    fn close_exports_to_medium() {
        let store = InMemoryStore::named("registry");
        let medium = store.medium().clone();

        let mut db = AppDatabase::open_store(store).unwrap();
        db.write_integer("Build", 7).unwrap();
        assert!(!medium.contains(Path::new("registry")));

        db.close().unwrap();
        let mut reopened =
            AppDatabase::open_store(InMemoryStore::on_medium(medium, "registry")).unwrap();
        reopened.select_record_path(VERSION_KEY).unwrap();
        assert_eq!(reopened.read_integer("Build", 4).unwrap(), 7);
    }

    #[test]
    fn drop_exports_to_medium() {
        let store = InMemoryStore::named("registry");
        let medium = store.medium().clone();

        {
            let mut db = AppDatabase::open_store(store).unwrap();
            db.write_string("Name", "drop").unwrap();
        }

        assert!(medium.contains(Path::new("registry")));
    }

    #[test]
    fn child_is_an_independent_snapshot() {
        let mut parent = open_memory();
        parent.write_integer("Shared", 1).unwrap();

        let mut child = AppDatabase::open_child_of(&mut parent).unwrap();
        assert_eq!(child.current_key(), "");
        child.select_record_path(VERSION_KEY).unwrap();
        assert_eq!(child.read_integer("Shared", 4).unwrap(), 1);

        child.write_integer("ChildOnly", 2).unwrap();
        parent.write_integer("ParentOnly", 3).unwrap();

        assert!(parent.read_integer("ChildOnly", 4).unwrap_err().is_not_found());
        assert!(child.read_integer("ParentOnly", 4).unwrap_err().is_not_found());
        assert_eq!(
            child.store().unwrap().system_name(),
            parent.store().unwrap().system_name()
        );
    }

    #[test]
    fn child_of_closed_parent_fails() {
        let mut parent = open_memory();
        parent.close().unwrap();
        assert!(matches!(
            AppDatabase::open_child_of(&mut parent),
            Err(CoreError::NotOpen)
        ));
    }

    #[test]
    fn open_with_places_registry_in_preference_dir() {
        let dir = tempdir().unwrap();
        let resolver = FixedDirs(Some(dir.path().to_path_buf()));
        let config = Config::new();

        {
            let mut db = AppDatabase::open_with(&config, &resolver).unwrap();
            db.write_integer("Detail", 3).unwrap();
            db.close().unwrap();
        }

        assert!(dir.path().join(".Descent3Registry").exists());

        let db = AppDatabase::open_with(&config, &resolver).unwrap();
        assert_eq!(db.read_integer("Detail", 4).unwrap(), 3);
    }

    #[test]
    fn open_with_no_preference_dir_fails() {
        let result = AppDatabase::open_with(&Config::new(), &FixedDirs(None));
        assert!(matches!(
            result,
            Err(CoreError::DirectoryUnavailable { .. })
        ));
    }

    #[test]
    fn user_name_is_available() {
        let db = open_memory();
        assert!(!db.current_user_name().is_empty());
    }

    proptest! {
        #[test]
        fn integer_reads_keep_the_low_bytes(
            value in any::<i32>(),
            width in prop_oneof![Just(1usize), Just(2usize), Just(4usize)],
        ) {
            let mut db = open_memory();
            db.write_integer("Value", value).unwrap();

            let bits = value as u32;
            let expected = match width {
                1 => bits & 0xFF,
                2 => bits & 0xFFFF,
                _ => bits,
            };
            prop_assert_eq!(db.read_integer("Value", width).unwrap(), expected);
        }

        #[test]
        fn separators_select_the_same_key(
            parts in proptest::collection::vec("[A-Za-z0-9]{1,8}", 1..4),
        ) {
            let mut db = open_memory();
            db.create_record_path(&parts.join("/")).unwrap();
            db.write_integer("Hit", 1).unwrap();

            db.select_record_path(&parts.join("\\")).unwrap();
            prop_assert_eq!(db.current_key(), parts.join("\\"));
            prop_assert_eq!(db.read_integer("Hit", 4).unwrap(), 1);
        }
    }
}
