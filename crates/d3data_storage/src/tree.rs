//! In-memory key tree shared by the store implementations.

use crate::error::{StorageError, StorageResult};
use std::collections::BTreeMap;

/// Separator used in normalized key paths.
pub const KEY_SEPARATOR: char = '\\';

/// Path of the root key.
pub const ROOT_KEY: &str = "";

/// Longest key path or record name in bytes.
pub const MAX_NAME_LEN: usize = u16::MAX as usize;

/// Longest string value in bytes.
pub const MAX_STRING_LEN: usize = u32::MAX as usize;

/// Type tag of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordType {
    /// NUL-terminated string.
    String = 1,
    /// 32-bit integer.
    Dword = 2,
}

impl RecordType {
    /// Converts a byte to a record type.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(Self::String),
            2 => Some(Self::Dword),
            _ => None,
        }
    }

    /// Converts the record type to a byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

/// A record value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValue {
    /// A string value. Never contains NUL.
    String(String),
    /// A 32-bit integer value.
    Dword(u32),
}

impl RecordValue {
    /// Returns the type tag of this value.
    #[must_use]
    pub fn record_type(&self) -> RecordType {
        match self {
            Self::String(_) => RecordType::String,
            Self::Dword(_) => RecordType::Dword,
        }
    }

    /// Returns the stored size in bytes.
    ///
    /// Strings count their NUL terminator, so an empty string has size 1.
    #[must_use]
    pub fn data_size(&self) -> usize {
        match self {
            Self::String(s) => s.len() + 1,
            Self::Dword(_) => 4,
        }
    }
}

/// Normalizes a key path.
///
/// Both `\` and `/` separate components; empty components are dropped.
/// The root key normalizes to the empty string.
#[must_use]
pub fn normalize_key_path(path: &str) -> String {
    path.split(['\\', '/'])
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(&KEY_SEPARATOR.to_string())
}

/// Keys and their records.
///
/// The root key always exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTree {
    keys: BTreeMap<String, BTreeMap<String, RecordValue>>,
}

impl Default for KeyTree {
    fn default() -> Self {
        let mut keys = BTreeMap::new();
        keys.insert(ROOT_KEY.to_string(), BTreeMap::new());
        Self { keys }
    }
}

impl KeyTree {
    /// Creates a tree containing only the root key.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a key and all of its ancestors.
    ///
    /// Existing keys are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TooLong`] if the normalized path is longer
    /// than [`MAX_NAME_LEN`] bytes.
    pub fn create_key(&mut self, path: &str) -> StorageResult<()> {
        let normalized = normalize_key_path(path);
        if normalized.len() > MAX_NAME_LEN {
            return Err(StorageError::too_long("key path", normalized.len(), MAX_NAME_LEN));
        }

        let mut prefix = String::new();

        for component in normalized.split(KEY_SEPARATOR).filter(|c| !c.is_empty()) {
            if !prefix.is_empty() {
                prefix.push(KEY_SEPARATOR);
            }
            prefix.push_str(component);
            self.keys.entry(prefix.clone()).or_default();
        }
        Ok(())
    }

    /// Returns true if the key exists.
    #[must_use]
    pub fn contains_key(&self, path: &str) -> bool {
        self.keys.contains_key(&normalize_key_path(path))
    }

    /// Creates or overwrites a record under `key`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::KeyNotFound`] if the key does not exist
    /// - [`StorageError::TooLong`] if the name is longer than
    ///   [`MAX_NAME_LEN`] or a string value longer than [`MAX_STRING_LEN`]
    ///   bytes
    pub fn set_record(&mut self, key: &str, name: &str, value: RecordValue) -> StorageResult<()> {
        if name.len() > MAX_NAME_LEN {
            return Err(StorageError::too_long("record name", name.len(), MAX_NAME_LEN));
        }
        if let RecordValue::String(s) = &value {
            if s.len() > MAX_STRING_LEN {
                return Err(StorageError::too_long("string value", s.len(), MAX_STRING_LEN));
            }
        }

        let normalized = normalize_key_path(key);
        let records = self
            .keys
            .get_mut(&normalized)
            .ok_or_else(|| StorageError::key_not_found(normalized.clone()))?;
        records.insert(name.to_string(), value);
        Ok(())
    }

    /// Returns a record under `key`.
    #[must_use]
    pub fn record(&self, key: &str, name: &str) -> Option<&RecordValue> {
        self.keys.get(&normalize_key_path(key))?.get(name)
    }

    /// Iterates keys in path order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// Iterates the records of a key in name order.
    pub fn records(&self, key: &str) -> impl Iterator<Item = (&str, &RecordValue)> {
        self.keys
            .get(&normalize_key_path(key))
            .into_iter()
            .flat_map(|records| records.iter().map(|(n, v)| (n.as_str(), v)))
    }

    /// Returns the number of keys, including the root.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Inserts a key with its records, replacing any existing key of the same path.
    pub(crate) fn insert_key(&mut self, path: String, records: BTreeMap<String, RecordValue>) {
        self.keys.insert(path, records);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_mixed_separators() {
        assert_eq!(normalize_key_path("a/b\\c"), "a\\b\\c");
        assert_eq!(normalize_key_path("\\a//b\\"), "a\\b");
        assert_eq!(normalize_key_path(""), "");
        assert_eq!(normalize_key_path("/"), "");
    }

    #[test]
    fn new_tree_has_root() {
        let tree = KeyTree::new();
        assert!(tree.contains_key(ROOT_KEY));
        assert_eq!(tree.key_count(), 1);
    }

    #[test]
    fn create_key_creates_ancestors() {
        let mut tree = KeyTree::new();
        tree.create_key("Software/Outrage/Descent3").unwrap();

        assert!(tree.contains_key("Software"));
        assert!(tree.contains_key("Software\\Outrage"));
        assert!(tree.contains_key("Software/Outrage/Descent3"));
        assert_eq!(tree.key_count(), 4);
    }

    #[test]
    fn create_key_keeps_existing_records() {
        let mut tree = KeyTree::new();
        tree.create_key("Version").unwrap();
        tree.set_record("Version", "Major", RecordValue::Dword(1)).unwrap();

        tree.create_key("Version").unwrap();
        assert_eq!(
            tree.record("Version", "Major"),
            Some(&RecordValue::Dword(1))
        );
    }

    #[test]
    fn set_record_on_missing_key_fails() {
        let mut tree = KeyTree::new();
        let result = tree.set_record("Nope", "x", RecordValue::Dword(0));
        assert!(matches!(result, Err(StorageError::KeyNotFound { .. })));
    }

    #[test]
    fn set_record_overwrites() {
        let mut tree = KeyTree::new();
        tree.set_record("", "Name", RecordValue::String("a".into())).unwrap();
        tree.set_record("", "Name", RecordValue::Dword(9)).unwrap();
        assert_eq!(tree.record("", "Name"), Some(&RecordValue::Dword(9)));
    }

    #[test]
    fn overlong_key_path_is_rejected() {
        let mut tree = KeyTree::new();
        let path = format!("{}é", "a".repeat(MAX_NAME_LEN - 1));

        assert!(matches!(
            tree.create_key(&path),
            Err(StorageError::TooLong { len: 65536, .. })
        ));
        assert_eq!(tree.key_count(), 1);
    }

    #[test]
    fn longest_key_path_is_accepted() {
        let mut tree = KeyTree::new();
        let path = "a".repeat(MAX_NAME_LEN);
        tree.create_key(&path).unwrap();
        assert!(tree.contains_key(&path));
    }

    #[test]
    fn overlong_record_name_is_rejected() {
        let mut tree = KeyTree::new();
        let name = "n".repeat(MAX_NAME_LEN + 1);

        let result = tree.set_record("", &name, RecordValue::Dword(1));
        assert!(matches!(result, Err(StorageError::TooLong { .. })));
        assert_eq!(tree.records("").count(), 0);
    }

    #[test]
    fn data_size_counts_terminator() {
        assert_eq!(RecordValue::String(String::new()).data_size(), 1);
        assert_eq!(RecordValue::String("abc".into()).data_size(), 4);
        assert_eq!(RecordValue::Dword(0).data_size(), 4);
    }

    #[test]
    fn record_type_byte_roundtrip() {
        for ty in [RecordType::String, RecordType::Dword] {
            assert_eq!(RecordType::from_byte(ty.as_byte()), Some(ty));
        }
        assert_eq!(RecordType::from_byte(0), None);
    }
}
