//! Registry-dump command implementation.

use d3data_core::{writable_preference_directory, DEFAULT_APP, DEFAULT_ORG, REGISTRY_FILE_NAME};
use d3data_storage::{FileStore, KeyValueStore, RecordValue};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Registry dump result.
#[derive(Debug, Serialize)]
pub struct RegistryDump {
    /// Registry file path.
    pub path: String,
    /// Keys in path order, the root first.
    pub keys: Vec<KeyDump>,
}

/// One key and its records.
#[derive(Debug, Serialize)]
pub struct KeyDump {
    /// Key path; empty for the root.
    pub path: String,
    /// Records in name order.
    pub records: Vec<RecordDump>,
}

/// A single record.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecordDump {
    /// String record.
    String {
        /// Record name.
        name: String,
        /// Record value.
        value: String,
    },
    /// 32-bit integer record.
    Dword {
        /// Record name.
        name: String,
        /// Record value.
        value: u32,
    },
}

/// Collects every key and record of `store`.
pub fn dump<S: KeyValueStore>(store: &S) -> RegistryDump {
    let keys = store
        .key_paths()
        .into_iter()
        .map(|path| {
            let records = store
                .records(&path)
                .into_iter()
                .map(|(name, value)| match value {
                    RecordValue::String(value) => RecordDump::String { name, value },
                    RecordValue::Dword(value) => RecordDump::Dword { name, value },
                })
                .collect();
            KeyDump { path, records }
        })
        .collect();

    RegistryDump {
        path: store.system_name().display().to_string(),
        keys,
    }
}

/// Runs the registry-dump command.
///
/// The registry is only imported, never exported, so the file is left
/// untouched.
pub fn run(file: Option<&Path>, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = match file {
        Some(path) => path.to_path_buf(),
        None => default_registry_path().ok_or("no preference directory for the registry")?,
    };

    if !path.exists() {
        return Err(format!("No registry found at {:?}", path).into());
    }

    let store = FileStore::open(&path)?;
    let result = dump(&store);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => print_text_output(&result),
    }

    Ok(())
}

fn default_registry_path() -> Option<PathBuf> {
    writable_preference_directory(DEFAULT_ORG, DEFAULT_APP)
        .map(|dir| dir.join(REGISTRY_FILE_NAME))
}

fn print_text_output(result: &RegistryDump) {
    println!("Registry: {}", result.path);
    for key in &result.keys {
        println!();
        if key.path.is_empty() {
            println!("[\\]");
        } else {
            println!("[{}]", key.path);
        }
        for record in &key.records {
            match record {
                RecordDump::String { name, value } => println!("  {name} = \"{value}\""),
                RecordDump::Dword { name, value } => println!("  {name} = {value} (0x{value:08x})"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use d3data_storage::InMemoryStore;
    use tempfile::tempdir;

    #[test]
    fn dump_lists_keys_and_records() {
        let mut store = InMemoryStore::named("registry");
        store.create_key("Version").unwrap();
        store
            .create_record("Version", "Build", RecordValue::Dword(3))
            .unwrap();
        store
            .create_record("Version", "Name", RecordValue::String("d3".into()))
            .unwrap();

        let result = dump(&store);
        assert_eq!(result.path, "registry");
        assert_eq!(result.keys.len(), 2);
        assert_eq!(result.keys[0].path, "");
        assert_eq!(result.keys[1].path, "Version");
        assert_eq!(result.keys[1].records.len(), 2);
    }

    #[test]
    fn dump_json_tags_record_types() {
        let mut store = InMemoryStore::named("registry");
        store.create_record("", "Flag", RecordValue::Dword(1)).unwrap();

        let json = serde_json::to_string(&dump(&store)).unwrap();
        assert!(json.contains(r#""type":"dword""#));
    }

    #[test]
    fn run_reads_file_without_modifying_it() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry");

        let mut store = FileStore::new(&path);
        store.create_key("Settings").unwrap();
        store.export().unwrap();
        let before = std::fs::read(&path).unwrap();

        run(Some(&path), "json").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn run_missing_file_fails() {
        let dir = tempdir().unwrap();
        assert!(run(Some(&dir.path().join("missing")), "text").is_err());
    }
}
