//! Key-value storage collaborators for on-device persistence.
//!
//! - [`FileStore`]: one JSON file per key under a data directory
//! - [`MemoryStore`]: process-local map, used in tests and with `--no-persist`

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::error::StorageError;

/// String-keyed slot storage. A missing key is `Ok(None)`, not an error.
pub trait KeyValueStore: Send {
    /// Whether the backing medium can be used at all. Callers short-circuit to
    /// pure in-memory behavior when this is false.
    fn is_available(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self { base_path: base_path.into() }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn is_available(&self) -> bool {
        fs::create_dir_all(&self.base_path).is_ok()
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path)?;
        let target = self.slot_path(key);
        let temp_path = self.base_path.join(format!(".{}.json.tmp", key));

        fs::write(&temp_path, value)?;
        // Atomic on POSIX systems
        fs::rename(&temp_path, &target)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(mut self, key: &str, value: &str) -> Self {
        self.slots.insert(key.to_string(), value.to_string());
        self
    }

    pub fn slot(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
