//! Host configuration storage
//!
//! The host keeps uploader settings under dotted keys such as
//! `picBed.superbed`. [`FileConfigStore`] maps those keys onto nested TOML
//! tables so the credentials can live next to the application settings.

use crate::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// Keyed configuration storage provided by the host
pub trait ConfigStore: Send + Sync {
    /// Read the value stored under `key`
    fn get_config(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Replace the value stored under `key`
    fn save_config(&self, key: &str, value: serde_json::Value) -> Result<()>;
}

/// In-memory store, mostly for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one entry
    pub fn with_entry(key: impl Into<String>, value: serde_json::Value) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.write() {
            values.insert(key.into(), value);
        }
        store
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get_config(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let values = self
            .values
            .read()
            .map_err(|_| crate::Error::internal("config store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn save_config(&self, key: &str, value: serde_json::Value) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| crate::Error::internal("config store lock poisoned"))?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}

/// TOML file backed store
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file
    write_lock: RwLock<()>,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<toml::Table> {
        if !self.path.exists() {
            return Ok(toml::Table::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    fn write_document(&self, document: &toml::Table) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(document)?)?;
        debug!("Saved configuration to {:?}", self.path);
        Ok(())
    }
}

impl ConfigStore for FileConfigStore {
    fn get_config(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let _guard = self
            .write_lock
            .read()
            .map_err(|_| crate::Error::internal("config file lock poisoned"))?;
        let document = self.read_document()?;

        let mut parts = key.split('.');
        let Some(first) = parts.next() else {
            return Ok(None);
        };
        let mut current = match document.get(first) {
            Some(value) => value,
            None => return Ok(None),
        };
        for part in parts {
            current = match current.get(part) {
                Some(value) => value,
                None => return Ok(None),
            };
        }

        Ok(Some(serde_json::to_value(current)?))
    }

    fn save_config(&self, key: &str, value: serde_json::Value) -> Result<()> {
        let _guard = self
            .write_lock
            .write()
            .map_err(|_| crate::Error::internal("config file lock poisoned"))?;
        let mut document = self.read_document()?;
        let value = toml::Value::try_from(value)?;

        let parts: Vec<&str> = key.split('.').collect();
        let Some((last, parents)) = parts.split_last() else {
            return Err(crate::Error::config("key", "empty configuration key"));
        };

        let mut table = &mut document;
        for part in parents {
            let entry = table
                .entry(part.to_string())
                .or_insert(toml::Value::Table(toml::Table::new()));
            table = match entry {
                toml::Value::Table(inner) => inner,
                _ => {
                    return Err(crate::Error::config(
                        key,
                        &format!("'{}' is not a table", part),
                    ));
                }
            };
        }
        table.insert(last.to_string(), value);

        self.write_document(&document)
    }
}
