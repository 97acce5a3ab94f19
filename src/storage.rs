//! Key-value slot storage.
//!
//! Board state is kept in a handful of named slots, each holding one JSON
//! document. [`FileStore`] keeps one file per slot under
//! `<workspace>/storage/<key>.json`; [`MemoryStore`] is the in-process
//! equivalent used by tests.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory, relative to the workspace, holding slot files.
pub const STORAGE_DIR: &str = "storage";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error on slot '{key}': {source}")]
    Io { key: String, source: io::Error },
    #[error("invalid slot key '{0}'")]
    InvalidKey(String),
}

/// A string-keyed store of string values.
pub trait KeyValueStore {
    /// Value of `key`, or `None` when the slot is empty.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Clear `key`. Clearing an empty slot is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Slots as files in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(workspace: &Path) -> Self {
        Self {
            dir: workspace.join(STORAGE_DIR),
        }
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_err(key: &str) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(key)(e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        std::fs::create_dir_all(&self.dir).map_err(io_err(key))?;
        std::fs::write(path, value).map_err(io_err(key))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(key)(e)),
        }
    }
}

/// Slots held in memory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    slots: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys of every filled slot, sorted.
    pub fn keys(&self) -> Vec<&str> {
        self.slots.keys().map(String::as_str).collect()
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

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.slots.remove(key);
        Ok(())
    }
}
