use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::io::recovery::atomic_write;

/// Error type for store reads and writes
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("could not access {key} at {path}: {source}")]
    Io {
        key: String,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),
    #[error("stored value for {0} could not be parsed")]
    Corrupt(String),
}

/// A persistent key-value surface holding text values.
pub trait Store: Send {
    /// Raw value for `key`, or `None` if it was never written.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Overwrite the value for `key`.
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Clear `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Keys become file names, so only a conservative alphabet is accepted.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// One file per key under `<data-dir>/store/`. Each write replaces its file
/// atomically; commands that load and then save hold a
/// [`DataDirLock`](crate::io::lock::DataDirLock) around both.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: &Path) -> Self {
        FileStore {
            data_dir: data_dir.to_path_buf(),
        }
    }

    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.store_dir().join(key))
    }

    fn io_error(key: &str, path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Store for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, &path, e)),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        let dir = self.store_dir();
        fs::create_dir_all(&dir).map_err(|e| Self::io_error(key, &dir, e))?;
        atomic_write(&path, value.as_bytes()).map_err(|e| Self::io_error(key, &path, e))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, &path, e)),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Shared in-memory map. Clones see the same entries, so a caller can keep a
/// clone to inspect what the store worker wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    entries: HashMap<String, String>,
    unavailable: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `key = value`.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.lock().entries.insert(key.to_string(), value.to_string());
        store
    }

    /// Make every subsequent operation fail with `StorageError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Current value for `key`, bypassing availability.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    /// Number of successful saves so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        // A poisoned map is still a valid map
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(inner: &MemoryInner) -> Result<(), StorageError> {
        if inner.unavailable {
            Err(StorageError::Unavailable("memory store switched off".into()))
        } else {
            Ok(())
        }
    }
}

impl Store for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let inner = self.lock();
        Self::check(&inner)?;
        Ok(inner.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut inner = self.lock();
        Self::check(&inner)?;
        inner.entries.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut inner = self.lock();
        Self::check(&inner)?;
        inner.entries.remove(key);
        Ok(())
    }
}
