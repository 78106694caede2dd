// ── Storage media ──
//
// The value store writes text under string keys, the same shape as a
// browser storage area. Two media ship here: an in-memory map for tests
// and embedding, and a single JSON file for native processes.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, warn};

/// Failure of the underlying medium. Never escapes the value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("storage contents are corrupt: {0}")]
    Corrupt(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A string key/value medium that outlives the in-memory engine state.
pub trait StorageBackend: Send + Sync {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove_item(&self, key: &str) -> StorageResult<()>;
    /// Every key currently stored, in sorted order.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

// ── MemoryStorage ───────────────────────────────────────────────────

/// Process-local storage. Clones share the same map, so a second engine
/// built from a clone sees what the first one wrote (a warm reload).
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".into()))
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

// ── FileStorage ─────────────────────────────────────────────────────

/// Storage backed by one JSON object file (`{ "key": "text", ... }`).
///
/// Every call re-reads the file so that several processes (CLI and a running
/// session) observe each other's writes. Writes go through a sibling temp file
/// and a rename.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> StorageResult<BTreeMap<String, String>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text).map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    /// Read the map for a write. A corrupt file is replaced rather than
    /// blocking every future write.
    fn read_map_for_write(&self) -> StorageResult<BTreeMap<String, String>> {
        match self.read_map() {
            Err(StorageError::Corrupt(reason)) => {
                warn!(path = %self.path.display(), %reason, "discarding corrupt storage file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(map)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), entries = map.len(), "storage file written");
        Ok(())
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, ()>> {
        self.guard
            .lock()
            .map_err(|_| StorageError::Unavailable("file storage lock poisoned".into()))
    }
}

impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock()?;
        Ok(self.read_map()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock()?;
        let mut map = self.read_map_for_write()?;
        map.insert(key.to_owned(), value.to_owned());
        self.write_map(&map)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let _guard = self.lock()?;
        let mut map = self.read_map_for_write()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let _guard = self.lock()?;
        Ok(self.read_map()?.into_keys().collect())
    }
}
