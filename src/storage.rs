//! Persistent string key/value slots.
//!
//! DESIGN
//! ======
//! The session store never touches a global: it is handed a
//! `KeyValueStorage` capability. `FileStorage` is the terminal stand-in for
//! browser local storage (one JSON object per file, values are strings).
//! `MemoryStorage` backs tests and can simulate disabled or full storage.

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::SessionError;

/// String key/value capability with local-storage semantics.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value under `key`, `None` when absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Write `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), SessionError>;
}

// =============================================================================
// MEMORY
// =============================================================================

/// In-process storage. Optionally capped at `quota` bytes (keys + values)
/// or disabled outright.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
    disabled: bool,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects writes once keys and values exceed `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self { quota: Some(bytes), ..Self::default() }
    }

    /// Storage that fails every operation, like local storage in a locked-down browser.
    #[must_use]
    pub fn disabled() -> Self {
        Self { disabled: true, ..Self::default() }
    }

    fn items(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, SessionError> {
        if self.disabled {
            return Err(SessionError::Storage("storage is disabled".into()));
        }
        self.items
            .lock()
            .map_err(|_| SessionError::Storage("storage lock poisoned".into()))
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.items()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut items = self.items()?;
        if let Some(quota) = self.quota {
            let others: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + value.len() > quota {
                return Err(SessionError::Storage(format!("quota of {quota} bytes exceeded")));
            }
        }
        items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        self.items()?.remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// Storage persisted as a JSON object in a single file.
///
/// Every call re-reads the file; writes go through a sibling temp file and a
/// rename so a crashed write never leaves a half-written document behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SessionError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(storage_io("read", &self.path, &e)),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            SessionError::Storage(format!("{} is not a storage document: {e}", self.path.display()))
        })
    }

    fn save(&self, items: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| storage_io("create directory", parent, &e))?;
        }
        let rendered =
            serde_json::to_string_pretty(items).map_err(|e| SessionError::Serialize(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, rendered).map_err(|e| storage_io("write", &tmp, &e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| storage_io("rename", &self.path, &e))?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut items = self.load()?;
        items.insert(key.to_owned(), value.to_owned());
        self.save(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        let mut items = self.load()?;
        if items.remove(key).is_none() {
            return Ok(());
        }
        self.save(&items)
    }
}

fn storage_io(action: &str, path: &Path, err: &std::io::Error) -> SessionError {
    tracing::warn!(path = %path.display(), error = %err, "storage {action} failed");
    SessionError::Storage(format!("{action} {}: {err}", path.display()))
}
