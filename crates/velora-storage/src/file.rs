//! JSON-file-backed durable key/value store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::warn;

use velora_core::error::AppError;
use velora_core::result::AppResult;
use velora_core::traits::KeyValueStore;

/// Durable [`KeyValueStore`] persisting all keys to a single JSON file.
///
/// Every write mutates an in-memory map and rewrites the file through a
/// temp-file rename, so readers never observe a half-written file. Reads are
/// answered from memory.
#[derive(Debug)]
pub struct FileStore {
    /// Path of the backing JSON file.
    path: PathBuf,
    /// In-memory view of the file contents.
    entries: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Open a store at `path`, creating parent directories as needed.
    ///
    /// A missing file starts empty. An unreadable file also starts empty
    /// (with a warning) rather than refusing to open: session keys are
    /// recoverable through a fresh login, a wedged client is not.
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Discarding unreadable store file");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) -> AppResult<()> {
        let raw = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AppError::storage("Store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AppError::storage("Store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AppError::storage("Store lock poisoned"))?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("velora-filestore-{name}-{}", std::process::id()))
    }

    #[test]
    fn test_round_trip_survives_reopen() {
        let path = temp_path("reopen");
        {
            let store = FileStore::open(&path).unwrap();
            store.set("velora.device_id", "ab12cd34ef56ab78").unwrap();
        }
        let store = FileStore::open(&path).unwrap();
        assert_eq!(
            store.get("velora.device_id").unwrap(),
            Some("ab12cd34ef56ab78".to_string())
        );
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "not-json{{{").unwrap();
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
        std::fs::remove_file(&path).ok();
    }
}
