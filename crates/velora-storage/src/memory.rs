//! In-memory key/value store backed by dashmap.

use dashmap::DashMap;

use velora_core::result::AppResult;
use velora_core::traits::KeyValueStore;

/// In-memory [`KeyValueStore`] for tests and ephemeral shells.
///
/// Writes are process-local and lost on exit; the session store does not
/// care, it only requires the port contract.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Key → value.
    entries: DashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys (diagnostic).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
