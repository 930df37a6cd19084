//! Durable key/value storage port.

use crate::result::AppResult;

/// Namespaced, durable string key/value storage.
///
/// This is the client-local durable surface of the session store. Adapters
/// exist for in-memory (tests, native shells) and JSON-file-backed storage;
/// a browser adapter would wrap its local storage facility.
///
/// Operations are synchronous: every intended backing store answers from
/// process memory, and keeping the port sync is what lets the quick
/// validation path stay free of await points.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug + 'static {
    /// Read a value. Missing keys are `Ok(None)`, never an error.
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Write a value, overwriting any previous one.
    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a key. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> AppResult<()>;
}
