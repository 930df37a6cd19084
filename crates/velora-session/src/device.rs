//! Device identifier derivation.
//!
//! The identifier is a short hash over stable environment signals. It is
//! generated once, persisted under its own key, and reused across sessions
//! so repeated logins from the same profile remain traceable. It is an
//! advisory continuity signal only: not hardened against spoofing, never
//! used as an authentication factor.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::debug;

use velora_core::result::AppResult;
use velora_core::traits::{DeviceIdProvider, KeyValueStore};

use crate::keys;

/// Stable environment signals the identifier is derived from.
#[derive(Debug, Clone)]
pub struct DeviceSignals {
    /// Client user-agent string.
    pub user_agent: String,
    /// UI language tag.
    pub language: String,
    /// Screen width in pixels.
    pub screen_width: u32,
    /// Screen height in pixels.
    pub screen_height: u32,
    /// Timezone offset from UTC in minutes.
    pub timezone_offset_minutes: i32,
    /// Rendering-stack fingerprint string (renderer/vendor identification).
    pub renderer: String,
}

impl DeviceSignals {
    fn digest_input(&self) -> String {
        format!(
            "{}|{}|{}x{}|{}|{}",
            self.user_agent,
            self.language,
            self.screen_width,
            self.screen_height,
            self.timezone_offset_minutes,
            self.renderer
        )
    }
}

/// [`DeviceIdProvider`] deriving the identifier from [`DeviceSignals`].
///
/// The first call hashes the signals and persists the result; every later
/// call (including after `clear_session`) returns the persisted value, so
/// the identifier never rotates within a profile.
#[derive(Debug)]
pub struct FingerprintDeviceId {
    /// Backing store for the persisted identifier.
    storage: Arc<dyn KeyValueStore>,
    /// Signals captured from the host environment.
    signals: DeviceSignals,
}

impl FingerprintDeviceId {
    /// Creates a provider over the given store and signals.
    pub fn new(storage: Arc<dyn KeyValueStore>, signals: DeviceSignals) -> Self {
        Self { storage, signals }
    }

    fn derive(&self) -> String {
        let digest = Sha256::digest(self.signals.digest_input().as_bytes());
        // 8 bytes of the digest is plenty for an advisory signal.
        digest[..8].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl DeviceIdProvider for FingerprintDeviceId {
    fn device_id(&self) -> AppResult<String> {
        if let Some(existing) = self.storage.get(keys::DEVICE_ID)? {
            return Ok(existing);
        }

        let id = self.derive();
        self.storage.set(keys::DEVICE_ID, &id)?;
        debug!(device_id = %id, "Derived new device identifier");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use velora_storage::MemoryStore;

    fn signals() -> DeviceSignals {
        DeviceSignals {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64)".into(),
            language: "en-US".into(),
            screen_width: 2560,
            screen_height: 1440,
            timezone_offset_minutes: -120,
            renderer: "ANGLE (Mesa Intel Xe)".into(),
        }
    }

    #[test]
    fn test_identifier_is_deterministic_over_signals() {
        let a = FingerprintDeviceId::new(Arc::new(MemoryStore::new()), signals());
        let b = FingerprintDeviceId::new(Arc::new(MemoryStore::new()), signals());
        assert_eq!(a.device_id().unwrap(), b.device_id().unwrap());
    }

    #[test]
    fn test_identifier_is_sixteen_hex_chars() {
        let provider = FingerprintDeviceId::new(Arc::new(MemoryStore::new()), signals());
        let id = provider.device_id().unwrap();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_persisted_identifier_wins_over_changed_signals() {
        let storage = Arc::new(MemoryStore::new());
        let first = FingerprintDeviceId::new(storage.clone(), signals());
        let id = first.device_id().unwrap();

        let mut changed = signals();
        changed.user_agent = "Mozilla/5.0 (Macintosh)".into();
        let second = FingerprintDeviceId::new(storage, changed);
        assert_eq!(second.device_id().unwrap(), id);
    }
}
