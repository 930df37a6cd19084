//! Device identifier port.

use crate::result::AppResult;

/// Provider of the stable per-profile device identifier.
///
/// The identifier is derived once from environment signals, persisted
/// independently of the session, and reused across logins so repeated
/// sessions from the same profile remain traceable. It is an advisory
/// anti-replay signal, not a security boundary.
pub trait DeviceIdProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the device identifier, deriving and persisting it on first use.
    fn device_id(&self) -> AppResult<String>;
}
