//! Session-change events emitted by the session store.
//!
//! Subscribers (route guards, UI shells, cross-tab bridges) receive these
//! through the store's broadcast channel and react by re-rendering or
//! re-running their guards. Events carry the payload the change was about;
//! they are not a substitute for reading the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::User;

/// Notifications broadcast on every session-store mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A full session was persisted (login or registration).
    Saved {
        /// The user the session belongs to.
        user: User,
        /// Hard expiry of the new access token.
        expires_at: DateTime<Utc>,
        /// Whether the extended retention window applies.
        remember_me: bool,
    },
    /// The session was removed (logout, validation failure, inactivity).
    Cleared,
    /// The cached user snapshot was replaced.
    UserUpdated {
        /// The new snapshot.
        user: User,
    },
    /// The token pair was rotated.
    TokensUpdated {
        /// Hard expiry of the replacement access token.
        expires_at: DateTime<Utc>,
    },
}
