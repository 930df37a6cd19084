//! Validation states and the outcome record returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use velora_core::types::User;

/// Route callers are sent to when a validation outcome demands navigation.
pub const LOGIN_ROUTE: &str = "/login";

/// The closed set of states a validation pass can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    /// Nothing is stored.
    NoSession,
    /// The access token is past hard expiry (quick path only; the async
    /// path resolves expiry into `RefreshNeeded` or `RefreshFailed`).
    Expired,
    /// The inactivity timeout elapsed; the session was logged out.
    Inactive,
    /// The auth service no longer recognizes the session.
    Invalid,
    /// The session was expired and has just been repaired by a refresh.
    /// Distinct from `Valid` so callers can react (e.g. re-render).
    RefreshNeeded,
    /// A required refresh failed; the session was cleared.
    RefreshFailed,
    /// The session is usable as-is.
    Valid,
}

/// Everything a caller learns from one validation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// The decided state.
    pub state: ValidationState,
    /// The (possibly re-synced) user snapshot, when a session survives.
    pub user: Option<User>,
    /// The (possibly refreshed) access token, when a session survives.
    pub access_token: Option<String>,
    /// The (possibly refreshed) hard expiry, when a session survives.
    pub expires_at: Option<DateTime<Utc>>,
    /// Human-readable explanation for logs and UI.
    pub message: String,
    /// Whether the caller must navigate away.
    pub should_redirect: bool,
    /// Where to navigate when `should_redirect` is set.
    pub redirect_to: Option<String>,
}

impl ValidationOutcome {
    /// A surviving session: `Valid` or `RefreshNeeded`, no redirect.
    pub fn alive(
        state: ValidationState,
        user: User,
        access_token: String,
        expires_at: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            state,
            user: Some(user),
            access_token: Some(access_token),
            expires_at: Some(expires_at),
            message: message.into(),
            should_redirect: false,
            redirect_to: None,
        }
    }

    /// A terminal state that sends the caller to the login route.
    pub fn login_redirect(state: ValidationState, message: impl Into<String>) -> Self {
        Self {
            state,
            user: None,
            access_token: None,
            expires_at: None,
            message: message.into(),
            should_redirect: true,
            redirect_to: Some(LOGIN_ROUTE.to_string()),
        }
    }

    /// A non-terminal answer with no session payload and no redirect
    /// (quick-path `Expired`/`RefreshNeeded` deferrals).
    pub fn deferred(state: ValidationState, message: impl Into<String>) -> Self {
        Self {
            state,
            user: None,
            access_token: None,
            expires_at: None,
            message: message.into(),
            should_redirect: false,
            redirect_to: None,
        }
    }

    /// Whether the session survived this pass.
    pub fn is_usable(&self) -> bool {
        matches!(
            self.state,
            ValidationState::Valid | ValidationState::RefreshNeeded
        )
    }
}
