//! The persisted session aggregate and its time predicates.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::user::User;

/// The only persisted aggregate: everything needed to resume an
/// authenticated session after a reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Cached user snapshot.
    pub user: User,
    /// Opaque short-lived credential; superseded on refresh.
    pub access_token: String,
    /// Opaque long-lived credential; superseded together with the access token.
    pub refresh_token: String,
    /// Absolute expiry of the access token.
    pub expires_at: DateTime<Utc>,
    /// Whether the user opted into the extended retention window.
    pub remember_me: bool,
    /// Stable per-profile device identifier; survives `clear_session`.
    pub device_id: String,
    /// Last qualifying user interaction.
    pub last_activity: DateTime<Utc>,
}

impl Session {
    /// Whether the access token is past its hard expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether `now` is inside the proactive refresh window.
    ///
    /// The window opens `threshold` before hard expiry, so for any positive
    /// threshold this becomes true strictly before [`Self::is_expired_at`].
    pub fn needs_refresh_at(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        now >= self.expires_at - threshold
    }

    /// Whether the inactivity timeout has elapsed since the last activity.
    pub fn is_inactive_at(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.last_activity > timeout
    }

    /// Remaining time until hard expiry (negative once expired).
    pub fn time_to_expiry(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }
}

/// Diagnostic snapshot of the stored session's timing state.
///
/// Produced by `SessionStore::get_session_info` for observability and tests;
/// never consulted by the validator's control flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Whether any session is stored at all.
    pub has_session: bool,
    /// Hard-expiry predicate result.
    pub is_expired: bool,
    /// Refresh-window predicate result.
    pub needs_refresh: bool,
    /// Inactivity predicate result.
    pub is_inactive: bool,
    /// Milliseconds until hard expiry (negative once expired, zero without a session).
    pub expires_in_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::user::{User, UserRole};
    use uuid::Uuid;

    fn session_expiring_at(expires_at: DateTime<Utc>, last_activity: DateTime<Utc>) -> Session {
        Session {
            user: User {
                id: Uuid::new_v4(),
                username: "hana".into(),
                email: "hana@example.com".into(),
                display_name: None,
                role: UserRole::Seller,
            },
            access_token: "at-1".into(),
            refresh_token: "rt-1".into(),
            expires_at,
            remember_me: false,
            device_id: "ab12cd34ef56ab78".into(),
            last_activity,
        }
    }

    #[test]
    fn test_expiry_is_inclusive_of_the_deadline() {
        let now = Utc::now();
        let s = session_expiring_at(now, now);
        assert!(s.is_expired_at(now));
        assert!(!s.is_expired_at(now - Duration::milliseconds(1)));
    }

    #[test]
    fn test_refresh_window_opens_strictly_before_expiry() {
        let now = Utc::now();
        let threshold = Duration::minutes(5);
        let s = session_expiring_at(now + Duration::minutes(3), now);
        assert!(s.needs_refresh_at(now, threshold));
        assert!(!s.is_expired_at(now));
    }

    #[test]
    fn test_inactivity_requires_strictly_more_than_the_timeout() {
        let now = Utc::now();
        let timeout = Duration::minutes(15);
        let exactly = session_expiring_at(now + Duration::hours(1), now - timeout);
        assert!(!exactly.is_inactive_at(now, timeout));
        let over = session_expiring_at(
            now + Duration::hours(1),
            now - timeout - Duration::seconds(1),
        );
        assert!(over.is_inactive_at(now, timeout));
    }
}
