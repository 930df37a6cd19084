//! Session lifecycle configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Session lifecycle policy.
///
/// These are deployment policy, not per-user settings. The defaults are the
/// platform's fixed policy: 24 h access tokens, 7 d refresh tokens, 30 d
/// remember-me retention, 15 min inactivity timeout, and a refresh window
/// opening 5 min before hard expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Access token lifetime in hours.
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl_hours: u64,
    /// Refresh token lifetime in days (issued by the auth backend; recorded
    /// here so the whole policy reads from one place).
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl_days: u64,
    /// Cookie/durable retention window in days when remember-me is chosen.
    #[serde(default = "default_remember_me_ttl")]
    pub remember_me_ttl_days: u64,
    /// Minutes without qualifying activity before a session is logged out.
    #[serde(default = "default_inactivity_timeout")]
    pub inactivity_timeout_minutes: u64,
    /// Minutes before hard expiry at which proactive refresh begins.
    #[serde(default = "default_refresh_threshold")]
    pub refresh_threshold_minutes: u64,
    /// Interval of the background validation watchdog in minutes.
    #[serde(default = "default_watchdog_interval")]
    pub watchdog_interval_minutes: u64,
    /// Minimum seconds between persisted activity touches from passive input.
    #[serde(default = "default_activity_throttle")]
    pub activity_throttle_seconds: u64,
    /// Upper bound on a single refresh-token exchange in seconds. A timed-out
    /// exchange counts as a failed refresh attempt.
    #[serde(default = "default_refresh_call_timeout")]
    pub refresh_call_timeout_seconds: u64,
    /// Buffer size of the session-event broadcast channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer_size: usize,
}

impl SessionConfig {
    /// Access token lifetime as a duration.
    pub fn access_token_ttl(&self) -> Duration {
        Duration::hours(self.access_token_ttl_hours as i64)
    }

    /// Remember-me retention window as a duration.
    pub fn remember_me_ttl(&self) -> Duration {
        Duration::days(self.remember_me_ttl_days as i64)
    }

    /// Inactivity timeout as a duration.
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::minutes(self.inactivity_timeout_minutes as i64)
    }

    /// Refresh threshold as a duration.
    pub fn refresh_threshold(&self) -> Duration {
        Duration::minutes(self.refresh_threshold_minutes as i64)
    }

    /// Watchdog tick interval as a std duration (for tokio timers).
    pub fn watchdog_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.watchdog_interval_minutes * 60)
    }

    /// Activity throttle as a duration.
    pub fn activity_throttle(&self) -> Duration {
        Duration::seconds(self.activity_throttle_seconds as i64)
    }

    /// Refresh-call timeout as a std duration (for tokio timeouts).
    pub fn refresh_call_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_call_timeout_seconds)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            access_token_ttl_hours: default_access_token_ttl(),
            refresh_token_ttl_days: default_refresh_token_ttl(),
            remember_me_ttl_days: default_remember_me_ttl(),
            inactivity_timeout_minutes: default_inactivity_timeout(),
            refresh_threshold_minutes: default_refresh_threshold(),
            watchdog_interval_minutes: default_watchdog_interval(),
            activity_throttle_seconds: default_activity_throttle(),
            refresh_call_timeout_seconds: default_refresh_call_timeout(),
            event_buffer_size: default_event_buffer(),
        }
    }
}

fn default_access_token_ttl() -> u64 {
    24
}

fn default_refresh_token_ttl() -> u64 {
    7
}

fn default_remember_me_ttl() -> u64 {
    30
}

fn default_inactivity_timeout() -> u64 {
    15
}

fn default_refresh_threshold() -> u64 {
    5
}

fn default_watchdog_interval() -> u64 {
    5
}

fn default_activity_throttle() -> u64 {
    30
}

fn default_refresh_call_timeout() -> u64 {
    5
}

fn default_event_buffer() -> usize {
    64
}
