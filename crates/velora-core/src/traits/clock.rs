//! Clock port for testable time.

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Every expiry/inactivity decision goes through this trait so tests can
/// drive the session state machine with a controlled clock.
pub trait Clock: Send + Sync + std::fmt::Debug + 'static {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation used outside of tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
