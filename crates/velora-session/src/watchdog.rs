//! Background session watchdog.

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::validator::SessionValidator;

/// Periodically runs a validation pass so sessions are refreshed or logged
/// out without waiting for user interaction.
#[derive(Debug, Clone)]
pub struct SessionWatchdog {
    /// The validator to invoke each tick.
    validator: SessionValidator,
    /// Tick interval.
    interval: std::time::Duration,
}

impl SessionWatchdog {
    /// Creates a watchdog with the configured interval.
    pub fn new(validator: SessionValidator, interval: std::time::Duration) -> Self {
        Self {
            validator,
            interval,
        }
    }

    /// Spawns the watchdog task and returns its teardown handle.
    ///
    /// The first tick fires one full interval after start, not immediately;
    /// startup code is expected to run its own initial validation.
    pub fn start(self) -> WatchdogHandle {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // interval() fires immediately; consume that tick.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let outcome = self.validator.validate_session(false).await;
                debug!(state = ?outcome.state, "Watchdog validation tick");
                if outcome.should_redirect {
                    // The watchdog cannot navigate; subscribers see the
                    // store's Cleared event and handle the redirect.
                    info!(state = ?outcome.state, "Watchdog ended the session");
                }
            }
        });

        WatchdogHandle {
            handle: Some(handle),
        }
    }
}

/// Teardown handle for a running watchdog.
///
/// Dropping the handle aborts the task, so a consumer that goes away cannot
/// leak a timer that keeps validating forever.
#[derive(Debug)]
pub struct WatchdogHandle {
    /// The spawned watchdog task.
    handle: Option<JoinHandle<()>>,
}

impl WatchdogHandle {
    /// Stops the watchdog explicitly.
    pub fn stop(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Watchdog stopped");
        }
    }
}

impl Drop for WatchdogHandle {
    fn drop(&mut self) {
        self.abort();
    }
}
