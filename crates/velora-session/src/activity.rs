//! Throttled activity recording.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::trace;

use velora_core::traits::Clock;

use crate::store::SessionStore;

/// Forwards user-interaction signals to the store at a bounded rate.
///
/// Passive input listeners (pointer, key, scroll, touch) can fire hundreds
/// of times a second; persisting every one would amplify writes for no
/// benefit. The tracker forwards at most one touch per throttle interval
/// and drops the rest.
#[derive(Clone)]
pub struct ActivityTracker {
    /// The store whose activity timestamp is touched.
    store: Arc<SessionStore>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Minimum interval between forwarded touches.
    throttle: chrono::Duration,
    /// When the last touch was forwarded.
    last_forwarded: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl std::fmt::Debug for ActivityTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityTracker")
            .field("throttle", &self.throttle)
            .finish()
    }
}

impl ActivityTracker {
    /// Creates a tracker using the store's configured throttle.
    pub fn new(store: Arc<SessionStore>, clock: Arc<dyn Clock>) -> Self {
        let throttle = store.config().activity_throttle();
        Self {
            store,
            clock,
            throttle,
            last_forwarded: Arc::new(Mutex::new(None)),
        }
    }

    /// Records a qualifying interaction. Returns whether the touch was
    /// forwarded to the store or dropped by the throttle.
    pub fn record_activity(&self) -> bool {
        let now = self.clock.now();

        let should_forward = {
            let mut last = self
                .last_forwarded
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            match *last {
                Some(at) if now - at < self.throttle => false,
                _ => {
                    *last = Some(now);
                    true
                }
            }
        };

        if should_forward {
            self.store.update_last_activity();
        } else {
            trace!("Activity dropped by throttle");
        }
        should_forward
    }
}
