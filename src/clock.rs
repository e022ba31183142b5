use crate::models::Timestamp;
use crate::safe_lock;
use chrono::Utc;
use log::warn;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Source of the current instant.
///
/// Readings must never go backwards within a session.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Virtual time that only moves when told to.
///
/// Clones share the same reading, so a test can hold one copy while the
/// evaluator or a [`ManualTicker`](crate::ticker::ManualTicker) holds another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock to `instant`. Earlier instants are ignored.
    pub fn set(&self, instant: Timestamp) {
        let mut now = safe_lock(&self.now, "ManualClock");
        if instant > *now {
            *now = instant;
        }
    }

    pub fn advance(&self, by: Duration) {
        let step = match chrono::Duration::from_std(by) {
            Ok(step) => step,
            Err(e) => {
                warn!("ManualClock: cannot advance by {by:?}: {e}");
                return;
            }
        };

        let mut now = safe_lock(&self.now, "ManualClock");
        if let Some(next) = now.checked_add_signed(step) {
            *now = next;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *safe_lock(&self.now, "ManualClock")
    }
}
