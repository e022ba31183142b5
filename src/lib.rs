pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod evaluator;
pub mod models;
#[cfg(test)]
mod test_utils;
pub mod ticker;
pub mod validation;
pub mod watcher;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::WindowProperties;
pub use error::AppError;
pub use evaluator::{evaluate, WindowVisibilityEvaluator};
pub use models::{Configuration, EvaluationResult, Interval, Timestamp, Visibility};
pub use ticker::{CancellationHandle, ManualTicker, ThreadTicker, TickCallback, Ticker};
pub use watcher::{ChangeCause, VisibilityChange, VisibilityWatcher};

use log::warn;
use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering from poisoning if necessary
pub(crate) fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("{context} mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}
