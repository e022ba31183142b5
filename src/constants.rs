// src/constants.rs

/// Default re-evaluation cadence for a visibility watcher (1 second).
pub const DEFAULT_TICK_PERIOD_MS: u64 = 1000;

/// Maximum tick period in milliseconds (1 hour)
pub const MAX_TICK_PERIOD_MS: u64 = 60 * 60 * 1000;
