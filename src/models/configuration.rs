use super::{Interval, Timestamp};

/// The administrator-supplied settings that gate a notification.
///
/// Hosts hand this to the evaluator by value; the evaluator keeps its own copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Configuration {
    pub interval: Interval,
    pub enabled: bool,
}

impl Configuration {
    pub fn new(interval: Interval, enabled: bool) -> Self {
        Self { interval, enabled }
    }

    /// Enabled configuration for the window `[start, end]`.
    pub fn window(start: Timestamp, end: Timestamp) -> Self {
        Self::new(Interval::bounded(start, end), true)
    }

    /// Same interval, toggle switched.
    pub fn with_enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }
}
