use super::Timestamp;

/// An administrator-configured `[start, end]` window.
///
/// Either bound may be unset. An interval with `start > end` can be
/// constructed but reports itself as invalid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interval {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl Interval {
    pub fn new(start: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        Self { start, end }
    }

    /// Interval with both bounds set.
    pub fn bounded(start: Timestamp, end: Timestamp) -> Self {
        Self::new(Some(start), Some(end))
    }

    /// Interval with neither bound set.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Both bounds present.
    pub fn is_bounded(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// `start <= end`, or at least one bound unset.
    pub fn is_valid(&self) -> bool {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            start <= end
        } else {
            true
        }
    }

    /// Check if `now` falls within the window, inclusive at both ends.
    ///
    /// A missing bound means the window never matches.
    pub fn contains(&self, now: Timestamp) -> bool {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            start <= now && now <= end
        } else {
            false
        }
    }
}
