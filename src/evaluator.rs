use crate::clock::{Clock, SystemClock};
use crate::models::{Configuration, EvaluationResult, Timestamp, Visibility};
use log::debug;

/// Decide visibility for `config` at `now`.
///
/// Bounds are inclusive. A missing bound never matches, though the interval
/// still counts as valid.
pub fn evaluate(config: &Configuration, now: Timestamp) -> EvaluationResult {
    let interval_valid = config.interval.is_valid();
    let in_range = config.interval.contains(now);

    EvaluationResult {
        visible: config.enabled && in_range && interval_valid,
        interval_valid,
        in_range,
    }
}

/// Decides whether a time-gated element should be shown.
///
/// [`evaluate`](Self::evaluate) is pure. [`tick`](Self::tick) reads the
/// clock and remembers the outcome so callers only redraw on change.
#[derive(Debug)]
pub struct WindowVisibilityEvaluator<C: Clock = SystemClock> {
    clock: C,
    config: Configuration,
    last: Option<(Timestamp, EvaluationResult)>,
}

impl<C: Clock> WindowVisibilityEvaluator<C> {
    pub fn new(clock: C, config: Configuration) -> Self {
        Self {
            clock,
            config,
            last: None,
        }
    }

    /// Replace the active configuration.
    pub fn configure(&mut self, config: Configuration) {
        self.config = config;
    }

    pub fn configuration(&self) -> Configuration {
        self.config
    }

    pub fn evaluate(&self, now: Timestamp) -> EvaluationResult {
        evaluate(&self.config, now)
    }

    /// Evaluate at the clock's current reading without recording it.
    pub fn evaluate_now(&self) -> EvaluationResult {
        self.evaluate(self.clock.now())
    }

    /// Re-evaluate at the current time.
    ///
    /// Returns true if `visible` differs from the previous tick. Before the
    /// first tick the element counts as hidden.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        let result = self.evaluate(now);
        let previous = self.visibility();
        self.last = Some((now, result));

        let changed = previous != result.visibility();
        debug!(
            "Visibility tick at {now}: {} (in_range={}, interval_valid={})",
            result.visibility(),
            result.in_range,
            result.interval_valid
        );
        changed
    }

    /// Outcome of the most recent tick.
    pub fn last_result(&self) -> Option<EvaluationResult> {
        self.last.map(|(_, result)| result)
    }

    /// When the most recent tick ran.
    pub fn last_evaluated_at(&self) -> Option<Timestamp> {
        self.last.map(|(at, _)| at)
    }

    /// Visibility as of the most recent tick.
    pub fn visibility(&self) -> Visibility {
        self.last_result()
            .map_or(Visibility::Hidden, |result| result.visibility())
    }
}
