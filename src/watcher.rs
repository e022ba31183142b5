use crate::clock::{Clock, SystemClock};
use crate::evaluator::WindowVisibilityEvaluator;
use crate::models::{Configuration, EvaluationResult, Timestamp, Visibility};
use crate::safe_lock;
use crate::ticker::{CancellationHandle, Ticker};
use log::info;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What triggered a re-evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCause {
    Start,
    Tick,
    Configure,
}

impl fmt::Display for ChangeCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeCause::Start => write!(f, "start"),
            ChangeCause::Tick => write!(f, "tick"),
            ChangeCause::Configure => write!(f, "configure"),
        }
    }
}

/// A `Hidden`/`Visible` transition reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityChange {
    pub visibility: Visibility,
    pub result: EvaluationResult,
    pub at: Timestamp,
    pub cause: ChangeCause,
}

type ChangeListener = Box<dyn Fn(&VisibilityChange) + Send + Sync>;

struct Shared<C: Clock> {
    evaluator: Mutex<WindowVisibilityEvaluator<C>>,
    on_change: ChangeListener,
}

impl<C: Clock> Shared<C> {
    /// Apply `update`, tick, and notify the listener if visibility flipped.
    /// Both happen under one lock so ticks and reconfiguration never interleave.
    fn refresh(
        &self,
        cause: ChangeCause,
        update: impl FnOnce(&mut WindowVisibilityEvaluator<C>),
    ) -> Option<VisibilityChange> {
        let mut evaluator = safe_lock(&self.evaluator, "Evaluator");
        update(&mut evaluator);

        if !evaluator.tick() {
            return None;
        }

        let result = evaluator.last_result()?;
        let at = evaluator.last_evaluated_at()?;
        let change = VisibilityChange {
            visibility: result.visibility(),
            result,
            at,
            cause,
        };

        info!("Notification now {} ({cause} at {at})", change.visibility);
        (self.on_change)(&change);
        Some(change)
    }
}

/// One evaluator paired with one tick schedule, as owned by a single host.
///
/// The evaluator is re-run on every tick and on every [`configure`](Self::configure).
/// Each `Hidden`/`Visible` transition is passed to the listener exactly once.
/// The listener runs while the evaluator is locked and must not call back
/// into the same watcher.
///
/// The tick schedule is cancelled by [`stop`](Self::stop) or on drop.
pub struct VisibilityWatcher<C: Clock + 'static = SystemClock> {
    shared: Arc<Shared<C>>,
    handle: CancellationHandle,
}

impl<C: Clock + 'static> VisibilityWatcher<C> {
    pub fn start<T, F>(
        ticker: &T,
        clock: C,
        config: Configuration,
        period: Duration,
        on_change: F,
    ) -> Self
    where
        T: Ticker + ?Sized,
        F: Fn(&VisibilityChange) + Send + Sync + 'static,
    {
        let shared = Arc::new(Shared {
            evaluator: Mutex::new(WindowVisibilityEvaluator::new(clock, config)),
            on_change: Box::new(on_change),
        });

        shared.refresh(ChangeCause::Start, |_| {});

        let handle = ticker.start(
            period,
            Box::new({
                let shared = Arc::clone(&shared);
                move || {
                    shared.refresh(ChangeCause::Tick, |_| {});
                }
            }),
        );
        info!("Visibility watcher started on schedule {}", handle.id());

        Self { shared, handle }
    }

    /// Replace the configuration and re-evaluate immediately.
    ///
    /// Returns the transition, if the new configuration caused one.
    pub fn configure(&self, config: Configuration) -> Option<VisibilityChange> {
        self.shared
            .refresh(ChangeCause::Configure, |evaluator| evaluator.configure(config))
    }

    pub fn configuration(&self) -> Configuration {
        safe_lock(&self.shared.evaluator, "Evaluator").configuration()
    }

    /// Fresh decision at the clock's current reading. Does not notify.
    pub fn current(&self) -> EvaluationResult {
        safe_lock(&self.shared.evaluator, "Evaluator").evaluate_now()
    }

    /// Visibility as last reported to the listener.
    pub fn visibility(&self) -> Visibility {
        safe_lock(&self.shared.evaluator, "Evaluator").visibility()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_cancelled()
    }

    /// Cancel the tick schedule. Safe to call more than once.
    pub fn stop(&self) {
        if self.is_running() {
            info!("Stopping visibility watcher on schedule {}", self.handle.id());
        }
        self.handle.cancel();
    }
}

impl<C: Clock + 'static> Drop for VisibilityWatcher<C> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::test_utils::{at, base_time};
    use crate::ticker::{ManualTicker, ThreadTicker};
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Log = Arc<Mutex<Vec<VisibilityChange>>>;

    fn setup(start_secs: i64) -> (ManualTicker, Log) {
        let ticker = ManualTicker::new(ManualClock::new(at(start_secs)));
        (ticker, Arc::new(Mutex::new(Vec::new())))
    }

    fn recorder(log: &Log) -> impl Fn(&VisibilityChange) + Send + Sync + 'static {
        let log = Arc::clone(log);
        move |change: &VisibilityChange| log.lock().unwrap().push(*change)
    }

    fn hour_window() -> Configuration {
        Configuration::window(base_time(), at(3600))
    }

    #[test]
    fn test_reports_each_transition_once() {
        let (ticker, log) = setup(-3);
        let watcher = VisibilityWatcher::start(
            &ticker,
            ticker.clock().clone(),
            hour_window(),
            Duration::from_secs(1),
            recorder(&log),
        );

        assert!(log.lock().unwrap().is_empty());

        ticker.advance(Duration::from_secs(10));
        {
            let changes = log.lock().unwrap();
            assert_eq!(changes.len(), 1);
            assert_eq!(changes[0].visibility, Visibility::Visible);
            assert_eq!(changes[0].cause, ChangeCause::Tick);
            assert_eq!(changes[0].at, base_time());
        }

        ticker.advance(Duration::from_secs(3600));
        let changes = log.lock().unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1].visibility, Visibility::Hidden);
        assert_eq!(changes[1].at, at(3601));
        assert_eq!(watcher.visibility(), Visibility::Hidden);
    }

    #[test]
    fn test_start_inside_window_reports_immediately() {
        let (ticker, log) = setup(10);
        let watcher = VisibilityWatcher::start(
            &ticker,
            ticker.clock().clone(),
            hour_window(),
            Duration::from_secs(1),
            recorder(&log),
        );

        let changes = log.lock().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].cause, ChangeCause::Start);
        assert!(watcher.current().visible);
    }

    #[test]
    fn test_configure_reevaluates_immediately() {
        let (ticker, log) = setup(10);
        let watcher = VisibilityWatcher::start(
            &ticker,
            ticker.clock().clone(),
            hour_window().with_enabled(false),
            Duration::from_secs(1),
            recorder(&log),
        );
        assert_eq!(watcher.visibility(), Visibility::Hidden);

        let change = watcher.configure(hour_window());
        assert_eq!(change.map(|c| c.cause), Some(ChangeCause::Configure));
        assert_eq!(watcher.visibility(), Visibility::Visible);
        assert_eq!(watcher.configuration(), hour_window());

        // Same decision again: nothing to report.
        assert!(watcher.configure(hour_window()).is_none());
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_stop_cancels_ticks() {
        let (ticker, log) = setup(-3);
        let watcher = VisibilityWatcher::start(
            &ticker,
            ticker.clock().clone(),
            hour_window(),
            Duration::from_secs(1),
            recorder(&log),
        );

        watcher.stop();
        watcher.stop();
        assert!(!watcher.is_running());

        ticker.advance(Duration::from_secs(60));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(ticker.active_schedules(), 0);
    }

    #[test]
    fn test_drop_cancels_ticks() {
        let (ticker, log) = setup(-3);
        let watcher = VisibilityWatcher::start(
            &ticker,
            ticker.clock().clone(),
            hour_window(),
            Duration::from_secs(1),
            recorder(&log),
        );
        assert_eq!(ticker.active_schedules(), 1);

        drop(watcher);

        ticker.advance(Duration::from_secs(60));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(ticker.active_schedules(), 0);
    }

    #[test]
    fn test_thread_ticker_watcher_stops_cleanly() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let now = SystemClock.now();
        let config = Configuration::window(now, now + chrono::Duration::hours(1));

        let watcher = VisibilityWatcher::start(
            &ThreadTicker::new(),
            SystemClock,
            config,
            Duration::from_millis(10),
            {
                let ticks = Arc::clone(&ticks);
                move |_: &VisibilityChange| {
                    ticks.fetch_add(1, Ordering::SeqCst);
                }
            },
        );

        assert_eq!(watcher.visibility(), Visibility::Visible);
        std::thread::sleep(Duration::from_millis(50));
        watcher.stop();

        // Only the initial transition; the window stays open throughout.
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
        assert!(!watcher.is_running());
    }
}
