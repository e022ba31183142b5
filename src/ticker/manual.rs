use super::{CancellationHandle, TickCallback, Ticker, TickState};
use crate::clock::{Clock, ManualClock};
use crate::models::Timestamp;
use crate::safe_lock;
use log::warn;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Schedule {
    period: chrono::Duration,
    next_due: Mutex<Timestamp>,
    callback: Mutex<TickCallback>,
    state: Arc<TickState>,
}

/// Deterministic ticker driven by a [`ManualClock`].
///
/// Nothing fires until [`advance`](ManualTicker::advance) is called; ticks
/// then run on the caller's thread in due-time order, with the clock set to
/// each tick's due instant while its callback runs.
#[derive(Clone)]
pub struct ManualTicker {
    clock: ManualClock,
    schedules: Arc<Mutex<Vec<Arc<Schedule>>>>,
}

impl ManualTicker {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            schedules: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Number of schedules that have not been cancelled.
    pub fn active_schedules(&self) -> usize {
        safe_lock(&self.schedules, "ManualTicker")
            .iter()
            .filter(|s| !s.state.is_cancelled())
            .count()
    }

    /// Move virtual time forward by `by`, firing every tick that falls due.
    pub fn advance(&self, by: Duration) {
        let Ok(step) = chrono::Duration::from_std(by) else {
            warn!("ManualTicker: cannot advance by {by:?}");
            return;
        };
        let Some(target) = self.clock.now().checked_add_signed(step) else {
            warn!("ManualTicker: advancing by {by:?} overflows the clock");
            return;
        };

        while let Some((schedule, due)) = self.next_due_before(target) {
            self.clock.set(due);

            let following = due.checked_add_signed(schedule.period);
            if let Some(next) = following {
                *safe_lock(&schedule.next_due, "ManualTicker schedule") = next;
            }

            {
                let mut callback = safe_lock(&schedule.callback, "ManualTicker callback");
                schedule.state.invoke(&mut *callback);
            }

            if following.is_none() {
                warn!("ManualTicker: schedule ran past the end of the clock; dropping it");
                schedule.state.abandon();
            }
        }

        self.clock.set(target);
    }

    /// Earliest live schedule due at or before `target`. Drops cancelled ones.
    fn next_due_before(&self, target: Timestamp) -> Option<(Arc<Schedule>, Timestamp)> {
        let mut schedules = safe_lock(&self.schedules, "ManualTicker");
        schedules.retain(|s| !s.state.is_cancelled());

        schedules
            .iter()
            .map(|s| (Arc::clone(s), *safe_lock(&s.next_due, "ManualTicker schedule")))
            .filter(|(_, due)| *due <= target)
            .min_by_key(|(_, due)| *due)
    }
}

impl Ticker for ManualTicker {
    fn start(&self, period: Duration, callback: TickCallback) -> CancellationHandle {
        let handle = CancellationHandle::new();

        let period = match chrono::Duration::from_std(period) {
            Ok(p) if p > chrono::Duration::zero() => p,
            Ok(_) | Err(_) => {
                warn!("ManualTicker: schedule {} has an unusable period {period:?}", handle.id());
                handle.cancel();
                return handle;
            }
        };

        let Some(first_due) = self.clock.now().checked_add_signed(period) else {
            warn!("ManualTicker: schedule {} period {period} overflows the clock", handle.id());
            handle.cancel();
            return handle;
        };

        let schedule = Schedule {
            period,
            next_due: Mutex::new(first_due),
            callback: Mutex::new(callback),
            state: handle.state(),
        };
        safe_lock(&self.schedules, "ManualTicker").push(Arc::new(schedule));

        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, base_time};
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup() -> (ManualTicker, Arc<AtomicUsize>, TickCallback) {
        let ticker = ManualTicker::new(ManualClock::new(base_time()));
        let count = Arc::new(AtomicUsize::new(0));
        let callback: TickCallback = {
            let count = Arc::clone(&count);
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        (ticker, count, callback)
    }

    #[test]
    fn test_fires_once_per_elapsed_period() {
        let (ticker, count, callback) = setup();
        ticker.start(Duration::from_secs(1), callback);

        ticker.advance(Duration::from_millis(999));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        ticker.advance(Duration::from_millis(1));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        ticker.advance(Duration::from_secs(5));
        assert_eq!(count.load(Ordering::SeqCst), 6);
        assert_eq!(ticker.clock().now(), at(6));
    }

    #[test]
    fn test_callback_sees_due_time() {
        let ticker = ManualTicker::new(ManualClock::new(base_time()));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let callback: TickCallback = {
            let seen = Arc::clone(&seen);
            let clock = ticker.clock().clone();
            Box::new(move || seen.lock().unwrap().push(clock.now()))
        };
        ticker.start(Duration::from_secs(2), callback);
        ticker.advance(Duration::from_secs(5));

        assert_eq!(*seen.lock().unwrap(), vec![at(2), at(4)]);
        assert_eq!(ticker.clock().now(), at(5));
    }

    #[test]
    fn test_no_ticks_after_cancel() {
        let (ticker, count, callback) = setup();
        let handle = ticker.start(Duration::from_secs(1), callback);

        ticker.advance(Duration::from_secs(3));
        assert_eq!(count.load(Ordering::SeqCst), 3);

        ticker.cancel(&handle);
        ticker.cancel(&handle);
        ticker.advance(Duration::from_secs(10));

        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(ticker.active_schedules(), 0);
    }

    #[test]
    fn test_cancel_from_inside_callback() {
        let ticker = ManualTicker::new(ManualClock::new(base_time()));
        let count = Arc::new(AtomicUsize::new(0));
        let slot: Arc<Mutex<Option<CancellationHandle>>> = Arc::new(Mutex::new(None));

        let callback: TickCallback = {
            let count = Arc::clone(&count);
            let slot = Arc::clone(&slot);
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
                if let Some(handle) = slot.lock().unwrap().as_ref() {
                    handle.cancel();
                }
            })
        };

        let handle = ticker.start(Duration::from_secs(1), callback);
        *slot.lock().unwrap() = Some(handle);

        ticker.advance(Duration::from_secs(10));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_period_past_end_of_clock_is_cancelled() {
        let (ticker, count, callback) = setup();
        let ten_million_years = Duration::from_secs(10_000_000 * 365 * 86_400);

        let handle = ticker.start(ten_million_years, callback);

        assert!(handle.is_cancelled());
        assert_eq!(ticker.active_schedules(), 0);
        ticker.advance(Duration::from_secs(3));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_schedule_dropped_when_next_tick_overflows() {
        let near_end = DateTime::<Utc>::MAX_UTC - chrono::Duration::seconds(10);
        let ticker = ManualTicker::new(ManualClock::new(near_end));
        let count = Arc::new(AtomicUsize::new(0));
        let callback: TickCallback = {
            let count = Arc::clone(&count);
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };

        let handle = ticker.start(Duration::from_secs(8), callback);
        ticker.advance(Duration::from_secs(9));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(handle.is_cancelled());
        assert_eq!(ticker.active_schedules(), 0);
    }

    #[test]
    fn test_zero_period_is_cancelled() {
        let (ticker, count, callback) = setup();
        let handle = ticker.start(Duration::ZERO, callback);

        assert!(handle.is_cancelled());
        ticker.advance(Duration::from_secs(3));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
