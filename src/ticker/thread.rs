use super::{CancellationHandle, TickCallback, Ticker};
use log::{info, warn};
use std::thread;
use std::time::{Duration, Instant};

/// Runs each schedule on its own background thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadTicker;

impl ThreadTicker {
    pub fn new() -> Self {
        Self
    }
}

impl Ticker for ThreadTicker {
    fn start(&self, period: Duration, mut callback: TickCallback) -> CancellationHandle {
        let handle = CancellationHandle::new();
        let state = handle.state();
        let id = handle.id();

        if period.is_zero() {
            warn!("Tick schedule {id} requested a zero period; it will never fire");
            handle.cancel();
            return handle;
        }

        let Some(first_due) = Instant::now().checked_add(period) else {
            warn!("Tick schedule {id} period {period:?} is out of range; it will never fire");
            handle.cancel();
            return handle;
        };

        let worker = thread::Builder::new()
            .name(format!("noticewindow-tick-{id}"))
            .spawn({
                let state = handle.state();
                move || {
                    let mut next_due = first_due;

                    loop {
                        let remaining = next_due.saturating_duration_since(Instant::now());
                        if state.sleep(remaining) {
                            break;
                        }
                        // A wakeup before the deadline without cancellation is spurious.
                        if Instant::now() < next_due {
                            continue;
                        }
                        if !state.invoke(&mut callback) {
                            break;
                        }

                        let now = Instant::now();
                        // Missed ticks are dropped rather than replayed.
                        let following = next_due
                            .checked_add(period)
                            .filter(|due| *due > now)
                            .or_else(|| now.checked_add(period));
                        match following {
                            Some(due) => next_due = due,
                            None => {
                                warn!("Tick schedule {id} ran past the end of the clock; stopping");
                                state.abandon();
                                break;
                            }
                        }
                    }
                }
            });

        match worker {
            Ok(worker) => {
                info!("Tick schedule {id} started every {period:?}");
                state.attach_worker(worker);
            }
            Err(e) => {
                warn!("Failed to spawn tick thread for schedule {id}: {e}");
                handle.cancel();
            }
        }

        handle
    }
}
