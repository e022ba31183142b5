//! Periodic callbacks with cancellation.
//!
//! A [`Ticker`] invokes a callback once per period until the returned
//! [`CancellationHandle`] is cancelled. Once `cancel` returns, the callback
//! is never invoked again, even if it is called from inside the callback.

pub mod manual;
pub mod thread;

pub use manual::ManualTicker;
pub use thread::ThreadTicker;

use crate::safe_lock;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{JoinHandle, ThreadId};
use std::time::Duration;

/// Work run on every tick.
pub type TickCallback = Box<dyn FnMut() + Send + 'static>;

pub trait Ticker {
    /// Begin invoking `callback` every `period`.
    fn start(&self, period: Duration, callback: TickCallback) -> CancellationHandle;

    /// Stop future invocations. Idempotent.
    fn cancel(&self, handle: &CancellationHandle) {
        handle.cancel();
    }
}

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Shared between a ticker's worker and every clone of its handle.
#[derive(Debug, Default)]
pub(crate) struct TickState {
    cancelled: AtomicBool,
    /// Held for the whole of each callback invocation.
    gate: Mutex<()>,
    /// Paired with `sleep_lock` so `cancel` can interrupt a sleeping worker.
    wake: Condvar,
    sleep_lock: Mutex<()>,
    /// Thread currently inside the callback, if any.
    active: Mutex<Option<ThreadId>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TickState {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Run `f` unless cancelled, holding the gate so `cancel` can wait it out.
    /// Returns false if the tick was skipped because of cancellation.
    pub(crate) fn invoke(&self, f: impl FnOnce()) -> bool {
        let _gate = safe_lock(&self.gate, "Tick gate");
        if self.is_cancelled() {
            return false;
        }
        *safe_lock(&self.active, "Tick owner") = Some(std::thread::current().id());
        f();
        *safe_lock(&self.active, "Tick owner") = None;
        true
    }

    /// Sleep up to `timeout`, waking early on cancellation.
    /// Returns true if cancelled.
    pub(crate) fn sleep(&self, timeout: Duration) -> bool {
        let guard = safe_lock(&self.sleep_lock, "Tick sleep");
        let result = self
            .wake
            .wait_timeout_while(guard, timeout, |_| !self.is_cancelled());
        if result.is_err() {
            warn!("Tick sleep mutex was poisoned, recovering");
        }
        self.is_cancelled()
    }

    /// Mark cancelled from the worker itself, without waiting or joining.
    pub(crate) fn abandon(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_inside_callback(&self) -> bool {
        *safe_lock(&self.active, "Tick owner") == Some(std::thread::current().id())
    }

    pub(crate) fn attach_worker(&self, worker: JoinHandle<()>) {
        *safe_lock(&self.worker, "Tick worker") = Some(worker);
    }
}

/// Handle to a running tick schedule. Clones refer to the same schedule.
///
/// Dropping a handle does not cancel the schedule.
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    id: u64,
    state: Arc<TickState>,
}

impl CancellationHandle {
    pub(crate) fn new() -> Self {
        Self {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            state: Arc::new(TickState::default()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn state(&self) -> Arc<TickState> {
        Arc::clone(&self.state)
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }

    /// Stop future invocations.
    ///
    /// When called from another thread, waits for an in-flight invocation
    /// to finish and joins the worker thread. Safe to call repeatedly.
    pub fn cancel(&self) {
        let state = &self.state;
        if !state.cancelled.swap(true, Ordering::SeqCst) {
            debug!("Cancelling tick schedule {}", self.id);
        }

        {
            let _sleep = safe_lock(&state.sleep_lock, "Tick sleep");
            state.wake.notify_all();
        }

        if state.is_inside_callback() {
            // Inside our own callback; the worker exits once it returns.
            return;
        }

        drop(safe_lock(&state.gate, "Tick gate"));

        let worker = safe_lock(&state.worker, "Tick worker").take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                warn!("Tick worker {} panicked", self.id);
            }
        }
    }
}
