//! Timer abstraction for delayed and recurring work
//!
//! The checker never sleeps on its own; it asks a [`Scheduler`] for timers
//! and keeps the returned [`TimerHandle`] to cancel them. Tests substitute
//! a scheduler that fires timers on demand.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};

/// tokio intervals cannot be zero
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Work run by a timer. Called once per firing.
pub type Task = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Handle to a scheduled timer
///
/// Cancellation takes effect immediately: once `cancel` returns the timer
/// never fires again. Work already started by an earlier firing is allowed
/// to run to completion.
#[derive(Debug, Clone, Default)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    abort: Option<AbortHandle>,
}

impl TimerHandle {
    /// A handle not tied to a tokio task; schedulers that drive timers
    /// themselves check `is_cancelled` before firing.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_abort(abort: AbortHandle) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            abort: Some(abort),
        }
    }

    /// Stop the timer. Calling it more than once is harmless.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Creates timers
///
/// Implementations must not run `task` before returning the handle; callers
/// may hold locks while scheduling.
pub trait Scheduler: Send + Sync {
    /// Run `task` once after `delay`
    fn after(&self, delay: Duration, task: Task) -> TimerHandle;

    /// Run `task` every `interval`, first firing one interval from now.
    ///
    /// Firings do not wait for the previous run of `task` to finish.
    fn every(&self, interval: Duration, task: Task) -> TimerHandle;
}

/// Scheduler backed by the tokio runtime's timers
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn after(&self, delay: Duration, task: Task) -> TimerHandle {
        let join = tokio::spawn(async move {
            sleep(delay).await;
            task().await;
        });

        TimerHandle::with_abort(join.abort_handle())
    }

    fn every(&self, interval: Duration, task: Task) -> TimerHandle {
        let interval = interval.max(MIN_INTERVAL);
        let join = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                tokio::spawn(task());
            }
        });

        TimerHandle::with_abort(join.abort_handle())
    }
}
