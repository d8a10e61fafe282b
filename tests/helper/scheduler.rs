//! Scheduler that fires timers only when a test asks it to

use std::sync::Mutex;
use std::time::Duration;

use panel_update_check::update::scheduler::{Scheduler, Task, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    After,
    Every,
}

struct Timer {
    kind: TimerKind,
    duration: Duration,
    task: Task,
    handle: TimerHandle,
    fired: bool,
}

impl Timer {
    fn is_pending(&self) -> bool {
        !self.handle.is_cancelled() && !(self.kind == TimerKind::After && self.fired)
    }
}

/// Records timers and runs them on demand
#[derive(Default)]
pub struct ManualScheduler {
    timers: Mutex<Vec<Timer>>,
}

impl ManualScheduler {
    fn push(&self, kind: TimerKind, duration: Duration, task: Task) -> TimerHandle {
        let handle = TimerHandle::new();
        self.timers.lock().unwrap().push(Timer {
            kind,
            duration,
            task,
            handle: handle.clone(),
            fired: false,
        });
        handle
    }

    /// Number of timers of `kind` ever scheduled
    pub fn scheduled(&self, kind: TimerKind) -> usize {
        self.timers
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.kind == kind)
            .count()
    }

    /// Number of timers of `kind` that may still fire
    pub fn pending(&self, kind: TimerKind) -> usize {
        self.timers
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.kind == kind && t.is_pending())
            .count()
    }

    /// Durations of every timer of `kind` ever scheduled
    pub fn durations(&self, kind: TimerKind) -> Vec<Duration> {
        self.timers
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.duration)
            .collect()
    }

    /// Task of the pending recurring timer, for tests that drive ticks by hand
    pub fn every_task(&self) -> Option<Task> {
        self.timers
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.kind == TimerKind::Every && t.is_pending())
            .map(|t| t.task.clone())
    }

    /// Fire every pending one-shot timer, as if its delay elapsed
    pub async fn elapse_delays(&self) {
        let tasks: Vec<Task> = {
            let mut timers = self.timers.lock().unwrap();
            timers
                .iter_mut()
                .filter(|t| t.kind == TimerKind::After && t.is_pending())
                .map(|t| {
                    t.fired = true;
                    t.task.clone()
                })
                .collect()
        };

        for task in tasks {
            task().await;
        }
    }

    /// Fire one tick of every pending recurring timer and wait for it
    pub async fn tick(&self) {
        let tasks: Vec<Task> = self
            .timers
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.kind == TimerKind::Every && t.is_pending())
            .map(|t| t.task.clone())
            .collect();

        for task in tasks {
            task().await;
        }
    }
}

impl Scheduler for ManualScheduler {
    fn after(&self, delay: Duration, task: Task) -> TimerHandle {
        self.push(TimerKind::After, delay, task)
    }

    fn every(&self, interval: Duration, task: Task) -> TimerHandle {
        self.push(TimerKind::Every, interval, task)
    }
}
