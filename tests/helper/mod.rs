//! Shared test utilities for update checker tests

#![allow(dead_code)]

pub mod notifier;
pub mod scheduler;
pub mod source;

pub use notifier::{NotifierCall, RecordingNotifier};
pub use scheduler::{ManualScheduler, TimerKind};
pub use source::ScriptedSource;

use std::sync::Arc;

use panel_update_check::update::checker::{UpdateChecker, UpdateCheckerBuilder};
use panel_update_check::update::host::FixedHostVersion;

/// Everything a checker under test talks to
pub struct Harness {
    pub source: Arc<ScriptedSource>,
    pub notifier: Arc<RecordingNotifier>,
    pub scheduler: Arc<ManualScheduler>,
}

impl Harness {
    /// Remote manifest reports `remote_version`
    pub fn new(remote_version: &str) -> Self {
        Self {
            source: ScriptedSource::version(remote_version),
            notifier: Arc::new(RecordingNotifier::default()),
            scheduler: Arc::new(ManualScheduler::default()),
        }
    }

    /// Builder wired to the harness collaborators, with the running version set
    pub fn builder(&self, current_version: &str) -> UpdateCheckerBuilder {
        UpdateChecker::builder(self.source.clone(), self.notifier.clone())
            .scheduler(self.scheduler.clone())
            .host_version(Arc::new(FixedHostVersion::new(current_version)))
    }

    pub fn checker(&self, current_version: &str) -> Arc<UpdateChecker> {
        self.builder(current_version).build()
    }
}

/// Yield to the runtime until `condition` holds, so spawned tasks can make progress
pub async fn yield_until(condition: impl Fn() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
