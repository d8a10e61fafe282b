//! Update check state machine
//!
//! ```text
//!            start()
//! Idle ──────────────▶ Checking ──┬── error / unset ──▶ Idle
//!  ▲                              ├── parity ─────────▶ UpToDate ─▶ Idle
//!  │                              └── update ─────────▶ UpdateAvailable
//!  │                                                     │  (grace delay: show, start timer)
//!  │   tick: parity or error (hide, cancel timer)        ▼
//!  └──────────────────────────────────────────── Checking (every tick)
//! ```
//!
//! A checker owns its collaborators (manifest source, notifier, scheduler and
//! host version accessor) and its state. Failures never leave the checker:
//! they are logged and the user sees nothing.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::config::{CheckerConfig, DEFAULT_NOTIFY_DELAY_MS, DEFAULT_POLL_INTERVAL_MS};
use crate::update::error::CheckError;
use crate::update::host::{EnvHostVersion, HostVersion};
use crate::update::manifest::ManifestSource;
use crate::update::notifier::{ClickHandler, NotificationKind, Notifier, PERSISTENT};
use crate::update::scheduler::{Scheduler, Task, TimerHandle, TokioScheduler};
use crate::update::version::{UpdateStatus, compare};

/// Callback run when the user clicks the update notification
pub type UpdatePrompt = Arc<dyn Fn(&UpdateStatus) + Send + Sync>;

/// Timing knobs of the checker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckerSettings {
    /// Interval between re-checks while an update is available
    pub poll_interval: Duration,
    /// Delay between detecting an update and showing the notification
    pub notify_delay: Duration,
}

impl Default for CheckerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            notify_delay: Duration::from_millis(DEFAULT_NOTIFY_DELAY_MS),
        }
    }
}

impl From<&CheckerConfig> for CheckerSettings {
    fn from(config: &CheckerConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            notify_delay: config.notify_delay(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckPhase {
    #[default]
    Idle,
    Checking,
    UpToDate,
    UpdateAvailable,
}

/// Read-only view of the checker's state
#[derive(Debug, Clone, PartialEq)]
pub struct CheckerSnapshot {
    pub phase: CheckPhase,
    pub current_version: Option<String>,
    pub last_status: Option<UpdateStatus>,
    pub polling_active: bool,
    pub notification_visible: bool,
    pub last_checked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct CheckerState {
    current_version: Option<String>,
    last_status: Option<UpdateStatus>,
    phase: CheckPhase,
    polling_active: bool,
    notification_visible: bool,
    last_checked_at: Option<DateTime<Utc>>,
    grace_timer: Option<TimerHandle>,
    poll_timer: Option<TimerHandle>,
    /// Bumped whenever polling stops so late results can be discarded
    generation: u64,
}

impl CheckerState {
    /// Cancel every timer and leave polling. Returns whether a notification
    /// was showing and must be hidden.
    fn stop_polling(&mut self) -> bool {
        if let Some(timer) = self.grace_timer.take() {
            timer.cancel();
        }
        if let Some(timer) = self.poll_timer.take() {
            timer.cancel();
        }
        self.generation += 1;
        self.polling_active = false;
        self.phase = CheckPhase::Idle;
        std::mem::take(&mut self.notification_visible)
    }
}

/// In-flight flag shared by every kind of check
#[derive(Debug, Default)]
struct Busy {
    flag: AtomicBool,
    released: Notify,
}

impl Busy {
    fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard(self))
    }

    /// Wait for the check in flight, if any, then take the flag
    async fn acquire(&self) -> BusyGuard<'_> {
        loop {
            let released = self.released.notified();
            tokio::pin!(released);
            // Register before testing the flag so a release in between is not missed
            released.as_mut().enable();

            if let Some(guard) = self.try_acquire() {
                return guard;
            }
            released.await;
        }
    }
}

/// Clears the in-flight flag when the check finishes or is dropped
struct BusyGuard<'a>(&'a Busy);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.flag.store(false, Ordering::SeqCst);
        self.0.released.notify_waiters();
    }
}

/// Message shown while an update is available
pub fn update_message(status: &UpdateStatus) -> String {
    format!(
        "🎉 New version available! v{} → v{}",
        status.current_version, status.latest_version
    )
}

pub struct UpdateCheckerBuilder {
    source: Arc<dyn ManifestSource>,
    notifier: Arc<dyn Notifier>,
    scheduler: Arc<dyn Scheduler>,
    host: Arc<dyn HostVersion>,
    on_click: Option<UpdatePrompt>,
    settings: CheckerSettings,
}

impl UpdateCheckerBuilder {
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn host_version(mut self, host: Arc<dyn HostVersion>) -> Self {
        self.host = host;
        self
    }

    pub fn on_click(mut self, prompt: UpdatePrompt) -> Self {
        self.on_click = Some(prompt);
        self
    }

    pub fn settings(mut self, settings: CheckerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Arc<UpdateChecker> {
        Arc::new_cyclic(|this| UpdateChecker {
            source: self.source,
            notifier: self.notifier,
            scheduler: self.scheduler,
            host: self.host,
            on_click: self.on_click,
            settings: self.settings,
            state: Mutex::new(CheckerState::default()),
            busy: Busy::default(),
            this: this.clone(),
        })
    }
}

/// Polls the remote manifest and keeps an update notification in sync
pub struct UpdateChecker {
    source: Arc<dyn ManifestSource>,
    notifier: Arc<dyn Notifier>,
    scheduler: Arc<dyn Scheduler>,
    host: Arc<dyn HostVersion>,
    on_click: Option<UpdatePrompt>,
    settings: CheckerSettings,
    state: Mutex<CheckerState>,
    busy: Busy,
    this: Weak<UpdateChecker>,
}

impl UpdateChecker {
    /// Start building a checker. Defaults: tokio timers, the version read
    /// from the environment, no click prompt, default timings.
    pub fn builder(
        source: Arc<dyn ManifestSource>,
        notifier: Arc<dyn Notifier>,
    ) -> UpdateCheckerBuilder {
        UpdateCheckerBuilder {
            source,
            notifier,
            scheduler: Arc::new(TokioScheduler),
            host: Arc::new(EnvHostVersion::default()),
            on_click: None,
            settings: CheckerSettings::default(),
        }
    }

    fn state(&self) -> MutexGuard<'_, CheckerState> {
        // Poisoning is ignored
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the running version explicitly instead of asking the host
    pub fn set_current_version(&self, version: &str) {
        self.state().current_version = Some(version.to_string());
    }

    pub fn snapshot(&self) -> CheckerSnapshot {
        let state = self.state();
        CheckerSnapshot {
            phase: state.phase,
            current_version: state.current_version.clone(),
            last_status: state.last_status.clone(),
            polling_active: state.polling_active,
            notification_visible: state.notification_visible,
            last_checked_at: state.last_checked_at,
        }
    }

    pub fn is_polling(&self) -> bool {
        self.state().polling_active
    }

    /// Run one comparison round without touching the notifier.
    ///
    /// Fails with [`CheckError::Busy`] when another check is in flight.
    pub async fn check(&self) -> Result<UpdateStatus, CheckError> {
        let Some(_busy) = self.busy.try_acquire() else {
            return Err(CheckError::Busy);
        };
        self.run_check().await
    }

    /// Initial check. Shows the update notification (after the grace delay)
    /// and starts polling when the remote version is newer.
    ///
    /// Does nothing while polling is already active; use [`restart`](Self::restart)
    /// to re-initialize.
    pub async fn start(&self) {
        let Some(busy) = self.busy.try_acquire() else {
            debug!("Update check already in flight, skipping start");
            return;
        };
        self.initial_check(busy).await;
    }

    async fn initial_check(&self, _busy: BusyGuard<'_>) {
        if self.is_polling() {
            info!("Update polling already active, ignoring start");
            return;
        }

        info!("Starting update check");
        let generation = {
            let mut state = self.state();
            state.phase = CheckPhase::Checking;
            state.generation
        };

        let result = self.run_check().await;

        let mut state = self.state();
        if state.generation != generation {
            debug!("Checker stopped during initial check, discarding result");
            return;
        }

        match result {
            Ok(status) if status.has_update => {
                info!(
                    "Update available: {} -> {}",
                    status.current_version, status.latest_version
                );
                state.phase = CheckPhase::UpdateAvailable;
                state.polling_active = true;

                let task = self.task(move |checker| async move {
                    checker.on_notify_delay_elapsed(generation);
                });
                state.grace_timer = Some(self.scheduler.after(self.settings.notify_delay, task));
            }
            Ok(status) => {
                info!("Version {} is up to date", status.current_version);
                state.phase = CheckPhase::Idle;
            }
            Err(e) => {
                warn!("Update check failed: {}", e);
                state.phase = CheckPhase::Idle;
            }
        }
    }

    /// One periodic re-check. Dismisses the notification and stops polling
    /// once the running version catches up or the check fails.
    pub async fn tick(&self) {
        let Some(_busy) = self.busy.try_acquire() else {
            debug!("Previous update check still in flight, skipping tick");
            return;
        };

        let generation = {
            let mut state = self.state();
            if !state.polling_active {
                debug!("Polling not active, skipping tick");
                return;
            }
            state.phase = CheckPhase::Checking;
            state.generation
        };

        debug!("Periodic update check");
        let result = self.run_check().await;

        let mut state = self.state();
        if state.generation != generation {
            debug!("Polling stopped during check, discarding result");
            return;
        }

        match result {
            Ok(status) if status.has_update => {
                debug!("Update still available: {}", status.latest_version);
                state.phase = CheckPhase::UpdateAvailable;
                return;
            }
            Ok(status) => {
                info!(
                    "Version {} is up to date, dismissing update notification",
                    status.current_version
                );
                state.phase = CheckPhase::UpToDate;
            }
            Err(e) => {
                warn!("Periodic update check failed, stopping polling: {}", e);
            }
        }

        let was_visible = state.stop_polling();
        drop(state);
        if was_visible {
            self.notifier.hide();
        }
    }

    /// Stop polling immediately and dismiss the notification if shown.
    ///
    /// A check still in flight finishes without effect.
    pub fn shutdown(&self) {
        let was_visible = self.state().stop_polling();
        if was_visible {
            self.notifier.hide();
        }
        info!("Update checker stopped");
    }

    /// Re-initialize: stop everything, then run the initial check again.
    ///
    /// A check still in flight is waited for (its result is discarded) so the
    /// initial check always runs.
    pub async fn restart(&self) {
        self.shutdown();
        let busy = self.busy.acquire().await;
        self.initial_check(busy).await;
    }

    async fn run_check(&self) -> Result<UpdateStatus, CheckError> {
        let current = self
            .resolve_current_version()
            .ok_or(CheckError::UnsetLocalVersion)?;
        debug!("Current version: {}", current);

        let manifest = self.source.fetch_manifest().await?;
        debug!("Remote version: {}", manifest.version);

        let status = compare(&current, &manifest.version);

        let mut state = self.state();
        state.last_status = Some(status.clone());
        state.last_checked_at = Some(Utc::now());

        Ok(status)
    }

    fn resolve_current_version(&self) -> Option<String> {
        let cached = self.state().current_version.clone();
        if cached.is_some() {
            return cached;
        }

        let Some(version) = self.host.current_version() else {
            warn!("Current version is not available from the host");
            return None;
        };
        self.state().current_version = Some(version.clone());
        Some(version)
    }

    fn on_notify_delay_elapsed(&self, generation: u64) {
        let status = {
            let mut state = self.state();
            if state.generation != generation || !state.polling_active {
                return;
            }
            let Some(status) = state.last_status.clone() else {
                return;
            };

            state.grace_timer = None;
            state.notification_visible = true;

            let task = self.task(|checker| async move { checker.tick().await });
            state.poll_timer = Some(self.scheduler.every(self.settings.poll_interval, task));
            status
        };

        info!("Showing update notification");
        self.notifier.show(
            &update_message(&status),
            NotificationKind::Info,
            PERSISTENT,
            Some(self.click_handler(status)),
        );
    }

    fn click_handler(&self, status: UpdateStatus) -> ClickHandler {
        let prompt = self.on_click.clone();
        Arc::new(move || {
            info!("Update notification clicked");
            if let Some(prompt) = &prompt {
                prompt(&status);
            }
        })
    }

    /// Wrap work for a timer. The timer only holds a weak reference, so a
    /// dropped checker turns its pending timers into no-ops.
    fn task<F, Fut>(&self, work: F) -> Task
    where
        F: Fn(Arc<UpdateChecker>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let this = self.this.clone();
        Arc::new(move || match this.upgrade() {
            Some(checker) => work(checker).boxed(),
            None => async {}.boxed(),
        })
    }
}

impl Drop for UpdateChecker {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if state.stop_polling() {
            self.notifier.hide();
        }
    }
}
