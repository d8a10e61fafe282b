//! Notification collaborator used to surface update prompts

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

/// Duration passed to `Notifier::show` for messages that must stay until hidden
pub const PERSISTENT: Duration = Duration::MAX;

/// Visual kind of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback attached to a notification, invoked when the user clicks it
pub type ClickHandler = Arc<dyn Fn() + Send + Sync>;

/// Renders transient or persistent messages in the host UI
pub trait Notifier: Send + Sync {
    /// Show `message`. A `duration` of [`PERSISTENT`] means the message is
    /// never dismissed automatically.
    fn show(
        &self,
        message: &str,
        kind: NotificationKind,
        duration: Duration,
        on_click: Option<ClickHandler>,
    );

    /// Dismiss every active notification
    fn hide(&self);
}

/// Notifier that writes messages to the log instead of a UI
///
/// Used by the command line `watch` mode.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(
        &self,
        message: &str,
        kind: NotificationKind,
        duration: Duration,
        _on_click: Option<ClickHandler>,
    ) {
        if duration == PERSISTENT {
            info!(kind = %kind, "{}", message);
        } else {
            info!(kind = %kind, duration_ms = duration.as_millis() as u64, "{}", message);
        }
    }

    fn hide(&self) {
        info!("Notification dismissed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_kind_displays_lowercase_name() {
        assert_eq!(NotificationKind::Info.to_string(), "info");
        assert_eq!(NotificationKind::Success.to_string(), "success");
        assert_eq!(NotificationKind::Warning.to_string(), "warning");
        assert_eq!(NotificationKind::Error.to_string(), "error");
    }
}
