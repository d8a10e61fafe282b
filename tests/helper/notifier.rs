//! Notifier that records every call

use std::sync::Mutex;
use std::time::Duration;

use panel_update_check::update::notifier::{ClickHandler, NotificationKind, Notifier};

#[derive(Debug, Clone, PartialEq)]
pub enum NotifierCall {
    Show {
        message: String,
        kind: NotificationKind,
        duration: Duration,
        clickable: bool,
    },
    Hide,
}

#[derive(Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<NotifierCall>>,
    handlers: Mutex<Vec<ClickHandler>>,
}

impl RecordingNotifier {
    pub fn calls(&self) -> Vec<NotifierCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn show_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, NotifierCall::Show { .. }))
            .count()
    }

    pub fn hide_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, NotifierCall::Hide))
            .count()
    }

    /// Simulate a click on the most recently shown notification
    pub fn click_last(&self) {
        let handler = self.handlers.lock().unwrap().last().cloned();
        if let Some(handler) = handler {
            handler();
        }
    }
}

impl Notifier for RecordingNotifier {
    fn show(
        &self,
        message: &str,
        kind: NotificationKind,
        duration: Duration,
        on_click: Option<ClickHandler>,
    ) {
        self.calls.lock().unwrap().push(NotifierCall::Show {
            message: message.to_string(),
            kind,
            duration,
            clickable: on_click.is_some(),
        });
        if let Some(handler) = on_click {
            self.handlers.lock().unwrap().push(handler);
        }
    }

    fn hide(&self) {
        self.calls.lock().unwrap().push(NotifierCall::Hide);
    }
}
