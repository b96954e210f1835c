/// Outcome notifications
///
/// The controller and the filter engine report what happened through the
/// `Notifier` port. The app drains a `NotificationQueue` and shows the most
/// recent entry as a banner.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// One outcome message destined for the notification banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

/// Fire-and-forget sink for outcome messages
pub trait Notifier {
    fn show_error(&self, message: &str);
    fn show_warning(&self, message: &str);
    fn show_success(&self, message: &str);
}

/// Cloneable handle over a shared FIFO of notifications
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    pending: Arc<Mutex<VecDeque<Notification>>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn pending(&self) -> MutexGuard<'_, VecDeque<Notification>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, severity: Severity, message: &str) {
        self.pending().push_back(Notification {
            severity,
            message: message.to_string(),
        });
    }

    /// Take every pending notification, oldest first
    pub fn drain(&self) -> Vec<Notification> {
        self.pending().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending().is_empty()
    }
}

impl Notifier for NotificationQueue {
    fn show_error(&self, message: &str) {
        self.push(Severity::Error, message);
    }

    fn show_warning(&self, message: &str) {
        self.push(Severity::Warning, message);
    }

    fn show_success(&self, message: &str) {
        self.push(Severity::Success, message);
    }
}
