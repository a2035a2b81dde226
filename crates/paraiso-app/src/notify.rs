//! User-facing notifications: the side channel that tells a failed fetch
//! apart from an empty result.

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub description: String,
    /// Must be acknowledged (submission faults) rather than shown as a toast.
    pub blocking: bool,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            title: title.into(),
            description: description.into(),
            blocking: false,
        }
    }

    /// A toast: the screen stays usable.
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            title: title.into(),
            description: description.into(),
            blocking: false,
        }
    }

    pub fn blocking_error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            blocking: true,
            ..Self::error(title, description)
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Keeps every notification for later inspection.
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn errors(&self) -> Vec<Notification> {
        self.all().into_iter().filter(Notification::is_error).collect()
    }

    /// Drain what has been recorded so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.seen.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocking_error_is_error() {
        let n = Notification::blocking_error("Could not send", "try again");
        assert!(n.is_error());
        assert!(n.blocking);
        assert!(!Notification::error("x", "y").blocking);
    }

    #[test]
    fn recording_keeps_order_and_drains() {
        let rec = RecordingNotifier::new();
        rec.notify(Notification::info("a", ""));
        rec.notify(Notification::error("b", ""));
        assert_eq!(rec.errors().len(), 1);
        let drained = rec.take();
        assert_eq!(drained[0].title, "a");
        assert_eq!(drained[1].title, "b");
        assert!(rec.all().is_empty());
    }
}
