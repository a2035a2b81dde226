//! Notifications shown on the terminal.

use paraiso_app::{Notification, Notifier, Severity};

/// Info goes to stdout, errors to stderr.
pub struct ConsoleNotifier;

pub fn format_notification(n: &Notification) -> String {
    let mark = match (n.severity, n.blocking) {
        (Severity::Info, _) => "✓",
        (Severity::Error, false) => "!",
        (Severity::Error, true) => "✗",
    };
    if n.description.is_empty() {
        format!("{mark} {}", n.title)
    } else {
        format!("{mark} {}: {}", n.title, n.description)
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, n: Notification) {
        tracing::debug!(title = %n.title, blocking = n.blocking, "notification");
        match n.severity {
            Severity::Info => println!("{}", format_notification(&n)),
            Severity::Error => eprintln!("{}", format_notification(&n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_by_severity() {
        assert_eq!(
            format_notification(&Notification::info("Report sent", "Thanks")),
            "✓ Report sent: Thanks"
        );
        assert_eq!(
            format_notification(&Notification::error("Error", "")),
            "! Error"
        );
        assert_eq!(
            format_notification(&Notification::blocking_error("Could not send", "offline")),
            "✗ Could not send: offline"
        );
    }
}
