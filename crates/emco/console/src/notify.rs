use std::fmt;

use strum::Display;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { severity, message } = self;
        write!(f, "[{severity}] {message}")
    }
}

/// The sending half of the operator-facing message queue.
#[derive(Clone, Debug)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    pub fn channel() -> (Self, Notifications) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, Notifications { rx })
    }

    pub fn notify(&self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Success | Severity::Info => info!("{message}"),
            Severity::Warning => warn!("{message}"),
            Severity::Error => error!("{message}"),
        }

        // nobody is listening once the view is gone
        let _ = self.tx.send(Notification { severity, message });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(Severity::Success, message)
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(Severity::Info, message)
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.notify(Severity::Warning, message)
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(Severity::Error, message)
    }
}

#[derive(Debug)]
pub struct Notifications {
    rx: mpsc::UnboundedReceiver<Notification>,
}

impl Notifications {
    /// Takes every queued notification.
    pub fn drain(&mut self) -> Vec<Notification> {
        let mut notifications = Vec::default();
        while let Ok(notification) = self.rx.try_recv() {
            notifications.push(notification);
        }
        notifications
    }

    pub async fn next(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_in_order() {
        let (notifier, mut notifications) = Notifier::channel();
        notifier.success("created");
        notifier.warning("careful");

        let drained = notifications.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].to_string(), "[success] created");
        assert_eq!(drained[1].severity, Severity::Warning);
        assert!(notifications.drain().is_empty());
    }
}
