use eventhub_core::{Navigator, NotificationKind, Notifier};
use parking_lot::Mutex;
use tracing::{error, info};

/// Navigator that keeps the pushed routes so a headless front end (or a
/// test) can follow them.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.history.lock().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn push(&self, path: &str) {
        info!(path, "navigate");
        self.history.lock().push(path.to_string());
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<(NotificationKind, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<(NotificationKind, String)> {
        self.notifications.lock().clone()
    }

    pub fn errors(&self) -> usize {
        self.notifications
            .lock()
            .iter()
            .filter(|(kind, _)| *kind == NotificationKind::Error)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.notifications.lock().push((kind, message.to_string()));
    }
}

/// Notifier for server-side use: notifications become log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Error => error!(notification = %kind, "{}", message),
            NotificationKind::Info => info!(notification = %kind, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_navigator_keeps_history() {
        let navigator = RecordingNavigator::new();
        assert_eq!(navigator.last(), None);
        navigator.push("/profile/edit");
        navigator.push("/organizations/o1");
        assert_eq!(navigator.history().len(), 2);
        assert_eq!(navigator.last().as_deref(), Some("/organizations/o1"));
    }

    #[test]
    fn test_recording_notifier_counts_errors() {
        let notifier = RecordingNotifier::new();
        notifier.notify(NotificationKind::Info, "saved");
        notifier.notify(NotificationKind::Error, "failed");
        assert_eq!(notifier.errors(), 1);
        assert_eq!(notifier.notifications()[0].1, "saved");

        TracingNotifier.notify(NotificationKind::Error, "logged only");
    }
}
