use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, WorkflowConfig};

/// Client-storage key holding the last dismissal of the completion prompt.
///
/// The key is shared by every account signed in from the same client
/// storage, not scoped per user id.
pub const REMINDER_STORAGE_KEY: &str = "profileReminder";

pub const DEFAULT_REMINDER_WINDOW_HOURS: i64 = 24;

/// `true` when the prompt has never been dismissed, or when strictly more
/// than 24 hours have passed since the last dismissal.
pub fn should_remind(last_dismissed_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    should_remind_within(
        last_dismissed_at,
        now,
        Duration::hours(DEFAULT_REMINDER_WINDOW_HOURS),
    )
}

pub fn should_remind_within(
    last_dismissed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    window: Duration,
) -> bool {
    match last_dismissed_at {
        None => true,
        Some(last) => now.signed_duration_since(last) > window,
    }
}

/// Reminder suppression backed by an injected key-value store.
///
/// Storage failures never surface to the caller: an unreadable value is
/// treated as "never dismissed", and a failed write is logged.
#[derive(Clone)]
pub struct ReminderPolicy {
    storage: Arc<dyn KeyValueStore>,
    window: Duration,
}

impl ReminderPolicy {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            window: Duration::hours(DEFAULT_REMINDER_WINDOW_HOURS),
        }
    }

    /// Storage and window from the `[workflow]` section: a JSON file when
    /// `client_storage_path` is set, process memory otherwise.
    pub fn from_config(config: &WorkflowConfig) -> Self {
        let storage: Arc<dyn KeyValueStore> = match &config.client_storage_path {
            Some(path) => {
                debug!(path = %path.display(), "reminder dismissals stored on disk");
                Arc::new(FileKeyValueStore::new(path))
            }
            None => Arc::new(InMemoryKeyValueStore::new()),
        };
        Self::new(storage).with_window(Duration::hours(config.reminder_window_hours))
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn last_dismissed_at(&self) -> Option<DateTime<Utc>> {
        let raw = match self.storage.get(REMINDER_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("reminder storage unavailable, treating as never dismissed: {}", e);
                return None;
            }
        };

        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(e) => {
                warn!(value = %raw, "ignoring unparsable reminder timestamp: {}", e);
                None
            }
        }
    }

    pub fn should_remind_at(&self, now: DateTime<Utc>) -> bool {
        should_remind_within(self.last_dismissed_at(), now, self.window)
    }

    pub fn record_dismissal(&self, now: DateTime<Utc>) {
        let value = now.to_rfc3339();
        match self.storage.set(REMINDER_STORAGE_KEY, &value) {
            Ok(()) => debug!(dismissed_at = %value, "profile reminder dismissed"),
            Err(e) => warn!("failed to persist reminder dismissal: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventHubError, InMemoryKeyValueStore, Result};
    use chrono::TimeZone;

    fn at(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, min, sec).unwrap()
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(EventHubError::Storage("quota exceeded".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(EventHubError::Storage("quota exceeded".into()))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(EventHubError::Storage("quota exceeded".into()))
        }
    }

    #[test]
    fn test_never_dismissed_always_reminds() {
        assert!(should_remind(None, at(0, 0, 0)));
        assert!(should_remind(None, Utc::now()));
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        let t = at(8, 0, 0);
        assert!(!should_remind(Some(t), t));
        assert!(!should_remind(Some(t), t + Duration::hours(23)));
        assert!(!should_remind(Some(t), t + Duration::hours(24)));
        assert!(should_remind(Some(t), t + Duration::hours(24) + Duration::seconds(1)));
    }

    #[test]
    fn test_policy_persists_dismissal() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let policy = ReminderPolicy::new(store.clone());
        let now = at(9, 30, 0);

        assert!(policy.should_remind_at(now));
        policy.record_dismissal(now);

        assert_eq!(policy.last_dismissed_at(), Some(now));
        assert!(store.get(REMINDER_STORAGE_KEY).unwrap().is_some());
        assert!(!policy.should_remind_at(now + Duration::hours(1)));
        assert!(policy.should_remind_at(now + Duration::hours(25)));
    }

    #[test]
    fn test_unavailable_storage_fails_open() {
        let policy = ReminderPolicy::new(Arc::new(BrokenStore));
        assert_eq!(policy.last_dismissed_at(), None);
        assert!(policy.should_remind_at(at(10, 0, 0)));
        // must not panic
        policy.record_dismissal(at(10, 0, 0));
    }

    #[test]
    fn test_garbage_timestamp_is_ignored() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        store.set(REMINDER_STORAGE_KEY, "yesterday-ish").unwrap();
        let policy = ReminderPolicy::new(store);
        assert_eq!(policy.last_dismissed_at(), None);
    }

    #[test]
    fn test_custom_window() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let policy = ReminderPolicy::new(store).with_window(Duration::hours(1));
        let now = at(12, 0, 0);
        policy.record_dismissal(now);
        assert!(!policy.should_remind_at(now + Duration::minutes(59)));
        assert!(policy.should_remind_at(now + Duration::minutes(61)));
    }
}
