use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

use crate::Session;

pub type SessionListener = Arc<dyn Fn(Option<&Session>) + Send + Sync>;

struct SessionInner {
    current: RwLock<Option<Session>>,
    listeners: RwLock<BTreeMap<u64, SessionListener>>,
    next_id: AtomicU64,
}

/// Holds the authenticated identity and tells subscribers about every
/// identity transition (sign-in, sign-out, account switch).
///
/// Re-setting the same identity is not a transition and notifies nobody.
#[derive(Clone)]
pub struct SessionProvider {
    inner: Arc<SessionInner>,
}

impl Default for SessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                current: RwLock::new(None),
                listeners: RwLock::new(BTreeMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.inner.current.read().clone()
    }

    pub fn sign_in(&self, session: Session) {
        self.set(Some(session));
    }

    pub fn sign_out(&self) {
        self.set(None);
    }

    pub fn set(&self, session: Option<Session>) {
        {
            let mut current = self.inner.current.write();
            let same_identity = match (current.as_ref(), session.as_ref()) {
                (Some(a), Some(b)) => a.user_id == b.user_id,
                (None, None) => true,
                _ => false,
            };
            *current = session.clone();
            if same_identity {
                return;
            }
        }

        debug!(
            user_id = session.as_ref().map(|s| s.user_id.as_str()).unwrap_or("<none>"),
            "session identity changed"
        );

        // Listeners run without any lock held so they may call back in.
        let listeners: Vec<SessionListener> =
            self.inner.listeners.read().values().cloned().collect();
        for listener in listeners {
            listener(session.as_ref());
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(Option<&Session>) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.write().insert(id, Arc::new(listener));
        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.read().len()
    }
}

/// Unsubscribes on drop. Call [`Subscription::detach`] to keep the listener
/// registered for the provider's lifetime.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    inner: Weak<SessionInner>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }

    pub fn detach(mut self) {
        self.inner = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.listeners.write().remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<Option<String>>>>, impl Fn(Option<&Session>) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |s: Option<&Session>| {
            sink.lock().push(s.map(|s| s.user_id.clone()))
        })
    }

    #[test]
    fn test_notifies_on_identity_transitions() {
        let provider = SessionProvider::new();
        let (seen, listener) = recorder();
        let _sub = provider.subscribe(listener);

        provider.sign_in(Session::student("u1"));
        provider.sign_in(Session::student("u1"));
        provider.sign_in(Session::student("u2"));
        provider.sign_out();
        provider.sign_out();

        assert_eq!(
            *seen.lock(),
            vec![Some("u1".to_string()), Some("u2".to_string()), None]
        );
        assert_eq!(provider.current(), None);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let provider = SessionProvider::new();
        let (seen, listener) = recorder();
        let sub = provider.subscribe(listener);
        assert_eq!(provider.subscriber_count(), 1);

        provider.sign_in(Session::student("u1"));
        sub.unsubscribe();
        assert_eq!(provider.subscriber_count(), 0);
        provider.sign_out();

        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_detached_subscription_outlives_handle() {
        let provider = SessionProvider::new();
        let (seen, listener) = recorder();
        provider.subscribe(listener).detach();

        provider.sign_in(Session::student("u1"));
        assert_eq!(seen.lock().len(), 1);
        assert_eq!(provider.subscriber_count(), 1);
    }

    #[test]
    fn test_listener_may_read_provider() {
        let provider = SessionProvider::new();
        let reader = provider.clone();
        let observed = Arc::new(Mutex::new(None));
        let sink = observed.clone();
        let _sub = provider.subscribe(move |_| {
            *sink.lock() = reader.current().map(|s| s.user_id);
        });

        provider.sign_in(Session::student("u9"));
        assert_eq!(observed.lock().as_deref(), Some("u9"));
    }
}
