use eventhub_core::{
    EventHubError, Navigator, NotificationKind, Notifier, OrganizationSearch,
    OrganizationSummary, Result, WorkflowConfig,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);
pub const DEFAULT_RESULT_CAP: usize = 5;

const SEARCH_FAILED_MESSAGE: &str = "Organization search failed. Please try again.";

pub fn organization_route(id: &str) -> String {
    format!("/organizations/{}", id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub debounce: Duration,
    pub result_cap: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            result_cap: DEFAULT_RESULT_CAP,
        }
    }
}

impl SearchOptions {
    pub fn from_config(config: &WorkflowConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.search_debounce_ms),
            result_cap: config.search_result_cap.max(1),
        }
    }
}

/// What the search panel currently renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSnapshot {
    pub query: String,
    /// At most `result_cap` entries.
    pub visible: Vec<OrganizationSummary>,
    pub total: usize,
    pub open: bool,
    pub loading: bool,
}

#[derive(Default)]
struct SearchState {
    query: String,
    results: Vec<OrganizationSummary>,
    open: bool,
    loading: bool,
    /// Sequence number of the newest request; older responses are dropped.
    issued: u64,
    timer: Option<JoinHandle<()>>,
}

struct SearchInner {
    search: Arc<dyn OrganizationSearch>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    options: SearchOptions,
    runtime: Handle,
    state: Mutex<SearchState>,
    snapshot_tx: watch::Sender<SearchSnapshot>,
}

impl SearchInner {
    fn snapshot_of(&self, st: &SearchState) -> SearchSnapshot {
        SearchSnapshot {
            query: st.query.clone(),
            visible: st
                .results
                .iter()
                .take(self.options.result_cap)
                .cloned()
                .collect(),
            total: st.results.len(),
            open: st.open,
            loading: st.loading,
        }
    }

    fn publish(&self, st: &SearchState) {
        self.snapshot_tx.send_replace(self.snapshot_of(st));
    }
}

/// Debounced organization search box.
///
/// Keystrokes restart a timer; only the query that survives the debounce
/// window reaches the search backend. Requests already sent are never
/// cancelled, but a response is applied only if it belongs to the most
/// recently issued request.
#[derive(Clone)]
pub struct OrganizationSearchController {
    inner: Arc<SearchInner>,
}

impl OrganizationSearchController {
    /// Must be called inside a tokio runtime; timers and requests are
    /// spawned onto it.
    pub fn new(
        search: Arc<dyn OrganizationSearch>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        options: SearchOptions,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| {
            EventHubError::InvalidOperation(
                "organization search must be created inside a tokio runtime".to_string(),
            )
        })?;
        let (snapshot_tx, _) = watch::channel(SearchSnapshot::default());
        Ok(Self {
            inner: Arc::new(SearchInner {
                search,
                navigator,
                notifier,
                options,
                runtime,
                state: Mutex::new(SearchState::default()),
                snapshot_tx,
            }),
        })
    }

    pub fn options(&self) -> SearchOptions {
        self.inner.options
    }

    /// The search box content changed.
    pub fn input(&self, query: &str) {
        let mut st = self.inner.state.lock();
        if let Some(timer) = st.timer.take() {
            timer.abort();
        }
        st.query = query.to_string();
        // Responses to anything still in flight answer an older query.
        st.issued += 1;
        st.loading = false;

        if query.trim().is_empty() {
            st.results.clear();
            st.open = false;
            self.inner.publish(&st);
            return;
        }

        let controller = self.clone();
        let query = query.to_string();
        let debounce = self.inner.options.debounce;
        let token = st.issued;
        st.timer = Some(self.inner.runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            controller.dispatch(token, query);
        }));
        self.inner.publish(&st);
    }

    /// Runs when a debounce timer fires. `token` is the sequence number at
    /// the time the timer was armed; any later input bumps it, so a timer
    /// that woke up after being superseded does nothing.
    fn dispatch(&self, token: u64, query: String) {
        let seq = {
            let mut st = self.inner.state.lock();
            if st.issued != token {
                debug!(query = %query, token, latest = st.issued, "debounce timer superseded");
                return;
            }
            st.timer = None;
            st.issued += 1;
            st.loading = true;
            self.inner.publish(&st);
            st.issued
        };

        debug!(query = %query, seq, "dispatching organization search");
        let controller = self.clone();
        // Detached: superseded requests run to completion and are ignored.
        self.inner.runtime.spawn(async move {
            let result = controller.inner.search.search_organizations(&query).await;
            controller.apply(seq, &query, result);
        });
    }

    fn apply(&self, seq: u64, query: &str, result: Result<Vec<OrganizationSummary>>) {
        let failed = {
            let mut st = self.inner.state.lock();
            if seq != st.issued {
                debug!(query, seq, latest = st.issued, "dropping stale search response");
                return;
            }
            st.loading = false;
            let failed = match result {
                Ok(results) => {
                    debug!(query, hits = results.len(), "organization search completed");
                    st.results = results;
                    st.open = true;
                    false
                }
                Err(e) => {
                    if e.is_fetch_failure() {
                        warn!(query, "organization search failed: {}", e);
                    } else {
                        error!(query, "organization search error: {}", e);
                    }
                    st.results.clear();
                    st.open = false;
                    true
                }
            };
            self.inner.publish(&st);
            failed
        };

        if failed {
            self.inner
                .notifier
                .notify(NotificationKind::Error, SEARCH_FAILED_MESSAGE);
        }
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        let st = self.inner.state.lock();
        self.inner.snapshot_of(&st)
    }

    pub fn changes(&self) -> watch::Receiver<SearchSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    pub fn query(&self) -> String {
        self.inner.state.lock().query.clone()
    }

    pub fn visible_results(&self) -> Vec<OrganizationSummary> {
        self.snapshot().visible
    }

    pub fn total_results(&self) -> usize {
        self.inner.state.lock().results.len()
    }

    pub fn is_open(&self) -> bool {
        self.inner.state.lock().open
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.lock().loading
    }

    /// Clicking outside the panel closes it; the query is kept.
    pub fn dismiss(&self) {
        let mut st = self.inner.state.lock();
        if st.open {
            st.open = false;
            self.inner.publish(&st);
        }
    }

    /// Focusing the box again reopens the panel for a non-empty query.
    pub fn focus(&self) {
        let mut st = self.inner.state.lock();
        if !st.open && !st.query.trim().is_empty() && !st.results.is_empty() {
            st.open = true;
            self.inner.publish(&st);
        }
    }

    /// Choose one of the visible results. Returns `false` if `id` is not on
    /// screen.
    pub fn select(&self, id: &str) -> bool {
        {
            let mut st = self.inner.state.lock();
            let cap = self.inner.options.result_cap;
            if !st.open || !st.results.iter().take(cap).any(|org| org.id == id) {
                debug!(id, "ignoring selection of an organization not on screen");
                return false;
            }
            st.open = false;
            self.inner.publish(&st);
        }
        self.inner.navigator.push(&organization_route(id));
        true
    }
}
