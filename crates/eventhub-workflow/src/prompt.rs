use eventhub_core::{
    is_incomplete, Clock, EventHubError, Navigator, NotificationKind, Notifier, ProfileStore,
    ReminderPolicy, Result, Session, SessionProvider, Subscription, UserId, WorkflowConfig,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

pub const PROFILE_EDIT_ROUTE: &str = "/profile/edit";

/// Keeps the prompt from flashing up during a page transition.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(500);

const LOAD_FAILED_MESSAGE: &str = "We couldn't load your profile. Please refresh to try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    /// No signed-in identity.
    Idle,
    /// Profile fetch (or reveal delay) in progress.
    Loading,
    Hidden,
    Visible,
}

/// Issued by [`CompletionPrompt::begin`] for one profile load. A ticket is
/// stale once the session identity changes again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    user_id: UserId,
}

impl LoadTicket {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

struct Machine {
    state: PromptState,
    generation: u64,
    user_id: Option<UserId>,
}

struct PromptInner {
    profiles: Arc<dyn ProfileStore>,
    reminder: ReminderPolicy,
    clock: Arc<dyn Clock>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    reveal_delay: Duration,
    machine: Mutex<Machine>,
    state_tx: watch::Sender<PromptState>,
}

/// Profile-completion prompt.
///
/// ```text
/// Idle --signed in--> Loading --incomplete & due--> Visible
///                        |                            | remind later / complete now
///                        +--otherwise / failure--> Hidden <-+
/// ```
///
/// Any identity change resets the machine; results of loads started for an
/// earlier identity are discarded.
#[derive(Clone)]
pub struct CompletionPrompt {
    inner: Arc<PromptInner>,
}

impl CompletionPrompt {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        reminder: ReminderPolicy,
        clock: Arc<dyn Clock>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        reveal_delay: Duration,
    ) -> Self {
        let (state_tx, _) = watch::channel(PromptState::Idle);
        Self {
            inner: Arc::new(PromptInner {
                profiles,
                reminder,
                clock,
                navigator,
                notifier,
                reveal_delay,
                machine: Mutex::new(Machine {
                    state: PromptState::Idle,
                    generation: 0,
                    user_id: None,
                }),
                state_tx,
            }),
        }
    }

    /// Reveal delay and reminder policy from the `[workflow]` section.
    pub fn from_config(
        config: &WorkflowConfig,
        profiles: Arc<dyn ProfileStore>,
        clock: Arc<dyn Clock>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::new(
            profiles,
            ReminderPolicy::from_config(config),
            clock,
            navigator,
            notifier,
            Duration::from_millis(config.prompt_reveal_delay_ms),
        )
    }

    pub fn reveal_delay(&self) -> Duration {
        self.inner.reveal_delay
    }

    pub fn state(&self) -> PromptState {
        self.inner.machine.lock().state
    }

    pub fn is_visible(&self) -> bool {
        self.state() == PromptState::Visible
    }

    pub fn watch(&self) -> watch::Receiver<PromptState> {
        self.inner.state_tx.subscribe()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.inner.machine.lock().user_id.clone()
    }

    fn set_state(&self, machine: &mut Machine, state: PromptState) {
        if machine.state != state {
            debug!(from = ?machine.state, to = ?state, "completion prompt transition");
        }
        machine.state = state;
        self.inner.state_tx.send_replace(state);
    }

    /// Synchronous half of a session transition: resets the machine and,
    /// for a signed-in identity, returns the ticket to pass to [`load`].
    ///
    /// [`load`]: CompletionPrompt::load
    pub fn begin(&self, session: Option<&Session>) -> Option<LoadTicket> {
        let mut machine = self.inner.machine.lock();
        machine.generation += 1;
        match session {
            None => {
                machine.user_id = None;
                self.set_state(&mut machine, PromptState::Idle);
                None
            }
            Some(session) => {
                machine.user_id = Some(session.user_id.clone());
                self.set_state(&mut machine, PromptState::Loading);
                Some(LoadTicket {
                    generation: machine.generation,
                    user_id: session.user_id.clone(),
                })
            }
        }
    }

    /// Moves out of `Loading` only if the ticket is still current.
    fn settle(&self, ticket: &LoadTicket, state: PromptState) -> bool {
        let mut machine = self.inner.machine.lock();
        if machine.generation != ticket.generation || machine.state != PromptState::Loading {
            debug!(user_id = %ticket.user_id, "discarding stale profile load");
            return false;
        }
        self.set_state(&mut machine, state);
        true
    }

    fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.inner.machine.lock().generation == ticket.generation
    }

    pub async fn load(&self, ticket: LoadTicket) {
        let result = self.inner.profiles.student_profile(&ticket.user_id).await;
        if !self.is_current(&ticket) {
            debug!(user_id = %ticket.user_id, "session changed during profile load");
            return;
        }

        let profile = match result {
            Ok(profile) => profile,
            Err(e) => {
                if e.is_fetch_failure() {
                    warn!(user_id = %ticket.user_id, "profile load failed: {}", e);
                } else {
                    error!(user_id = %ticket.user_id, "profile load error: {}", e);
                }
                if self.settle(&ticket, PromptState::Hidden) {
                    self.inner
                        .notifier
                        .notify(NotificationKind::Error, LOAD_FAILED_MESSAGE);
                }
                return;
            }
        };

        let incomplete = is_incomplete(profile.as_ref());
        let due = incomplete && self.inner.reminder.should_remind_at(self.inner.clock.now());
        debug!(user_id = %ticket.user_id, incomplete, due, "profile completeness evaluated");

        if !due {
            self.settle(&ticket, PromptState::Hidden);
            return;
        }

        tokio::time::sleep(self.inner.reveal_delay).await;
        if self.settle(&ticket, PromptState::Visible) {
            info!(user_id = %ticket.user_id, "showing profile completion prompt");
        }
    }

    pub async fn handle_session(&self, session: Option<&Session>) {
        if let Some(ticket) = self.begin(session) {
            self.load(ticket).await;
        }
    }

    /// Follow a session provider: every identity transition restarts the
    /// machine, and an already signed-in identity is picked up immediately.
    /// Loads run on the current tokio runtime.
    pub fn attach(&self, sessions: &SessionProvider) -> Result<Subscription> {
        let runtime = Handle::try_current().map_err(|_| {
            EventHubError::InvalidOperation(
                "completion prompt must be attached inside a tokio runtime".to_string(),
            )
        })?;

        let prompt = self.clone();
        let listener_runtime = runtime.clone();
        let subscription = sessions.subscribe(move |session| {
            if let Some(ticket) = prompt.begin(session) {
                let prompt = prompt.clone();
                listener_runtime.spawn(async move { prompt.load(ticket).await });
            }
        });

        if let Some(ticket) = self.begin(sessions.current().as_ref()) {
            let prompt = self.clone();
            runtime.spawn(async move { prompt.load(ticket).await });
        }

        Ok(subscription)
    }

    /// "Remind me later": persist the dismissal time and hide.
    pub fn remind_later(&self) -> bool {
        {
            let mut machine = self.inner.machine.lock();
            if machine.state != PromptState::Visible {
                debug!(state = ?machine.state, "remind later ignored");
                return false;
            }
            self.set_state(&mut machine, PromptState::Hidden);
        }
        self.inner.reminder.record_dismissal(self.inner.clock.now());
        true
    }

    /// "Complete now": hide and go to the profile editor.
    pub fn complete_now(&self) -> bool {
        {
            let mut machine = self.inner.machine.lock();
            if machine.state != PromptState::Visible {
                debug!(state = ?machine.state, "complete now ignored");
                return false;
            }
            self.set_state(&mut machine, PromptState::Hidden);
        }
        self.inner.navigator.push(PROFILE_EDIT_ROUTE);
        true
    }
}
