//! Headless state machines behind the student dashboard: the
//! profile-completion prompt and the organization search box.
//!
//! Both are UI-framework agnostic. A front end reads their state (or
//! watches it through a `tokio::sync::watch` receiver) and calls their
//! actions; navigation and notifications go out through the
//! [`eventhub_core::Navigator`] and [`eventhub_core::Notifier`] traits.

pub mod adapters;
pub mod prompt;
pub mod search;

pub use adapters::{RecordingNavigator, RecordingNotifier, TracingNotifier};
pub use prompt::{CompletionPrompt, LoadTicket, PromptState, DEFAULT_REVEAL_DELAY, PROFILE_EDIT_ROUTE};
pub use search::{
    organization_route, OrganizationSearchController, SearchOptions, SearchSnapshot,
    DEFAULT_DEBOUNCE, DEFAULT_RESULT_CAP,
};
