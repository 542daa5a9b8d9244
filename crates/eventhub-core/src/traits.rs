use crate::{
    Event, EventId, NotificationKind, OrganizationId, OrganizationSummary, Result, StudentProfile,
    UserProfile,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Document-store access for user and student records.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn user_profile(&self, id: &str) -> Result<UserProfile>;
    /// `Ok(None)` when the user exists but has no student record yet.
    async fn student_profile(&self, id: &str) -> Result<Option<StudentProfile>>;
    async fn save_student(&self, profile: StudentProfile) -> Result<()>;
}

/// Organization lookup by free text. Callers never pass an empty query.
#[async_trait]
pub trait OrganizationSearch: Send + Sync {
    async fn search_organizations(&self, text: &str) -> Result<Vec<OrganizationSummary>>;
}

#[async_trait]
pub trait EventCatalog: Send + Sync {
    async fn event(&self, id: &str) -> Result<Event>;
    async fn upcoming_events(&self, after: DateTime<Utc>) -> Result<Vec<Event>>;
    async fn events_by_organization(&self, organization_id: &OrganizationId) -> Result<Vec<Event>>;
    async fn save_event(&self, event: Event) -> Result<EventId>;
}

/// Client-persistent string storage (the browser-profile scoped store).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

pub trait Navigator: Send + Sync {
    fn push(&self, path: &str);
}

pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
