use async_trait::async_trait;
use dashmap::DashMap;
use eventhub_core::{EventHubError, ProfileStore, Result, StudentProfile, UserId, UserProfile};
use tracing::debug;

/// Document-store stand-in keeping user and student records in memory.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    users: DashMap<UserId, UserProfile>,
    students: DashMap<UserId, StudentProfile>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account that has no student record (organizations, or
    /// students who have not been onboarded yet).
    pub fn insert_user(&self, user: UserProfile) {
        self.users.insert(user.id.clone(), user);
    }

    pub fn insert_student(&self, profile: StudentProfile) {
        self.users.insert(profile.user.id.clone(), profile.user.clone());
        self.students.insert(profile.user.id.clone(), profile);
    }

    pub fn student_count(&self) -> usize {
        self.students.len()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn user_profile(&self, id: &str) -> Result<UserProfile> {
        self.users
            .get(id)
            .map(|u| u.clone())
            .ok_or_else(|| EventHubError::NotFound(format!("user {}", id)))
    }

    async fn student_profile(&self, id: &str) -> Result<Option<StudentProfile>> {
        if let Some(profile) = self.students.get(id) {
            return Ok(Some(profile.clone()));
        }
        if self.users.contains_key(id) {
            debug!(user_id = id, "user has no student record");
            return Ok(None);
        }
        Err(EventHubError::NotFound(format!("user {}", id)))
    }

    async fn save_student(&self, profile: StudentProfile) -> Result<()> {
        if profile.user.id.trim().is_empty() {
            return Err(EventHubError::Validation("student id must not be empty".into()));
        }
        self.insert_student(profile);
        Ok(())
    }
}
