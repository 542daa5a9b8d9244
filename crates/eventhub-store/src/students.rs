use eventhub_core::{
    EventCatalog, EventHubError, ProfileStore, ProfileUpdate, Result, StudentProfile,
};
use std::sync::Arc;
use tracing::info;

/// Student-facing writes: profile edits, event registration and attendance.
///
/// Each operation is a plain read-modify-write against the profile store;
/// concurrent writers to the same student are last-write-wins.
#[derive(Clone)]
pub struct StudentService {
    profiles: Arc<dyn ProfileStore>,
    events: Arc<dyn EventCatalog>,
}

impl StudentService {
    pub fn new(profiles: Arc<dyn ProfileStore>, events: Arc<dyn EventCatalog>) -> Self {
        Self { profiles, events }
    }

    async fn load_student(&self, student_id: &str) -> Result<StudentProfile> {
        self.profiles
            .student_profile(student_id)
            .await?
            .ok_or_else(|| EventHubError::NotFound(format!("student profile {}", student_id)))
    }

    pub async fn update_profile(
        &self,
        student_id: &str,
        update: ProfileUpdate,
    ) -> Result<StudentProfile> {
        let mut profile = match self.profiles.student_profile(student_id).await? {
            Some(profile) => profile,
            // First edit of an onboarded account creates the student record.
            None => StudentProfile::new(self.profiles.user_profile(student_id).await?),
        };
        profile.apply(update);
        self.profiles.save_student(profile.clone()).await?;
        info!(student_id, "student profile updated");
        Ok(profile)
    }

    pub async fn register_for_event(
        &self,
        student_id: &str,
        event_id: &str,
    ) -> Result<StudentProfile> {
        let event = self.events.event(event_id).await?;
        let mut profile = self.load_student(student_id).await?;

        if profile.registered_events.insert(event.id.clone()) {
            self.profiles.save_student(profile.clone()).await?;
            info!(student_id, event_id, "registered for event");
        }
        Ok(profile)
    }

    /// Marks attendance and awards the event's MyCSD points. Points are only
    /// awarded the first time attendance is recorded for an event.
    pub async fn record_attendance(
        &self,
        student_id: &str,
        event_id: &str,
    ) -> Result<StudentProfile> {
        let event = self.events.event(event_id).await?;
        let mut profile = self.load_student(student_id).await?;

        if !profile.registered_events.contains(&event.id) {
            return Err(EventHubError::InvalidOperation(format!(
                "student {} is not registered for event {}",
                student_id, event_id
            )));
        }

        if profile.attended_events.insert(event.id.clone()) {
            profile.mycsd_points = profile.mycsd_points.saturating_add(event.points);
            self.profiles.save_student(profile.clone()).await?;
            info!(
                student_id,
                event_id,
                points = event.points,
                total = profile.mycsd_points,
                "attendance recorded"
            );
        }
        Ok(profile)
    }
}
