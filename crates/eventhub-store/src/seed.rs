use eventhub_core::{Event, EventHubError, OrganizationSummary, Result, StudentProfile, UserProfile};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::{InMemoryEventCatalog, InMemoryOrganizationIndex, InMemoryProfileStore};

/// Initial contents for the in-memory stores, loaded from a JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub students: Vec<StudentProfile>,
    #[serde(default)]
    pub organizations: Vec<OrganizationSummary>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl SeedData {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EventHubError::NotFound(format!(
                "seed file {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStores {
    pub profiles: Arc<InMemoryProfileStore>,
    pub organizations: Arc<InMemoryOrganizationIndex>,
    pub events: Arc<InMemoryEventCatalog>,
}

impl InMemoryStores {
    pub fn from_seed(seed: SeedData) -> Self {
        let stores = Self::default();

        for user in seed.users {
            stores.profiles.insert_user(user);
        }
        for student in seed.students {
            stores.profiles.insert_student(student);
        }
        for event in seed.events {
            stores.events.insert(event);
        }
        for org in seed.organizations {
            stores.organizations.upsert(org);
        }
        stores
            .organizations
            .refresh_event_counts(&stores.events.event_counts());

        info!(
            students = stores.profiles.student_count(),
            organizations = stores.organizations.len(),
            events = stores.events.len(),
            "in-memory stores seeded"
        );
        stores
    }
}
