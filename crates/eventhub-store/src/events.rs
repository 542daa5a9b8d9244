use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use eventhub_core::{Event, EventCatalog, EventHubError, EventId, OrganizationId, Result};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryEventCatalog {
    events: DashMap<EventId, Event>,
}

impl InMemoryEventCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, event: Event) {
        self.events.insert(event.id.clone(), event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events hosted by each organization.
    pub fn event_counts(&self) -> HashMap<OrganizationId, u32> {
        let mut counts = HashMap::new();
        for entry in self.events.iter() {
            *counts.entry(entry.organization_id.clone()).or_insert(0) += 1;
        }
        counts
    }
}

#[async_trait]
impl EventCatalog for InMemoryEventCatalog {
    async fn event(&self, id: &str) -> Result<Event> {
        self.events
            .get(id)
            .map(|e| e.clone())
            .ok_or_else(|| EventHubError::NotFound(format!("event {}", id)))
    }

    async fn upcoming_events(&self, after: DateTime<Utc>) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.starts_at >= after)
            .map(|e| e.clone())
            .collect();
        events.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then_with(|| a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn events_by_organization(&self, organization_id: &OrganizationId) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = self
            .events
            .iter()
            .filter(|e| &e.organization_id == organization_id)
            .map(|e| e.clone())
            .collect();
        events.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
        Ok(events)
    }

    async fn save_event(&self, mut event: Event) -> Result<EventId> {
        if event.title.trim().is_empty() {
            return Err(EventHubError::Validation("event title must not be empty".into()));
        }
        if event.id.is_empty() {
            event.id = Uuid::new_v4().to_string();
        }
        let id = event.id.clone();
        info!(event_id = %id, organization_id = %event.organization_id, "event saved");
        self.events.insert(id.clone(), event);
        Ok(id)
    }
}
