use async_trait::async_trait;
use eventhub_core::{OrganizationId, OrganizationSearch, OrganizationSummary, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// How well a name matched the query; lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchRank {
    Exact,
    Prefix,
    WordPrefix,
    Substring,
}

fn rank(name: &str, query: &str) -> Option<MatchRank> {
    let name = name.to_lowercase();
    if name == query {
        Some(MatchRank::Exact)
    } else if name.starts_with(query) {
        Some(MatchRank::Prefix)
    } else if name
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| !word.is_empty() && word.starts_with(query))
    {
        Some(MatchRank::WordPrefix)
    } else if name.contains(query) {
        Some(MatchRank::Substring)
    } else {
        None
    }
}

/// Case-insensitive organization name index.
///
/// Results are ordered by match quality, then by number of hosted events,
/// then alphabetically. Every match is returned; display capping is the
/// caller's concern.
#[derive(Debug, Default)]
pub struct InMemoryOrganizationIndex {
    organizations: RwLock<Vec<OrganizationSummary>>,
}

impl InMemoryOrganizationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_organizations(organizations: Vec<OrganizationSummary>) -> Self {
        Self {
            organizations: RwLock::new(organizations),
        }
    }

    pub fn upsert(&self, organization: OrganizationSummary) {
        let mut orgs = self.organizations.write();
        match orgs.iter_mut().find(|o| o.id == organization.id) {
            Some(existing) => *existing = organization,
            None => orgs.push(organization),
        }
    }

    pub fn refresh_event_counts(&self, counts: &HashMap<OrganizationId, u32>) {
        for org in self.organizations.write().iter_mut() {
            org.event_count = counts.get(&org.id).copied().unwrap_or(0);
        }
    }

    pub fn len(&self) -> usize {
        self.organizations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.organizations.read().is_empty()
    }

    pub fn get(&self, id: &str) -> Option<OrganizationSummary> {
        self.organizations.read().iter().find(|o| o.id == id).cloned()
    }
}

#[async_trait]
impl OrganizationSearch for InMemoryOrganizationIndex {
    async fn search_organizations(&self, text: &str) -> Result<Vec<OrganizationSummary>> {
        let query = text.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let orgs = self.organizations.read();
        let mut hits: Vec<(MatchRank, &OrganizationSummary)> = orgs
            .iter()
            .filter_map(|org| rank(&org.name, &query).map(|r| (r, org)))
            .collect();
        hits.sort_by(|(ra, a), (rb, b)| {
            ra.cmp(rb)
                .then_with(|| b.event_count.cmp(&a.event_count))
                .then_with(|| a.name.cmp(&b.name))
        });

        debug!(query = %query, hits = hits.len(), "organization search");
        Ok(hits.into_iter().map(|(_, org)| org.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(id: &str, name: &str, events: u32) -> OrganizationSummary {
        OrganizationSummary {
            id: id.into(),
            name: name.into(),
            avatar_url: None,
            event_count: events,
        }
    }

    #[test]
    fn test_rank_order() {
        assert_eq!(rank("Robotics", "robotics"), Some(MatchRank::Exact));
        assert_eq!(rank("Robotics Club", "robo"), Some(MatchRank::Prefix));
        assert_eq!(rank("UTM Robotics Club", "club"), Some(MatchRank::WordPrefix));
        assert_eq!(rank("Esports", "sport"), Some(MatchRank::Substring));
        assert_eq!(rank("Chess Society", "robo"), None);
    }

    #[tokio::test]
    async fn test_search_orders_by_rank_then_activity() {
        let index = InMemoryOrganizationIndex::with_organizations(vec![
            org("o1", "Computing Society", 3),
            org("o2", "Cloud Computing Club", 9),
            org("o3", "Computing", 0),
            org("o4", "Supercomputing Lab", 1),
            org("o5", "Computing Volunteers", 7),
        ]);

        let ids: Vec<String> = index
            .search_organizations("  COMPUTING ")
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec!["o3", "o5", "o1", "o2", "o4"]);
    }

    #[tokio::test]
    async fn test_blank_query_matches_nothing() {
        let index = InMemoryOrganizationIndex::with_organizations(vec![org("o1", "Any", 0)]);
        assert!(index.search_organizations("   ").await.unwrap().is_empty());
    }

    #[test]
    fn test_refresh_event_counts() {
        let index = InMemoryOrganizationIndex::with_organizations(vec![
            org("o1", "A", 5),
            org("o2", "B", 5),
        ]);
        let counts = HashMap::from([("o1".to_string(), 2)]);
        index.refresh_event_counts(&counts);
        assert_eq!(index.get("o1").unwrap().event_count, 2);
        assert_eq!(index.get("o2").unwrap().event_count, 0);
    }
}
