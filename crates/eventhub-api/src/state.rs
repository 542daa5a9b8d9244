use eventhub_ai::{ContentGenerator, OpenAICompatibleProvider};
use eventhub_core::{
    ConfigManager, EventCatalog, EventHubError, OrganizationSearch, ProfileStore, Result,
};
use eventhub_store::{InMemoryStores, SeedData, StudentService};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileStore>,
    pub organizations: Arc<dyn OrganizationSearch>,
    pub events: Arc<dyn EventCatalog>,
    pub students: StudentService,
    /// `None` when the `[llm]` section is disabled.
    pub content: Option<ContentGenerator>,
    pub config: Arc<ConfigManager>,
}

impl AppState {
    /// Builds the stores from the configured seed file (empty without one)
    /// and the content generator when AI is enabled.
    pub fn new(config: Arc<ConfigManager>) -> Result<Self> {
        let seed = match &config.config().store.seed_path {
            Some(path) => {
                info!(path = %path.display(), "loading seed data");
                SeedData::from_path(path)?
            }
            None => SeedData::default(),
        };

        let llm = &config.config().llm;
        let content = if llm.enabled {
            let provider = OpenAICompatibleProvider::from_llm_config(llm)
                .map_err(|e| EventHubError::Unavailable(format!("LLM client: {:#}", e)))?;
            info!(model = %llm.model, base_url = %llm.base_url, "AI content generation enabled");
            Some(ContentGenerator::from_llm_config(Arc::new(provider), llm))
        } else {
            None
        };

        let mut state = Self::from_stores(InMemoryStores::from_seed(seed), config);
        state.content = content;
        Ok(state)
    }

    pub fn from_stores(stores: InMemoryStores, config: Arc<ConfigManager>) -> Self {
        let students = StudentService::new(stores.profiles.clone(), stores.events.clone());
        Self {
            profiles: stores.profiles,
            organizations: stores.organizations,
            events: stores.events,
            students,
            content: None,
            config,
        }
    }

    pub fn with_content(mut self, content: ContentGenerator) -> Self {
        self.content = Some(content);
        self
    }

    pub fn search_result_cap(&self) -> usize {
        self.config.config().workflow.search_result_cap
    }
}
