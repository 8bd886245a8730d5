use std::sync::Arc;

use tripdesk_core::{MAX_QUERY_LIMIT, TravelIdea};
use tripdesk_llm::LlmClient;
use tripdesk_storage::PaginatedResult;
use tripdesk_storage::traits::TravelIdeaStore;

use crate::ServiceError;

pub struct IdeaService {
    store: Arc<dyn TravelIdeaStore>,
    llm: Option<Arc<LlmClient>>,
}

impl IdeaService {
    #[must_use]
    pub fn new(store: Arc<dyn TravelIdeaStore>, llm: Option<Arc<LlmClient>>) -> Self {
        Self { store, llm }
    }

    pub async fn list(
        &self,
        destination: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<TravelIdea>, ServiceError> {
        Ok(self.store.list_travel_ideas(destination, offset, limit.min(MAX_QUERY_LIMIT)).await?)
    }

    pub async fn get(&self, id: &str) -> Result<TravelIdea, ServiceError> {
        self.store.get_travel_idea(id).await?.ok_or_else(|| ServiceError::not_found("travel_idea", id))
    }

    /// Write marketing copy for an idea and keep it with the idea.
    pub async fn generate_content(&self, id: &str) -> Result<TravelIdea, ServiceError> {
        let llm = self
            .llm
            .as_ref()
            .ok_or_else(|| ServiceError::NotConfigured("OPENAI_API_KEY is not set".to_owned()))?;
        let idea = self.get(id).await?;
        let content = llm.generate_idea_content(&idea).await?;
        self.store
            .save_generated_content(id, &content)
            .await?
            .ok_or_else(|| ServiceError::not_found("travel_idea", id))
    }
}
