use async_trait::async_trait;
use tripdesk_core::{IdeaContent, NewTravelIdea, TravelIdea};

use crate::error::StorageError;
use crate::types::PaginatedResult;

#[async_trait]
pub trait TravelIdeaStore: Send + Sync {
    /// Insert or refresh from upstream. Previously generated content is kept.
    async fn upsert_travel_idea(&self, idea: &NewTravelIdea) -> Result<TravelIdea, StorageError>;

    async fn get_travel_idea(&self, id: &str) -> Result<Option<TravelIdea>, StorageError>;

    /// Case-insensitive substring filter on destination.
    async fn list_travel_ideas(
        &self,
        destination: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<TravelIdea>, StorageError>;

    async fn save_generated_content(
        &self,
        id: &str,
        content: &IdeaContent,
    ) -> Result<Option<TravelIdea>, StorageError>;
}
