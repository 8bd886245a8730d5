use std::sync::Arc;

use tripdesk_core::{FeatureRequest, FeatureStatus, MAX_QUERY_LIMIT, NewFeatureRequest};
use tripdesk_storage::PaginatedResult;
use tripdesk_storage::traits::FeatureStore;

use crate::ServiceError;

const MAX_TITLE_CHARS: usize = 200;

pub struct FeatureService {
    store: Arc<dyn FeatureStore>,
}

impl FeatureService {
    #[must_use]
    pub fn new(store: Arc<dyn FeatureStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: NewFeatureRequest) -> Result<FeatureRequest, ServiceError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ServiceError::InvalidInput("title must not be empty".to_owned()));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(ServiceError::InvalidInput(format!(
                "title longer than {MAX_TITLE_CHARS} characters"
            )));
        }
        let request = NewFeatureRequest {
            title: title.to_owned(),
            description: input
                .description
                .map(|d| d.trim().to_owned())
                .filter(|d| !d.is_empty()),
            author_id: input.author_id,
        };
        let created = self.store.create_feature_request(&request).await?;
        tracing::info!(feature = %created.id, "feature request created");
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> Result<FeatureRequest, ServiceError> {
        self.store
            .get_feature_request(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("feature_request", id))
    }

    pub async fn list(
        &self,
        status: Option<FeatureStatus>,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<FeatureRequest>, ServiceError> {
        Ok(self.store.list_feature_requests(status, offset, limit.min(MAX_QUERY_LIMIT)).await?)
    }

    /// Add `user_id`'s vote. Voting twice leaves the tally unchanged.
    pub async fn vote(&self, feature_id: &str, user_id: &str) -> Result<u32, ServiceError> {
        let feature = self.get(feature_id).await?;
        if !feature.status.accepts_votes() {
            return Err(ServiceError::InvalidInput(format!(
                "feature request is {} and no longer accepts votes",
                feature.status.as_str()
            )));
        }
        Ok(self.store.vote(feature_id, user_id).await?)
    }

    pub async fn unvote(&self, feature_id: &str, user_id: &str) -> Result<u32, ServiceError> {
        Ok(self.store.unvote(feature_id, user_id).await?)
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: FeatureStatus,
    ) -> Result<FeatureRequest, ServiceError> {
        let updated = self
            .store
            .update_feature_status(id, status)
            .await?
            .ok_or_else(|| ServiceError::not_found("feature_request", id))?;
        tracing::info!(feature = %id, status = status.as_str(), "feature status changed");
        Ok(updated)
    }
}
