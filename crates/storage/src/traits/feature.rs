use async_trait::async_trait;
use tripdesk_core::{FeatureRequest, FeatureStatus, NewFeatureRequest};

use crate::error::StorageError;
use crate::types::PaginatedResult;

/// Feature requests and their votes.
///
/// `vote_count` is recomputed from `feature_votes` inside the same
/// transaction as every vote change.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    async fn create_feature_request(
        &self,
        request: &NewFeatureRequest,
    ) -> Result<FeatureRequest, StorageError>;

    async fn get_feature_request(&self, id: &str) -> Result<Option<FeatureRequest>, StorageError>;

    /// Most voted first.
    async fn list_feature_requests(
        &self,
        status: Option<FeatureStatus>,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<FeatureRequest>, StorageError>;

    /// Idempotent. Returns the new tally.
    async fn vote(&self, feature_id: &str, user_id: &str) -> Result<u32, StorageError>;

    /// Idempotent. Returns the new tally.
    async fn unvote(&self, feature_id: &str, user_id: &str) -> Result<u32, StorageError>;

    async fn update_feature_status(
        &self,
        id: &str,
        status: FeatureStatus,
    ) -> Result<Option<FeatureRequest>, StorageError>;
}
