//! FeatureStore implementation for PgStorage.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tripdesk_core::{FeatureRequest, FeatureStatus, NewFeatureRequest};

use super::{FEATURE_COLUMNS, PgStorage, count_to_u64, new_id, row_to_feature, usize_to_i64};
use crate::error::StorageError;
use crate::traits::FeatureStore;
use crate::types::PaginatedResult;

/// Lock the feature row and make sure the voter exists.
async fn lock_vote_targets(
    tx: &mut Transaction<'_, Postgres>,
    feature_id: &str,
    user_id: &str,
) -> Result<(), StorageError> {
    let feature: Option<String> =
        sqlx::query_scalar("SELECT id FROM feature_requests WHERE id = $1 FOR UPDATE")
            .bind(feature_id)
            .fetch_optional(&mut **tx)
            .await?;
    if feature.is_none() {
        return Err(StorageError::not_found("feature_request", feature_id));
    }
    let user: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;
    if user.is_none() {
        return Err(StorageError::not_found("user", user_id));
    }
    Ok(())
}

async fn recount_votes(
    tx: &mut Transaction<'_, Postgres>,
    feature_id: &str,
) -> Result<u32, StorageError> {
    let count: i32 = sqlx::query_scalar(
        "UPDATE feature_requests
            SET vote_count = (SELECT COUNT(*) FROM feature_votes WHERE feature_id = $1),
                updated_at = NOW()
          WHERE id = $1
          RETURNING vote_count",
    )
    .bind(feature_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(u32::try_from(count).unwrap_or(0))
}

#[async_trait]
impl FeatureStore for PgStorage {
    async fn create_feature_request(
        &self,
        request: &NewFeatureRequest,
    ) -> Result<FeatureRequest, StorageError> {
        let row = sqlx::query(&format!(
            "INSERT INTO feature_requests (id, title, description, author_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {FEATURE_COLUMNS}"
        ))
        .bind(new_id())
        .bind(request.title.trim())
        .bind(&request.description)
        .bind(&request.author_id)
        .fetch_one(&self.pool)
        .await?;
        row_to_feature(&row)
    }

    async fn get_feature_request(&self, id: &str) -> Result<Option<FeatureRequest>, StorageError> {
        let row =
            sqlx::query(&format!("SELECT {FEATURE_COLUMNS} FROM feature_requests WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|r| row_to_feature(&r)).transpose()
    }

    async fn list_feature_requests(
        &self,
        status: Option<FeatureStatus>,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<FeatureRequest>, StorageError> {
        let status = status.map(|s| s.as_str());
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM feature_requests WHERE $1::TEXT IS NULL OR status = $1",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        let rows = sqlx::query(&format!(
            "SELECT {FEATURE_COLUMNS} FROM feature_requests
              WHERE $1::TEXT IS NULL OR status = $1
              ORDER BY vote_count DESC, created_at ASC LIMIT $2 OFFSET $3"
        ))
        .bind(status)
        .bind(usize_to_i64(limit))
        .bind(usize_to_i64(offset))
        .fetch_all(&self.pool)
        .await?;
        let items = rows.iter().map(row_to_feature).collect::<Result<Vec<_>, _>>()?;
        Ok(PaginatedResult {
            items,
            total: count_to_u64(total),
            offset: u64::try_from(offset).unwrap_or(0),
            limit: u64::try_from(limit).unwrap_or(0),
        })
    }

    async fn vote(&self, feature_id: &str, user_id: &str) -> Result<u32, StorageError> {
        let mut tx = self.pool.begin().await?;
        lock_vote_targets(&mut tx, feature_id, user_id).await?;
        sqlx::query(
            "INSERT INTO feature_votes (feature_id, user_id) VALUES ($1, $2)
             ON CONFLICT (feature_id, user_id) DO NOTHING",
        )
        .bind(feature_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        let count = recount_votes(&mut tx, feature_id).await?;
        tx.commit().await?;
        Ok(count)
    }

    async fn unvote(&self, feature_id: &str, user_id: &str) -> Result<u32, StorageError> {
        let mut tx = self.pool.begin().await?;
        lock_vote_targets(&mut tx, feature_id, user_id).await?;
        sqlx::query("DELETE FROM feature_votes WHERE feature_id = $1 AND user_id = $2")
            .bind(feature_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        let count = recount_votes(&mut tx, feature_id).await?;
        tx.commit().await?;
        Ok(count)
    }

    async fn update_feature_status(
        &self,
        id: &str,
        status: FeatureStatus,
    ) -> Result<Option<FeatureRequest>, StorageError> {
        let row = sqlx::query(&format!(
            "UPDATE feature_requests SET status = $2, updated_at = NOW()
              WHERE id = $1 RETURNING {FEATURE_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| row_to_feature(&r)).transpose()
    }
}
