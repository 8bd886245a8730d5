//! TravelIdeaStore implementation for PgStorage.

use async_trait::async_trait;
use tripdesk_core::{IdeaContent, NewTravelIdea, TravelIdea};

use super::{IDEA_COLUMNS, PgStorage, count_to_u64, escape_like, row_to_travel_idea, usize_to_i64};
use crate::error::StorageError;
use crate::traits::TravelIdeaStore;
use crate::types::PaginatedResult;

#[async_trait]
impl TravelIdeaStore for PgStorage {
    async fn upsert_travel_idea(&self, idea: &NewTravelIdea) -> Result<TravelIdea, StorageError> {
        let themes = serde_json::to_value(&idea.themes)?;
        let row = sqlx::query(&format!(
            "INSERT INTO travel_ideas (id, microsite_id, title, destination, themes, price_from,
                                       currency, image_url, description, raw_data)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (id) DO UPDATE SET
               microsite_id = EXCLUDED.microsite_id,
               title = EXCLUDED.title,
               destination = EXCLUDED.destination,
               themes = EXCLUDED.themes,
               price_from = EXCLUDED.price_from,
               currency = EXCLUDED.currency,
               image_url = EXCLUDED.image_url,
               description = EXCLUDED.description,
               raw_data = EXCLUDED.raw_data,
               updated_at = NOW()
             RETURNING {IDEA_COLUMNS}"
        ))
        .bind(&idea.id)
        .bind(&idea.microsite_id)
        .bind(&idea.title)
        .bind(&idea.destination)
        .bind(themes)
        .bind(idea.price_from)
        .bind(&idea.currency)
        .bind(&idea.image_url)
        .bind(&idea.description)
        .bind(&idea.raw_data)
        .fetch_one(&self.pool)
        .await?;
        row_to_travel_idea(&row)
    }

    async fn get_travel_idea(&self, id: &str) -> Result<Option<TravelIdea>, StorageError> {
        let row = sqlx::query(&format!("SELECT {IDEA_COLUMNS} FROM travel_ideas WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| row_to_travel_idea(&r)).transpose()
    }

    async fn list_travel_ideas(
        &self,
        destination: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<TravelIdea>, StorageError> {
        let pattern = destination
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| format!("%{}%", escape_like(d)));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM travel_ideas WHERE $1::TEXT IS NULL OR destination ILIKE $1 ESCAPE '\\'",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;
        let rows = sqlx::query(&format!(
            "SELECT {IDEA_COLUMNS} FROM travel_ideas
              WHERE $1::TEXT IS NULL OR destination ILIKE $1 ESCAPE '\\'
              ORDER BY updated_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(usize_to_i64(limit))
        .bind(usize_to_i64(offset))
        .fetch_all(&self.pool)
        .await?;
        let items = rows.iter().map(row_to_travel_idea).collect::<Result<Vec<_>, _>>()?;
        Ok(PaginatedResult {
            items,
            total: count_to_u64(total),
            offset: u64::try_from(offset).unwrap_or(0),
            limit: u64::try_from(limit).unwrap_or(0),
        })
    }

    async fn save_generated_content(
        &self,
        id: &str,
        content: &IdeaContent,
    ) -> Result<Option<TravelIdea>, StorageError> {
        let row = sqlx::query(&format!(
            "UPDATE travel_ideas SET generated_content = $2, updated_at = NOW()
              WHERE id = $1 RETURNING {IDEA_COLUMNS}"
        ))
        .bind(id)
        .bind(serde_json::to_value(content)?)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| row_to_travel_idea(&r)).transpose()
    }
}
