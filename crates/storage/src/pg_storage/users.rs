//! UserStore implementation for PgStorage.

use async_trait::async_trait;
use tripdesk_core::{NewUser, User, UserUpdate};

use super::{PgStorage, USER_COLUMNS, count_to_u64, new_id, row_to_user, usize_to_i64};
use crate::error::StorageError;
use crate::traits::UserStore;
use crate::types::PaginatedResult;

#[async_trait]
impl UserStore for PgStorage {
    async fn create_user(&self, user: &NewUser) -> Result<User, StorageError> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (id, email, name, role, status, tc_user_id, tc_microsite_id)
             VALUES ($1, LOWER($2), $3, $4, $5, $6, $7)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new_id())
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(&user.tc_user_id)
        .bind(&user.tc_microsite_id)
        .fetch_one(&self.pool)
        .await?;
        row_to_user(&row)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let row =
            sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"))
                .bind(email.trim())
                .fetch_optional(&self.pool)
                .await?;
        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn list_users(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<User>, StorageError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&self.pool).await?;
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(usize_to_i64(limit))
        .bind(usize_to_i64(offset))
        .fetch_all(&self.pool)
        .await?;
        let items = rows.iter().map(row_to_user).collect::<Result<Vec<_>, _>>()?;
        Ok(PaginatedResult {
            items,
            total: count_to_u64(total),
            offset: u64::try_from(offset).unwrap_or(0),
            limit: u64::try_from(limit).unwrap_or(0),
        })
    }

    async fn update_user(
        &self,
        id: &str,
        update: &UserUpdate,
    ) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(&format!(
            "UPDATE users SET
               email = COALESCE(LOWER($2), email),
               name = COALESCE($3, name),
               role = COALESCE($4, role),
               status = COALESCE($5, status),
               tc_user_id = COALESCE($6, tc_user_id),
               tc_microsite_id = COALESCE($7, tc_microsite_id),
               updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&update.email)
        .bind(&update.name)
        .bind(update.role.map(|r| r.as_str()))
        .bind(update.status.map(|s| s.as_str()))
        .bind(&update.tc_user_id)
        .bind(&update.tc_microsite_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn delete_user(&self, id: &str) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;
        let voted: Vec<String> =
            sqlx::query_scalar("SELECT feature_id FROM feature_votes WHERE user_id = $1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if !voted.is_empty() {
            // Votes cascade with the user; keep tallies in step.
            sqlx::query(
                "UPDATE feature_requests f
                    SET vote_count = (SELECT COUNT(*) FROM feature_votes v WHERE v.feature_id = f.id)
                  WHERE f.id = ANY($1)",
            )
            .bind(&voted)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(deleted > 0)
    }
}
