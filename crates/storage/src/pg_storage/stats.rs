//! StatsStore implementation for PgStorage.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use sqlx::Row;
use tripdesk_core::UPCOMING_DEPARTURE_DAYS;

use super::{PgStorage, count_to_u64};
use crate::error::StorageError;
use crate::traits::StatsStore;
use crate::types::{CurrencyTotal, DashboardStats, StatusCount};

#[async_trait]
impl StatsStore for PgStorage {
    async fn dashboard_stats(&self, today: NaiveDate) -> Result<DashboardStats, StorageError> {
        let total_bookings: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bookings").fetch_one(&self.pool).await?;

        let status_rows = sqlx::query(
            "SELECT status, COUNT(*) AS count FROM bookings GROUP BY status ORDER BY count DESC, status",
        )
        .fetch_all(&self.pool)
        .await?;
        let bookings_by_status = status_rows
            .iter()
            .map(|row| {
                Ok(StatusCount {
                    status: row.try_get("status")?,
                    count: count_to_u64(row.try_get("count")?),
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        let revenue_rows = sqlx::query(
            "SELECT currency, SUM(total_price) AS total, COUNT(*) AS bookings
               FROM bookings
              WHERE status <> 'cancelled' AND total_price IS NOT NULL AND currency IS NOT NULL
              GROUP BY currency ORDER BY total DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        let revenue_by_currency = revenue_rows
            .iter()
            .map(|row| {
                Ok(CurrencyTotal {
                    currency: row.try_get("currency")?,
                    total: row.try_get::<Option<f64>, _>("total")?.unwrap_or(0.0),
                    bookings: count_to_u64(row.try_get("bookings")?),
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        let horizon = today + Duration::days(UPCOMING_DEPARTURE_DAYS);
        let upcoming: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings
              WHERE start_date >= $1 AND start_date <= $2 AND status <> 'cancelled'",
        )
        .bind(today)
        .bind(horizon)
        .fetch_one(&self.pool)
        .await?;

        let total_users: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&self.pool).await?;
        let total_ideas: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM travel_ideas").fetch_one(&self.pool).await?;
        let open_features: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM feature_requests WHERE status IN ('open', 'planned', 'in_progress')",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats {
            total_bookings: count_to_u64(total_bookings),
            bookings_by_status,
            revenue_by_currency,
            upcoming_departures: count_to_u64(upcoming),
            total_users: count_to_u64(total_users),
            total_travel_ideas: count_to_u64(total_ideas),
            open_feature_requests: count_to_u64(open_features),
        })
    }
}
