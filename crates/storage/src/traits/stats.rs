use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StorageError;
use crate::types::DashboardStats;

/// Aggregate statistics.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Dashboard figures; `today` anchors the upcoming-departures window.
    async fn dashboard_stats(&self, today: NaiveDate) -> Result<DashboardStats, StorageError>;
}
