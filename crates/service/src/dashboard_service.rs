use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tripdesk_compositor::{BookingFinder, CacheStats};
use tripdesk_core::MicrositeSummary;
use tripdesk_storage::DashboardStats;
use tripdesk_storage::traits::StatsStore;

use crate::ServiceError;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    #[serde(flatten)]
    pub stats: DashboardStats,
    pub booking_cache: CacheStats,
    pub microsites: Vec<MicrositeSummary>,
}

pub struct DashboardService {
    stats: Arc<dyn StatsStore>,
    finder: Arc<BookingFinder>,
}

impl DashboardService {
    #[must_use]
    pub fn new(stats: Arc<dyn StatsStore>, finder: Arc<BookingFinder>) -> Self {
        Self { stats, finder }
    }

    pub async fn dashboard(&self, today: NaiveDate) -> Result<Dashboard, ServiceError> {
        Ok(Dashboard {
            stats: self.stats.dashboard_stats(today).await?,
            booking_cache: self.finder.cache().stats(),
            microsites: self.microsites(),
        })
    }

    /// Configured microsites without their credentials.
    #[must_use]
    pub fn microsites(&self) -> Vec<MicrositeSummary> {
        self.finder.clients().iter().map(|c| MicrositeSummary::from(c.config())).collect()
    }
}
