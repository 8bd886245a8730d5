//! Storage types shared across modules

use serde::{Deserialize, Serialize};

/// Generic paginated result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

/// Revenue of non-cancelled bookings in one currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrencyTotal {
    pub currency: String,
    pub total: f64,
    pub bookings: u64,
}

/// Figures for the back-office dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_bookings: u64,
    pub bookings_by_status: Vec<StatusCount>,
    pub revenue_by_currency: Vec<CurrencyTotal>,
    /// Non-cancelled bookings departing within the next 30 days.
    pub upcoming_departures: u64,
    pub total_users: u64,
    pub total_travel_ideas: u64,
    pub open_feature_requests: u64,
}
