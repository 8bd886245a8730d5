//! Request/query types (Deserialize)

use chrono::NaiveDate;
use serde::Deserialize;
use tripdesk_core::{BookingFilter, BookingStatus, DEFAULT_QUERY_LIMIT, FeatureStatus, MAX_QUERY_LIMIT};

use crate::api_error::ApiError;

const fn default_limit() -> usize {
    DEFAULT_QUERY_LIMIT
}

fn parse_optional<T: std::str::FromStr>(raw: Option<&str>, field: &str) -> Result<Option<T>, ApiError>
where
    T::Err: std::fmt::Display,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value.parse().map(Some).map_err(|e| ApiError::BadRequest(format!("{field}: {e}"))),
        None => Ok(None),
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl PageQuery {
    /// Cap limit to prevent unbounded queries.
    pub fn capped_limit(&self) -> usize {
        self.limit.min(MAX_QUERY_LIMIT)
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub user_id: Option<String>,
    pub status: Option<String>,
    pub microsite: Option<String>,
    pub destination: Option<String>,
    pub departs_from: Option<NaiveDate>,
    pub departs_to: Option<NaiveDate>,
}

impl BookingListQuery {
    pub fn capped_limit(&self) -> usize {
        self.limit.min(MAX_QUERY_LIMIT)
    }

    pub fn to_filter(&self) -> Result<BookingFilter, ApiError> {
        Ok(BookingFilter {
            user_id: non_empty(self.user_id.as_ref()),
            status: parse_optional::<BookingStatus>(self.status.as_deref(), "status")?,
            microsite_id: non_empty(self.microsite.as_ref()),
            destination: non_empty(self.destination.as_ref()),
            departs_from: self.departs_from,
            departs_to: self.departs_to,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Deserialize)]
pub struct IdeaListQuery {
    pub destination: Option<String>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl IdeaListQuery {
    pub fn capped_limit(&self) -> usize {
        self.limit.min(MAX_QUERY_LIMIT)
    }
}

#[derive(Debug, Deserialize)]
pub struct FeatureListQuery {
    pub status: Option<String>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl FeatureListQuery {
    pub fn capped_limit(&self) -> usize {
        self.limit.min(MAX_QUERY_LIMIT)
    }

    pub fn parsed_status(&self) -> Result<Option<FeatureStatus>, ApiError> {
        parse_optional(self.status.as_deref(), "status")
    }
}

#[derive(Debug, Deserialize)]
pub struct ImportBookingsRequest {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub microsite: Option<String>,
}

impl ImportBookingsRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.from > self.to {
            return Err(ApiError::BadRequest(format!(
                "from {} is after to {}",
                self.from, self.to
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ImportIdeasRequest {
    pub microsite: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

impl StatusRequest {
    pub fn parsed(&self) -> Result<FeatureStatus, ApiError> {
        parse_optional(Some(self.status.as_str()), "status")?
            .ok_or_else(|| ApiError::BadRequest("status must not be empty".to_owned()))
    }
}
