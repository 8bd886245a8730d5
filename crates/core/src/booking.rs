//! Booking domain types.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

static REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:([A-Z]+)[\s\-_#/]*)?(\d+)$").unwrap());

/// Human-facing booking reference such as `RRP-9263`.
///
/// Stored upper-case with a single `-` between prefix and digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookingReference {
    prefix: Option<String>,
    numeric_id: String,
}

impl BookingReference {
    /// Parse `RRP-9263`, `rrp 9263`, `RRP9263` or bare `9263`.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let upper = raw.trim().to_uppercase();
        let caps = REFERENCE_RE
            .captures(&upper)
            .ok_or_else(|| CoreError::InvalidReference(raw.trim().to_owned()))?;
        let numeric_id = caps
            .get(2)
            .map(|m| m.as_str().to_owned())
            .ok_or_else(|| CoreError::InvalidReference(raw.trim().to_owned()))?;
        Ok(Self { prefix: caps.get(1).map(|m| m.as_str().to_owned()), numeric_id })
    }

    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    #[must_use]
    pub fn numeric_id(&self) -> &str {
        &self.numeric_id
    }

    /// Ids worth trying against the direct booking endpoint, most specific first.
    #[must_use]
    pub fn lookup_candidates(&self) -> Vec<String> {
        let full = self.to_string();
        if full == self.numeric_id {
            vec![full]
        } else {
            vec![full, self.numeric_id.clone()]
        }
    }

    /// Whether an upstream identifier denotes this booking.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        let candidate = candidate.trim();
        if candidate.eq_ignore_ascii_case(&self.numeric_id) {
            return true;
        }
        // A bare numeric reference accepts any prefix.
        Self::parse(candidate).is_ok_and(|other| {
            other.numeric_id == self.numeric_id
                && (self.prefix.is_none() || other.prefix == self.prefix)
        })
    }
}

impl fmt::Display for BookingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}-{}", self.numeric_id),
            None => f.write_str(&self.numeric_id),
        }
    }
}

impl FromStr for BookingReference {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BookingReference {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BookingReference> for String {
    fn from(value: BookingReference) -> Self {
        value.to_string()
    }
}

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Pending,
    Cancelled,
    Completed,
    #[default]
    Unknown,
}

impl BookingStatus {
    pub const ALL: &'static [BookingStatus] =
        &[Self::Confirmed, Self::Pending, Self::Cancelled, Self::Completed, Self::Unknown];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Confirmed => "confirmed",
            Self::Pending => "pending",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
            Self::Unknown => "unknown",
        }
    }

    /// Map an upstream status string; never fails.
    #[must_use]
    pub fn from_upstream(raw: &str) -> Self {
        match raw.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "CONFIRMED" | "BOOKED" | "OK" | "PAID" => Self::Confirmed,
            "PENDING" | "ON_REQUEST" | "REQUESTED" | "QUOTE" | "OPTION" => Self::Pending,
            "CANCELLED" | "CANCELED" | "CANCELLATION" | "REJECTED" => Self::Cancelled,
            "COMPLETED" | "FINISHED" | "TRAVELLED" | "TRAVELED" => Self::Completed,
            _ => Self::Unknown,
        }
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "confirmed" => Ok(Self::Confirmed),
            "pending" => Ok(Self::Pending),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            "unknown" => Ok(Self::Unknown),
            other => Err(CoreError::InvalidInput(format!("invalid booking status: {other}"))),
        }
    }
}

/// A persisted booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub booking_reference: String,
    pub external_id: String,
    pub microsite_id: String,
    pub user_id: Option<String>,
    pub agency_id: Option<String>,
    pub status: BookingStatus,
    pub client_email: Option<String>,
    pub client_name: Option<String>,
    pub destination: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_price: Option<f64>,
    pub currency: Option<String>,
    pub accommodations: serde_json::Value,
    pub activities: serde_json::Value,
    pub transports: serde_json::Value,
    pub vouchers: serde_json::Value,
    pub raw_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Number of nights between start and end, when both are known.
    #[must_use]
    pub fn nights(&self) -> Option<i64> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end >= start => Some((end - start).num_days()),
            _ => None,
        }
    }
}

/// Write model for upserting a booking imported from upstream.
///
/// `user_id` is not part of the input: storage resolves it from `client_email`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBooking {
    pub booking_reference: String,
    pub external_id: String,
    pub microsite_id: String,
    pub agency_id: Option<String>,
    pub status: BookingStatus,
    pub client_email: Option<String>,
    pub client_name: Option<String>,
    pub destination: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_price: Option<f64>,
    pub currency: Option<String>,
    pub accommodations: serde_json::Value,
    pub activities: serde_json::Value,
    pub transports: serde_json::Value,
    pub vouchers: serde_json::Value,
    pub raw_data: serde_json::Value,
}

/// Optional filters for listing bookings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingFilter {
    pub user_id: Option<String>,
    pub status: Option<BookingStatus>,
    pub microsite_id: Option<String>,
    pub destination: Option<String>,
    pub departs_from: Option<NaiveDate>,
    pub departs_to: Option<NaiveDate>,
}
