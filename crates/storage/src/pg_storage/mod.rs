//! PostgreSQL storage backend using sqlx.
//!
//! Split into modular files by domain concern.

mod bookings;
mod features;
mod stats;
mod travel_ideas;
mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tripdesk_core::{
    Booking, BookingStatus, FeatureRequest, FeatureStatus, IdeaContent, PG_POOL_ACQUIRE_TIMEOUT_SECS,
    PG_POOL_IDLE_TIMEOUT_SECS, PG_POOL_MAX_CONNECTIONS, TravelIdea, User, UserRole, UserStatus,
};

use crate::error::StorageError;
use crate::pg_migrations::run_pg_migrations;

#[derive(Clone, Debug)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Connect and apply migrations.
    ///
    /// # Errors
    /// Returns an error if the connection or a migration fails.
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let storage = Self::connect_only(database_url).await?;
        storage.run_migrations().await?;
        tracing::info!("PgStorage initialized");
        Ok(storage)
    }

    /// Connect without touching the schema.
    ///
    /// # Errors
    /// Returns an error if the pool cannot connect.
    pub async fn connect_only(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(PG_POOL_MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(PG_POOL_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(Duration::from_secs(PG_POOL_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// # Errors
    /// Returns [`StorageError::Migration`] if any statement fails.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        run_pg_migrations(&self.pool).await.map_err(|e| StorageError::Migration(e.to_string()))
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Convert `usize` to `i64` for SQL LIMIT/OFFSET binds.
/// Saturates to `i64::MAX` on overflow (only possible on 128-bit targets).
pub(crate) fn usize_to_i64(val: usize) -> i64 {
    i64::try_from(val).unwrap_or(i64::MAX)
}

pub(crate) fn count_to_u64(val: i64) -> u64 {
    u64::try_from(val).unwrap_or(0)
}

/// Parse an enum stored as text, falling back to the default on corrupt values.
fn parse_text_enum<T: FromStr + Default>(raw: &str, column: &'static str) -> T {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(column, value = %raw, "corrupt enum value in DB, using default");
        T::default()
    })
}

pub(crate) const BOOKING_COLUMNS: &str = "id, booking_reference, external_id, microsite_id, user_id, agency_id, status,
     client_email, client_name, destination, start_date, end_date, total_price, currency,
     accommodations, activities, transports, vouchers, raw_data, created_at, updated_at";

pub(crate) const USER_COLUMNS: &str =
    "id, email, name, role, status, tc_user_id, tc_microsite_id, created_at, updated_at";

pub(crate) const IDEA_COLUMNS: &str = "id, microsite_id, title, destination, themes, price_from, currency, image_url,
     description, generated_content, raw_data, created_at, updated_at";

pub(crate) const FEATURE_COLUMNS: &str =
    "id, title, description, author_id, status, vote_count, created_at, updated_at";

pub(crate) fn row_to_booking(row: &PgRow) -> Result<Booking, StorageError> {
    let status: String = row.try_get("status")?;
    Ok(Booking {
        id: row.try_get("id")?,
        booking_reference: row.try_get("booking_reference")?,
        external_id: row.try_get("external_id")?,
        microsite_id: row.try_get("microsite_id")?,
        user_id: row.try_get("user_id")?,
        agency_id: row.try_get("agency_id")?,
        status: parse_text_enum::<BookingStatus>(&status, "bookings.status"),
        client_email: row.try_get("client_email")?,
        client_name: row.try_get("client_name")?,
        destination: row.try_get("destination")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        total_price: row.try_get("total_price")?,
        currency: row.try_get("currency")?,
        accommodations: row.try_get("accommodations")?,
        activities: row.try_get("activities")?,
        transports: row.try_get("transports")?,
        vouchers: row.try_get("vouchers")?,
        raw_data: row.try_get("raw_data")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn row_to_user(row: &PgRow) -> Result<User, StorageError> {
    let role: String = row.try_get("role")?;
    let status: String = row.try_get("status")?;
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        role: parse_text_enum::<UserRole>(&role, "users.role"),
        status: parse_text_enum::<UserStatus>(&status, "users.status"),
        tc_user_id: row.try_get("tc_user_id")?,
        tc_microsite_id: row.try_get("tc_microsite_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn row_to_travel_idea(row: &PgRow) -> Result<TravelIdea, StorageError> {
    let themes: serde_json::Value = row.try_get("themes")?;
    let generated: Option<serde_json::Value> = row.try_get("generated_content")?;
    let generated_content = generated
        .map(serde_json::from_value::<IdeaContent>)
        .transpose()
        .map_err(|e| StorageError::DataCorruption {
            context: "travel_ideas.generated_content".to_owned(),
            source: Box::new(e),
        })?;
    Ok(TravelIdea {
        id: row.try_get("id")?,
        microsite_id: row.try_get("microsite_id")?,
        title: row.try_get("title")?,
        destination: row.try_get("destination")?,
        themes: serde_json::from_value(themes).unwrap_or_default(),
        price_from: row.try_get("price_from")?,
        currency: row.try_get("currency")?,
        image_url: row.try_get("image_url")?,
        description: row.try_get("description")?,
        generated_content,
        raw_data: row.try_get("raw_data")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn row_to_feature(row: &PgRow) -> Result<FeatureRequest, StorageError> {
    let status: String = row.try_get("status")?;
    let votes: i32 = row.try_get("vote_count")?;
    Ok(FeatureRequest {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        author_id: row.try_get("author_id")?,
        status: parse_text_enum::<FeatureStatus>(&status, "feature_requests.status"),
        vote_count: u32::try_from(votes).unwrap_or(0),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
