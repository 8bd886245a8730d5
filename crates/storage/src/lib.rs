//! Storage layer for tripdesk
//!
//! PostgreSQL persistence for imported bookings, users, travel ideas and
//! feature requests. Services talk to the domain traits in [`traits`].

mod error;
mod pg_migrations;
mod pg_storage;
pub mod traits;
mod types;

pub use error::StorageError;
pub use pg_migrations::run_pg_migrations;
pub use pg_storage::PgStorage;
pub use types::{CurrencyTotal, DashboardStats, PaginatedResult, StatusCount};
