//! Travel Compositor client for tripdesk
//!
//! Per-microsite authentication with token caching, list and detail
//! endpoints, mapping into tripdesk types, and [`BookingFinder`] for locating
//! a booking across every configured microsite.

mod api_types;
pub mod cache;
mod client;
pub mod date_window;
mod error;
mod finder;
pub mod mapping;

pub use api_types::Page;
pub use cache::{CacheStats, TtlCache};
pub use client::{AUTH_HEADER, CompositorClient};
pub use date_window::{DateRange, backward_windows};
pub use error::CompositorError;
pub use finder::{BookingFinder, FoundBooking, MicrositeListing, SearchSettings, SearchStrategy};

#[cfg(test)]
mod client_tests;
