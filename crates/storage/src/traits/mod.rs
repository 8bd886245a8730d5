//! Storage trait abstraction
//!
//! Async domain traits implemented by [`crate::PgStorage`]. Services depend
//! on these traits so tests can substitute in-memory fakes.

pub mod booking;
pub mod feature;
pub mod stats;
pub mod travel_idea;
pub mod user;

pub use booking::BookingStore;
pub use feature::FeatureStore;
pub use stats::StatsStore;
pub use travel_idea::TravelIdeaStore;
pub use user::UserStore;
