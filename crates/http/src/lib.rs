//! HTTP API server for tripdesk.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]
#![allow(clippy::exhaustive_structs, reason = "HTTP types are stable")]

pub mod api_error;
mod handlers;
mod query_types;
mod response_types;

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use axum::http::header::CONTENT_TYPE;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tripdesk_compositor::BookingFinder;
use tripdesk_core::CACHE_CLEANUP_INTERVAL_SECS;
use tripdesk_service::Services;

pub use response_types::{ApiResponse, VersionResponse};

/// Shared application state for all HTTP handlers.
pub struct AppState {
    pub services: Services,
    /// Multi-microsite booking search; owns the booking TTL cache.
    pub finder: Arc<BookingFinder>,
}

/// Spawn the periodic purge of expired booking cache entries.
pub fn start_cache_cleanup(state: &AppState) -> JoinHandle<()> {
    let cache = Arc::clone(state.finder.cache());
    tracing::info!(interval_secs = CACHE_CLEANUP_INTERVAL_SECS, "starting booking cache cleanup");
    cache.spawn_cleanup(Duration::from_secs(CACHE_CLEANUP_INTERVAL_SECS))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health))
        .route("/api/version", get(version))
        .route("/api/microsites", get(handlers::microsites::list_microsites))
        .route("/api/bookings", get(handlers::bookings::list_bookings))
        .route("/api/bookings/import", post(handlers::bookings::import_bookings))
        .route("/api/bookings/{reference}", get(handlers::bookings::get_booking))
        .route("/api/users", get(handlers::users::list_users).post(handlers::users::create_user))
        .route(
            "/api/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route("/api/users/{id}/bookings", get(handlers::users::user_bookings))
        .route("/api/travel-ideas", get(handlers::ideas::list_ideas))
        .route("/api/travel-ideas/import", post(handlers::ideas::import_ideas))
        .route("/api/travel-ideas/{id}", get(handlers::ideas::get_idea))
        .route("/api/travel-ideas/{id}/content", post(handlers::ideas::generate_content))
        .route(
            "/api/feature-requests",
            get(handlers::features::list_features).post(handlers::features::create_feature),
        )
        .route(
            "/api/feature-requests/{id}/vote",
            post(handlers::features::vote).delete(handlers::features::unvote),
        )
        .route("/api/feature-requests/{id}/status", put(handlers::features::update_status))
        .route("/api/chat", post(handlers::chat::chat))
        .route("/api/dashboard", get(handlers::dashboard::dashboard))
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse { version: env!("CARGO_PKG_VERSION") })
}
