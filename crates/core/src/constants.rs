//! Shared constants for tripdesk.
//!
//! Centralizes limits and tuning defaults used by several crates.

/// Maximum number of results for any query (DoS protection).
pub const MAX_QUERY_LIMIT: usize = 1000;

/// Default number of results when limit is not specified by the caller.
pub const DEFAULT_QUERY_LIMIT: usize = 50;

/// PostgreSQL connection pool: maximum connections.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 20;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 300;

/// Default Travel Compositor REST root.
pub const DEFAULT_COMPOSITOR_BASE_URL: &str = "https://online.travelcompositor.com/resources";

/// Number of credential sets read from the environment (unsuffixed, `_2`, `_3`, `_4`).
pub const MAX_MICROSITE_CONFIGS: usize = 4;

/// Lifetime of a found booking in the in-memory cache.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30 * 60;

/// Maximum entries held by the in-memory booking cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Interval between background purges of expired cache entries.
pub const CACHE_CLEANUP_INTERVAL_SECS: u64 = 5 * 60;

/// Auth tokens are refreshed this many seconds before the upstream expiry.
pub const TOKEN_EXPIRY_SKEW_SECS: u64 = 60;

/// Fallback token lifetime when the upstream omits `expirationInSeconds`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Width of one date window in the paginated booking scan.
pub const DEFAULT_SEARCH_WINDOW_DAYS: u32 = 90;

/// How far back the paginated booking scan walks.
pub const DEFAULT_SEARCH_LOOKBACK_DAYS: u32 = 730;

/// Upper bound for configured scan window and lookback lengths.
pub const MAX_SEARCH_LOOKBACK_DAYS: u32 = 3650;

/// Page size for upstream list endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Upper bound on pages fetched per date window during a scan.
pub const DEFAULT_MAX_PAGES_PER_WINDOW: u32 = 20;

/// Timeout applied to each HTTP request against the upstream API.
pub const UPSTREAM_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Timeout applied to one microsite's part of a multi-microsite search.
pub const DEFAULT_CONFIG_SEARCH_TIMEOUT_SECS: u64 = 60;

/// Horizon for the "upcoming departures" dashboard figure.
pub const UPCOMING_DEPARTURE_DAYS: i64 = 30;
