use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tripdesk_core::{
    DEFAULT_TOKEN_LIFETIME_SECS, MicrositeConfig, TOKEN_EXPIRY_SKEW_SECS,
    UPSTREAM_REQUEST_TIMEOUT_SECS, truncate,
};

use crate::api_types::{AuthRequest, AuthResponse, Page};
use crate::date_window::DateRange;
use crate::error::CompositorError;
use crate::mapping::unwrap_booking;

/// Upstream header carrying the session token.
pub const AUTH_HEADER: &str = "auth-token";

const BOOKING_LIST_KEYS: &[&str] = &["bookedTrip", "bookings", "booking"];
const IDEA_LIST_KEYS: &[&str] = &["travelIdea", "travelIdeas", "ideas"];
const PACKAGE_LIST_KEYS: &[&str] = &["package", "packages"];

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Client for one Travel Compositor microsite.
///
/// Holds the session token and refreshes it shortly before the upstream
/// expiry. Concurrent callers share a single login.
pub struct CompositorClient {
    client: reqwest::Client,
    base_url: String,
    config: MicrositeConfig,
    token: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for CompositorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositorClient")
            .field("base_url", &self.base_url)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CompositorClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(config: MicrositeConfig, base_url: &str) -> Result<Self, CompositorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPSTREAM_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| CompositorError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            config,
            token: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn microsite_id(&self) -> &str {
        &self.config.microsite_id
    }

    #[must_use]
    pub fn config(&self) -> &MicrositeConfig {
        &self.config
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current token, logging in when none is cached or it is about to expire.
    ///
    /// # Errors
    /// Returns [`CompositorError::Auth`] if the upstream rejects the credentials.
    pub async fn token(&self) -> Result<String, CompositorError> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref().filter(|t| Instant::now() < t.refresh_at) {
            return Ok(cached.value.clone());
        }
        let fresh = self.authenticate().await?;
        let value = fresh.value.clone();
        *guard = Some(fresh);
        Ok(value)
    }

    /// Forget the cached token so the next call logs in again.
    pub async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    async fn authenticate(&self) -> Result<CachedToken, CompositorError> {
        let started = Instant::now();
        let response = self
            .client
            .post(format!("{}/authentication/authenticate", self.base_url))
            .json(&AuthRequest {
                username: &self.config.username,
                password: &self.config.password,
                microsite_id: &self.config.microsite_id,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CompositorError::Auth {
                microsite_id: self.config.microsite_id.clone(),
                reason: format!("HTTP {}: {}", status.as_u16(), truncate(&body, 200)),
            });
        }
        let auth: AuthResponse =
            serde_json::from_str(&body).map_err(|e| CompositorError::JsonParse {
                context: format!("authentication response for {}", self.config.microsite_id),
                source: e,
            })?;
        if auth.token.trim().is_empty() {
            return Err(CompositorError::Auth {
                microsite_id: self.config.microsite_id.clone(),
                reason: "empty token".to_owned(),
            });
        }

        let lifetime = auth.expiration_in_seconds.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        let usable = lifetime.saturating_sub(TOKEN_EXPIRY_SKEW_SECS);
        tracing::debug!(
            microsite = %self.config.microsite_id,
            lifetime_secs = lifetime,
            elapsed_ms = started.elapsed().as_millis(),
            "authenticated against Travel Compositor"
        );
        Ok(CachedToken { value: auth.token, refresh_at: started + Duration::from_secs(usable) })
    }

    /// Authenticated GET. `Ok(None)` on 404; one re-login on 401/403.
    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<Value>, CompositorError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut retried_auth = false;
        loop {
            let token = self.token().await?;
            let response =
                self.client.get(&url).header(AUTH_HEADER, &token).query(query).send().await?;
            let status = response.status();

            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) && !retried_auth {
                tracing::warn!(microsite = %self.config.microsite_id, %url, "token rejected, re-authenticating");
                self.invalidate_token().await;
                retried_auth = true;
                continue;
            }

            let body = response.text().await?;
            if !status.is_success() {
                return Err(CompositorError::HttpStatus {
                    code: status.as_u16(),
                    body: truncate(&body, 500).to_owned(),
                });
            }
            if body.trim().is_empty() {
                return Ok(None);
            }
            return serde_json::from_str(&body).map(Some).map_err(|e| CompositorError::JsonParse {
                context: format!("GET {path} (body: {})", truncate(&body, 200)),
                source: e,
            });
        }
    }

    /// Fetch one booking by upstream id or reference.
    ///
    /// # Errors
    /// Returns an error on transport, auth or non-404 HTTP failures.
    pub async fn get_booking(&self, id: &str) -> Result<Option<Value>, CompositorError> {
        let value = self.get_json(&format!("booking/getBookings/{id}"), &[]).await?;
        Ok(value.and_then(unwrap_booking))
    }

    /// One page of bookings created within `range`.
    ///
    /// # Errors
    /// Returns an error on transport, auth or HTTP failures.
    pub async fn list_bookings(
        &self,
        range: &DateRange,
        first: u32,
        limit: u32,
    ) -> Result<Page, CompositorError> {
        let query = [
            ("microsite", self.config.microsite_id.clone()),
            ("from", range.from_param()),
            ("to", range.to_param()),
            ("first", first.to_string()),
            ("limit", limit.to_string()),
        ];
        let value = self.get_json("booking/getBookings", &query).await?;
        Ok(value.map(|v| Page::from_value(v, BOOKING_LIST_KEYS, first)).unwrap_or_default())
    }

    /// Every booking in `range`, following pagination to the end.
    ///
    /// # Errors
    /// Returns the first page error encountered.
    pub async fn list_all_bookings(
        &self,
        range: &DateRange,
        page_size: u32,
    ) -> Result<Vec<Value>, CompositorError> {
        self.collect_pages(page_size, |first| self.list_bookings(range, first, page_size)).await
    }

    /// One page of travel ideas published by this microsite.
    ///
    /// # Errors
    /// Returns an error on transport, auth or HTTP failures.
    pub async fn list_travel_ideas(&self, first: u32, limit: u32) -> Result<Page, CompositorError> {
        let query = [("first", first.to_string()), ("limit", limit.to_string())];
        let path = format!("travelidea/{}", self.config.microsite_id);
        let value = self.get_json(&path, &query).await?;
        Ok(value.map(|v| Page::from_value(v, IDEA_LIST_KEYS, first)).unwrap_or_default())
    }

    /// # Errors
    /// Returns the first page error encountered.
    pub async fn list_all_travel_ideas(&self, page_size: u32) -> Result<Vec<Value>, CompositorError> {
        self.collect_pages(page_size, |first| self.list_travel_ideas(first, page_size)).await
    }

    /// Full detail of one travel idea.
    ///
    /// # Errors
    /// Returns an error on transport, auth or non-404 HTTP failures.
    pub async fn get_travel_idea(&self, id: &str) -> Result<Option<Value>, CompositorError> {
        self.get_json(&format!("travelidea/{}/info/{id}", self.config.microsite_id), &[]).await
    }

    /// One page of packages published by this microsite.
    ///
    /// # Errors
    /// Returns an error on transport, auth or HTTP failures.
    pub async fn list_packages(&self, first: u32, limit: u32) -> Result<Page, CompositorError> {
        let query = [("first", first.to_string()), ("limit", limit.to_string())];
        let path = format!("package/{}", self.config.microsite_id);
        let value = self.get_json(&path, &query).await?;
        Ok(value.map(|v| Page::from_value(v, PACKAGE_LIST_KEYS, first)).unwrap_or_default())
    }

    async fn collect_pages<F, Fut>(
        &self,
        page_size: u32,
        mut fetch: F,
    ) -> Result<Vec<Value>, CompositorError>
    where
        F: FnMut(u32) -> Fut,
        Fut: std::future::Future<Output = Result<Page, CompositorError>>,
    {
        let page_size = page_size.max(1);
        let mut items = Vec::new();
        let mut first: u32 = 0;
        loop {
            let page = fetch(first).await?;
            let fetched = u32::try_from(page.items.len()).unwrap_or(u32::MAX);
            let total = page.total;
            items.extend(page.items);
            first = first.saturating_add(fetched);
            let exhausted = fetched < page_size || total.is_some_and(|t| first >= t);
            if fetched == 0 || exhausted {
                break;
            }
        }
        tracing::debug!(microsite = %self.config.microsite_id, count = items.len(), "collected pages");
        Ok(items)
    }
}
