//! Locate a booking by reference across every configured microsite.
//!
//! Lookup order: TTL cache, then a direct fetch raced across microsites,
//! then a reverse paginated scan of recent date windows. The first microsite
//! returning a matching booking wins and the remaining requests are dropped.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures_util::StreamExt;
use futures_util::future::join_all;
use futures_util::stream::FuturesUnordered;
use serde::Serialize;
use serde_json::Value;
use tripdesk_core::{
    BookingReference, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS,
    DEFAULT_CONFIG_SEARCH_TIMEOUT_SECS, DEFAULT_MAX_PAGES_PER_WINDOW, DEFAULT_PAGE_SIZE,
    DEFAULT_SEARCH_LOOKBACK_DAYS, DEFAULT_SEARCH_WINDOW_DAYS, MAX_SEARCH_LOOKBACK_DAYS, MicrositeConfig,
    env_parse_with_default,
};

use crate::cache::TtlCache;
use crate::client::CompositorClient;
use crate::date_window::{DateRange, backward_windows};
use crate::error::CompositorError;
use crate::mapping::booking_matches;

/// Tuning for [`BookingFinder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub window_days: u32,
    pub max_lookback_days: u32,
    pub page_size: u32,
    pub max_pages_per_window: u32,
    /// Budget for one microsite within a single search stage.
    pub per_config_timeout: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            window_days: DEFAULT_SEARCH_WINDOW_DAYS,
            max_lookback_days: DEFAULT_SEARCH_LOOKBACK_DAYS,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages_per_window: DEFAULT_MAX_PAGES_PER_WINDOW,
            per_config_timeout: Duration::from_secs(DEFAULT_CONFIG_SEARCH_TIMEOUT_SECS),
        }
    }
}

impl SearchSettings {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_ttl: Duration::from_secs(env_parse_with_default(
                "TRIPDESK_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )),
            cache_capacity: defaults.cache_capacity,
            window_days: env_parse_with_default("TRIPDESK_SEARCH_WINDOW_DAYS", defaults.window_days),
            max_lookback_days: env_parse_with_default(
                "TRIPDESK_SEARCH_LOOKBACK_DAYS",
                defaults.max_lookback_days,
            ),
            page_size: env_parse_with_default("TRIPDESK_SEARCH_PAGE_SIZE", defaults.page_size),
            max_pages_per_window: env_parse_with_default(
                "TRIPDESK_SEARCH_MAX_PAGES",
                defaults.max_pages_per_window,
            ),
            per_config_timeout: Duration::from_secs(env_parse_with_default(
                "TRIPDESK_CONFIG_TIMEOUT_SECS",
                defaults.per_config_timeout.as_secs(),
            )),
        }
        .bounded()
    }

    /// Clamp scan lengths and sizes to workable ranges.
    #[must_use]
    pub fn bounded(mut self) -> Self {
        self.window_days = self.window_days.clamp(1, MAX_SEARCH_LOOKBACK_DAYS);
        self.max_lookback_days = self.max_lookback_days.min(MAX_SEARCH_LOOKBACK_DAYS);
        self.page_size = self.page_size.max(1);
        self.max_pages_per_window = self.max_pages_per_window.max(1);
        self
    }
}

/// How a booking was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    Cache,
    Direct,
    Scan,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoundBooking {
    pub microsite_id: String,
    pub strategy: SearchStrategy,
    pub booking: Value,
}

/// Result of listing one microsite during an all-settled fan-out.
#[derive(Debug)]
pub struct MicrositeListing {
    pub microsite_id: String,
    pub result: Result<Vec<Value>, CompositorError>,
}

enum StageOutcome {
    Found(FoundBooking),
    /// Nothing found. Carries the last error only when every microsite failed.
    Missed(Option<CompositorError>),
}

pub struct BookingFinder {
    clients: Vec<Arc<CompositorClient>>,
    cache: Arc<TtlCache<String, FoundBooking>>,
    settings: SearchSettings,
}

impl std::fmt::Debug for BookingFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingFinder")
            .field("microsites", &self.microsites())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl BookingFinder {
    #[must_use]
    pub fn new(clients: Vec<Arc<CompositorClient>>, settings: SearchSettings) -> Self {
        let cache = Arc::new(TtlCache::new(settings.cache_ttl, settings.cache_capacity));
        Self { clients, cache, settings }
    }

    /// Build one client per microsite config against `base_url`.
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be constructed.
    pub fn from_configs(
        configs: Vec<MicrositeConfig>,
        base_url: &str,
        settings: SearchSettings,
    ) -> Result<Self, CompositorError> {
        let clients = configs
            .into_iter()
            .map(|config| CompositorClient::new(config, base_url).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(clients, settings))
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<TtlCache<String, FoundBooking>> {
        &self.cache
    }

    #[must_use]
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    #[must_use]
    pub fn clients(&self) -> &[Arc<CompositorClient>] {
        &self.clients
    }

    #[must_use]
    pub fn client(&self, microsite_id: &str) -> Option<&Arc<CompositorClient>> {
        self.clients.iter().find(|c| c.microsite_id() == microsite_id)
    }

    #[must_use]
    pub fn microsites(&self) -> Vec<&str> {
        self.clients.iter().map(|c| c.microsite_id()).collect()
    }

    /// Drop a cached result so the next [`find`](Self::find) goes upstream.
    pub fn invalidate(&self, reference: &BookingReference) {
        self.cache.remove(reference.to_string().as_str());
    }

    /// Find `reference` in any configured microsite.
    ///
    /// `today` anchors the scan windows.
    ///
    /// # Errors
    /// Returns [`CompositorError::NotConfigured`] without clients, or the last
    /// error when every microsite failed during the scan.
    pub async fn find(
        &self,
        reference: &BookingReference,
        today: NaiveDate,
    ) -> Result<Option<FoundBooking>, CompositorError> {
        let key = reference.to_string();
        if let Some(mut hit) = self.cache.get(key.as_str()) {
            tracing::debug!(reference = %key, microsite = %hit.microsite_id, "booking cache hit");
            hit.strategy = SearchStrategy::Cache;
            return Ok(Some(hit));
        }
        if self.clients.is_empty() {
            return Err(CompositorError::NotConfigured("no microsite credentials loaded".to_owned()));
        }

        let direct = self.first_hit("direct", |client| direct_lookup(client, reference)).await;
        let found = match direct {
            StageOutcome::Found(found) => found,
            StageOutcome::Missed(_) => {
                match self
                    .first_hit("scan", |client| scan_lookup(client, reference, today, &self.settings))
                    .await
                {
                    StageOutcome::Found(found) => found,
                    StageOutcome::Missed(Some(err)) => return Err(err),
                    StageOutcome::Missed(None) => {
                        tracing::info!(reference = %key, "booking not found in any microsite");
                        return Ok(None);
                    },
                }
            },
        };

        tracing::info!(
            reference = %key,
            microsite = %found.microsite_id,
            strategy = ?found.strategy,
            "booking located"
        );
        self.cache.insert(key, found.clone());
        Ok(Some(found))
    }

    /// Run `lookup` against every client concurrently; first `Some` wins.
    async fn first_hit<'a, F, Fut>(&'a self, stage: &'static str, lookup: F) -> StageOutcome
    where
        F: Fn(&'a CompositorClient) -> Fut,
        Fut: Future<Output = Result<Option<FoundBooking>, CompositorError>> + 'a,
    {
        let timeout = self.settings.per_config_timeout;
        let mut pending: FuturesUnordered<_> = self
            .clients
            .iter()
            .map(|client| {
                let attempt = lookup(client.as_ref());
                async move {
                    let result = tokio::time::timeout(timeout, attempt).await.unwrap_or_else(|_| {
                        Err(CompositorError::Timeout(client.microsite_id().to_owned()))
                    });
                    (client.microsite_id(), result)
                }
            })
            .collect();

        let mut failures = 0usize;
        let mut last_error = None;
        while let Some((microsite, result)) = pending.next().await {
            match result {
                Ok(Some(found)) => return StageOutcome::Found(found),
                Ok(None) => tracing::debug!(stage, microsite, "no match"),
                Err(e) => {
                    tracing::warn!(stage, microsite, error = %e, "microsite search failed");
                    failures += 1;
                    last_error = Some(e);
                },
            }
        }
        StageOutcome::Missed(if failures == self.clients.len() { last_error } else { None })
    }

    /// List bookings in `range` from every microsite (or only `microsite`),
    /// waiting for all of them regardless of individual failures.
    pub async fn search_all(&self, range: &DateRange, microsite: Option<&str>) -> Vec<MicrositeListing> {
        let page_size = self.settings.page_size;
        let listings = self
            .clients
            .iter()
            .filter(|c| microsite.is_none_or(|m| c.microsite_id() == m))
            .map(|client| async move {
                MicrositeListing {
                    microsite_id: client.microsite_id().to_owned(),
                    result: client.list_all_bookings(range, page_size).await,
                }
            });
        join_all(listings).await
    }
}

async fn direct_lookup(
    client: &CompositorClient,
    reference: &BookingReference,
) -> Result<Option<FoundBooking>, CompositorError> {
    for candidate in reference.lookup_candidates() {
        match client.get_booking(&candidate).await {
            Ok(Some(raw)) if booking_matches(&raw, reference) => {
                return Ok(Some(FoundBooking {
                    microsite_id: client.microsite_id().to_owned(),
                    strategy: SearchStrategy::Direct,
                    booking: raw,
                }));
            },
            Ok(Some(_)) => {
                tracing::debug!(microsite = client.microsite_id(), %candidate, "direct fetch returned another booking");
            },
            Ok(None) => {},
            // The upstream answers 400 for ids it cannot parse; try the next candidate.
            Err(CompositorError::HttpStatus { code: 400, .. }) => {
                tracing::debug!(microsite = client.microsite_id(), %candidate, "candidate rejected upstream");
            },
            Err(e) => return Err(e),
        }
    }
    Ok(None)
}

fn matching_item(
    client: &CompositorClient,
    items: Vec<Value>,
    reference: &BookingReference,
) -> Option<FoundBooking> {
    items.into_iter().find(|item| booking_matches(item, reference)).map(|booking| FoundBooking {
        microsite_id: client.microsite_id().to_owned(),
        strategy: SearchStrategy::Scan,
        booking,
    })
}

/// Walk date windows newest first. Within a window the first page gives the
/// total, then pages are read from the last one backwards. Listings without a
/// total are walked forwards until a short page.
async fn scan_lookup(
    client: &CompositorClient,
    reference: &BookingReference,
    today: NaiveDate,
    settings: &SearchSettings,
) -> Result<Option<FoundBooking>, CompositorError> {
    let page_size = settings.page_size.max(1);
    let budget = settings.max_pages_per_window.saturating_sub(1);
    for window in backward_windows(today, settings.window_days, settings.max_lookback_days) {
        let first_page = client.list_bookings(&window, 0, page_size).await?;
        let total = first_page.total;
        let pages = first_page.page_count(page_size);
        let first_full = first_page.is_full(page_size);
        tracing::debug!(
            microsite = client.microsite_id(),
            from = %window.from,
            to = %window.to,
            total = ?total,
            pages,
            "scanning window"
        );
        if let Some(found) = matching_item(client, first_page.items, reference) {
            return Ok(Some(found));
        }

        if total.is_some() {
            for page_index in (1..pages).rev().take(budget as usize) {
                let page =
                    client.list_bookings(&window, page_index.saturating_mul(page_size), page_size).await?;
                if let Some(found) = matching_item(client, page.items, reference) {
                    return Ok(Some(found));
                }
            }
        } else if first_full {
            for page_index in 1..=budget {
                let page =
                    client.list_bookings(&window, page_index.saturating_mul(page_size), page_size).await?;
                let full = page.is_full(page_size);
                if let Some(found) = matching_item(client, page.items, reference) {
                    return Ok(Some(found));
                }
                if !full {
                    break;
                }
            }
        }
    }
    Ok(None)
}
