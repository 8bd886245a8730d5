//! Bulk import of bookings and travel ideas from every configured microsite.

use std::sync::Arc;

use futures_util::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tripdesk_compositor::mapping::{booking_from_upstream, travel_idea_from_upstream};
use tripdesk_compositor::{BookingFinder, CompositorClient, DateRange};
use tripdesk_storage::traits::{BookingStore, TravelIdeaStore};

use crate::ServiceError;

/// Error messages kept per microsite; further failures are only counted.
const MAX_REPORTED_ERRORS: usize = 20;

/// Outcome of importing one microsite.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ImportReport {
    pub microsite_id: String,
    pub fetched: usize,
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl ImportReport {
    fn new(microsite_id: &str) -> Self {
        Self { microsite_id: microsite_id.to_owned(), ..Self::default() }
    }

    fn record_error(&mut self, message: String) {
        self.failed += 1;
        if self.errors.len() < MAX_REPORTED_ERRORS {
            self.errors.push(message);
        }
    }
}

pub struct ImportService {
    bookings: Arc<dyn BookingStore>,
    ideas: Arc<dyn TravelIdeaStore>,
    finder: Arc<BookingFinder>,
}

impl ImportService {
    #[must_use]
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        ideas: Arc<dyn TravelIdeaStore>,
        finder: Arc<BookingFinder>,
    ) -> Self {
        Self { bookings, ideas, finder }
    }

    fn check_microsite(&self, microsite: Option<&str>) -> Result<(), ServiceError> {
        if self.finder.clients().is_empty() {
            return Err(ServiceError::NotConfigured("no microsite credentials loaded".to_owned()));
        }
        if let Some(id) = microsite {
            if self.finder.client(id).is_none() {
                return Err(ServiceError::not_found("microsite", id));
            }
        }
        Ok(())
    }

    /// Import bookings created in `range` from every selected microsite.
    ///
    /// One microsite failing never aborts the others; its report carries the error.
    pub async fn import_bookings(
        &self,
        range: &DateRange,
        microsite: Option<&str>,
    ) -> Result<Vec<ImportReport>, ServiceError> {
        self.check_microsite(microsite)?;
        let listings = self.finder.search_all(range, microsite).await;

        let mut reports = Vec::with_capacity(listings.len());
        for listing in listings {
            let mut report = ImportReport::new(&listing.microsite_id);
            match listing.result {
                Ok(items) => {
                    report.fetched = items.len();
                    self.store_bookings(&listing.microsite_id, &items, &mut report).await;
                },
                Err(e) => {
                    tracing::warn!(microsite = %listing.microsite_id, error = %e, "booking listing failed");
                    report.record_error(e.to_string());
                },
            }
            tracing::info!(
                microsite = %report.microsite_id,
                from = %range.from,
                to = %range.to,
                fetched = report.fetched,
                imported = report.imported,
                skipped = report.skipped,
                failed = report.failed,
                "booking import finished"
            );
            reports.push(report);
        }
        Ok(reports)
    }

    async fn store_bookings(&self, microsite_id: &str, items: &[Value], report: &mut ImportReport) {
        for raw in items {
            let Some(booking) = booking_from_upstream(microsite_id, raw) else {
                report.skipped += 1;
                continue;
            };
            match self.bookings.upsert_booking(&booking).await {
                Ok(_) => report.imported += 1,
                Err(e) => {
                    tracing::warn!(
                        microsite = %microsite_id,
                        external_id = %booking.external_id,
                        error = %e,
                        "booking upsert failed"
                    );
                    report.record_error(format!("{}: {e}", booking.external_id));
                },
            }
        }
    }

    /// Import the travel idea catalogue of every selected microsite.
    pub async fn import_travel_ideas(
        &self,
        microsite: Option<&str>,
    ) -> Result<Vec<ImportReport>, ServiceError> {
        self.check_microsite(microsite)?;
        let page_size = self.finder.settings().page_size;
        let imports = self
            .finder
            .clients()
            .iter()
            .filter(|c| microsite.is_none_or(|m| c.microsite_id() == m))
            .map(|client| self.import_ideas_from(client, page_size));
        Ok(join_all(imports).await)
    }

    async fn import_ideas_from(&self, client: &CompositorClient, page_size: u32) -> ImportReport {
        let microsite_id = client.microsite_id();
        let mut report = ImportReport::new(microsite_id);
        let summaries = match client.list_all_travel_ideas(page_size).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(microsite = %microsite_id, error = %e, "travel idea listing failed");
                report.record_error(e.to_string());
                return report;
            },
        };
        report.fetched = summaries.len();

        for summary in &summaries {
            let Some(id) = summary.get("id").and_then(id_string) else {
                report.skipped += 1;
                continue;
            };
            // The listing only carries summaries; prefer the detail when it loads.
            let detail = match client.get_travel_idea(&id).await {
                Ok(Some(detail)) => detail,
                Ok(None) => summary.clone(),
                Err(e) => {
                    tracing::debug!(microsite = %microsite_id, idea = %id, error = %e, "idea detail unavailable");
                    summary.clone()
                },
            };
            let Some(idea) = travel_idea_from_upstream(microsite_id, &detail) else {
                report.skipped += 1;
                continue;
            };
            match self.ideas.upsert_travel_idea(&idea).await {
                Ok(_) => report.imported += 1,
                Err(e) => report.record_error(format!("{id}: {e}")),
            }
        }
        tracing::info!(
            microsite = %microsite_id,
            fetched = report.fetched,
            imported = report.imported,
            skipped = report.skipped,
            failed = report.failed,
            "travel idea import finished"
        );
        report
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
