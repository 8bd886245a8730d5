use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tripdesk_compositor::mapping::booking_from_upstream;
use tripdesk_compositor::{BookingFinder, SearchStrategy};
use tripdesk_core::{Booking, BookingFilter, BookingReference, MAX_QUERY_LIMIT};
use tripdesk_storage::PaginatedResult;
use tripdesk_storage::traits::BookingStore;

use crate::ServiceError;

/// Where a looked-up booking came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingSource {
    Database,
    Cache,
    Direct,
    Scan,
}

impl From<SearchStrategy> for BookingSource {
    fn from(strategy: SearchStrategy) -> Self {
        match strategy {
            SearchStrategy::Cache => Self::Cache,
            SearchStrategy::Direct => Self::Direct,
            SearchStrategy::Scan => Self::Scan,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingLookup {
    pub booking: Booking,
    pub source: BookingSource,
}

pub struct BookingService {
    storage: Arc<dyn BookingStore>,
    finder: Arc<BookingFinder>,
}

impl BookingService {
    #[must_use]
    pub fn new(storage: Arc<dyn BookingStore>, finder: Arc<BookingFinder>) -> Self {
        Self { storage, finder }
    }

    /// Look a booking up by its human reference.
    ///
    /// The database answers first unless `refresh` is set. Otherwise every
    /// configured microsite is searched and the hit is stored, which also
    /// links it to the user owning its client email.
    pub async fn find_booking(
        &self,
        raw_reference: &str,
        refresh: bool,
    ) -> Result<Option<BookingLookup>, ServiceError> {
        self.find_booking_on(raw_reference, refresh, Utc::now().date_naive()).await
    }

    /// [`Self::find_booking`] with an explicit anchor date for the scan windows.
    pub async fn find_booking_on(
        &self,
        raw_reference: &str,
        refresh: bool,
        today: NaiveDate,
    ) -> Result<Option<BookingLookup>, ServiceError> {
        let reference = BookingReference::parse(raw_reference)?;

        if refresh {
            self.finder.invalidate(&reference);
        } else if let Some(booking) = self.storage.get_booking_by_reference(&reference).await? {
            tracing::debug!(reference = %reference, "booking served from database");
            return Ok(Some(BookingLookup { booking, source: BookingSource::Database }));
        }

        let Some(found) = self.finder.find(&reference, today).await? else {
            return Ok(None);
        };
        let Some(new_booking) = booking_from_upstream(&found.microsite_id, &found.booking) else {
            tracing::warn!(
                reference = %reference,
                microsite = %found.microsite_id,
                "located booking has no upstream id, not stored"
            );
            return Ok(None);
        };
        let booking = self.storage.upsert_booking(&new_booking).await?;
        Ok(Some(BookingLookup { booking, source: found.strategy.into() }))
    }

    pub async fn get_booking(&self, id: &str) -> Result<Booking, ServiceError> {
        self.storage.get_booking(id).await?.ok_or_else(|| ServiceError::not_found("booking", id))
    }

    pub async fn list_bookings(
        &self,
        filter: &BookingFilter,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<Booking>, ServiceError> {
        if let (Some(from), Some(to)) = (filter.departs_from, filter.departs_to) {
            if from > to {
                return Err(ServiceError::InvalidInput(format!(
                    "departs_from {from} is after departs_to {to}"
                )));
            }
        }
        Ok(self.storage.list_bookings(filter, offset, limit.min(MAX_QUERY_LIMIT)).await?)
    }

    pub async fn bookings_for_user(&self, user_id: &str) -> Result<Vec<Booking>, ServiceError> {
        Ok(self.storage.bookings_for_user(user_id).await?)
    }

    #[must_use]
    pub fn finder(&self) -> &Arc<BookingFinder> {
        &self.finder
    }
}
