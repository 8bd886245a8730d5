use async_trait::async_trait;
use tripdesk_core::{Booking, BookingFilter, BookingReference, NewBooking, User};

use crate::error::StorageError;
use crate::types::PaginatedResult;

/// Persistence of imported bookings.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Insert or update by `(microsite_id, external_id)`.
    ///
    /// `user_id` is resolved from the lower-cased `client_email` in the same
    /// statement.
    async fn upsert_booking(&self, booking: &NewBooking) -> Result<Booking, StorageError>;

    async fn get_booking(&self, id: &str) -> Result<Option<Booking>, StorageError>;

    /// Match on the stored reference, or on the upstream id for the numeric part.
    async fn get_booking_by_reference(
        &self,
        reference: &BookingReference,
    ) -> Result<Option<Booking>, StorageError>;

    async fn list_bookings(
        &self,
        filter: &BookingFilter,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<Booking>, StorageError>;

    /// Bookings linked to a user, earliest departure first.
    async fn bookings_for_user(&self, user_id: &str) -> Result<Vec<Booking>, StorageError>;

    /// Point every booking whose client email matches `user` at that user,
    /// and unlink bookings whose email no longer matches. Returns rows linked.
    async fn link_bookings_for_user(&self, user: &User) -> Result<u64, StorageError>;

    /// Returns `true` if a row was deleted.
    async fn delete_booking(&self, id: &str) -> Result<bool, StorageError>;
}
