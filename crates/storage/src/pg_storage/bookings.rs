//! BookingStore implementation for PgStorage.

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use tripdesk_core::{Booking, BookingFilter, BookingReference, NewBooking, User};

use super::{BOOKING_COLUMNS, PgStorage, count_to_u64, escape_like, new_id, row_to_booking, usize_to_i64};
use crate::error::StorageError;
use crate::traits::BookingStore;
use crate::types::PaginatedResult;

fn push_filter<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &'a BookingFilter) {
    qb.push(" WHERE TRUE");
    if let Some(user_id) = &filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(microsite) = &filter.microsite_id {
        qb.push(" AND microsite_id = ").push_bind(microsite);
    }
    if let Some(destination) = &filter.destination {
        qb.push(" AND destination ILIKE ")
            .push_bind(format!("%{}%", escape_like(destination.trim())))
            .push(" ESCAPE '\\'");
    }
    if let Some(from) = filter.departs_from {
        qb.push(" AND start_date >= ").push_bind(from);
    }
    if let Some(to) = filter.departs_to {
        qb.push(" AND start_date <= ").push_bind(to);
    }
}

#[async_trait]
impl BookingStore for PgStorage {
    async fn upsert_booking(&self, booking: &NewBooking) -> Result<Booking, StorageError> {
        let row = sqlx::query(&format!(
            "INSERT INTO bookings (id, booking_reference, external_id, microsite_id, user_id, agency_id,
                                   status, client_email, client_name, destination, start_date, end_date,
                                   total_price, currency, accommodations, activities, transports,
                                   vouchers, raw_data)
             VALUES ($1, $2, $3, $4,
                     (SELECT u.id FROM users u WHERE LOWER(u.email) = LOWER($7)),
                     $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
             ON CONFLICT (microsite_id, external_id) DO UPDATE SET
               booking_reference = EXCLUDED.booking_reference,
               user_id = EXCLUDED.user_id,
               agency_id = EXCLUDED.agency_id,
               status = EXCLUDED.status,
               client_email = EXCLUDED.client_email,
               client_name = EXCLUDED.client_name,
               destination = EXCLUDED.destination,
               start_date = EXCLUDED.start_date,
               end_date = EXCLUDED.end_date,
               total_price = EXCLUDED.total_price,
               currency = EXCLUDED.currency,
               accommodations = EXCLUDED.accommodations,
               activities = EXCLUDED.activities,
               transports = EXCLUDED.transports,
               vouchers = EXCLUDED.vouchers,
               raw_data = EXCLUDED.raw_data,
               updated_at = NOW()
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(new_id())
        .bind(&booking.booking_reference)
        .bind(&booking.external_id)
        .bind(&booking.microsite_id)
        .bind(&booking.agency_id)
        .bind(booking.status.as_str())
        .bind(booking.client_email.as_deref().map(str::to_lowercase))
        .bind(&booking.client_name)
        .bind(&booking.destination)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.total_price)
        .bind(&booking.currency)
        .bind(&booking.accommodations)
        .bind(&booking.activities)
        .bind(&booking.transports)
        .bind(&booking.vouchers)
        .bind(&booking.raw_data)
        .fetch_one(&self.pool)
        .await?;
        let stored = row_to_booking(&row)?;
        tracing::debug!(
            reference = %stored.booking_reference,
            microsite = %stored.microsite_id,
            linked = stored.user_id.is_some(),
            "booking upserted"
        );
        Ok(stored)
    }

    async fn get_booking(&self, id: &str) -> Result<Option<Booking>, StorageError> {
        let row = sqlx::query(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| row_to_booking(&r)).transpose()
    }

    async fn get_booking_by_reference(
        &self,
        reference: &BookingReference,
    ) -> Result<Option<Booking>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings
              WHERE booking_reference = $1 OR external_id = $1 OR external_id = $2
              ORDER BY (booking_reference = $1) DESC, updated_at DESC
              LIMIT 1"
        ))
        .bind(reference.to_string())
        .bind(reference.numeric_id())
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| row_to_booking(&r)).transpose()
    }

    async fn list_bookings(
        &self,
        filter: &BookingFilter,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<Booking>, StorageError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM bookings");
        push_filter(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {BOOKING_COLUMNS} FROM bookings"));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY start_date DESC NULLS LAST, created_at DESC LIMIT ")
            .push_bind(usize_to_i64(limit))
            .push(" OFFSET ")
            .push_bind(usize_to_i64(offset));
        let rows = qb.build().fetch_all(&self.pool).await?;
        let items = rows.iter().map(row_to_booking).collect::<Result<Vec<_>, _>>()?;

        Ok(PaginatedResult {
            items,
            total: count_to_u64(total),
            offset: u64::try_from(offset).unwrap_or(0),
            limit: u64::try_from(limit).unwrap_or(0),
        })
    }

    async fn bookings_for_user(&self, user_id: &str) -> Result<Vec<Booking>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1
              ORDER BY start_date ASC NULLS LAST, created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_booking).collect()
    }

    async fn link_bookings_for_user(&self, user: &User) -> Result<u64, StorageError> {
        let mut tx = self.pool.begin().await?;
        let unlinked = sqlx::query(
            "UPDATE bookings SET user_id = NULL, updated_at = NOW()
              WHERE user_id = $1 AND LOWER(client_email) IS DISTINCT FROM LOWER($2)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        let linked = sqlx::query(
            "UPDATE bookings SET user_id = $1, updated_at = NOW()
              WHERE LOWER(client_email) = LOWER($2) AND user_id IS DISTINCT FROM $1",
        )
        .bind(&user.id)
        .bind(&user.email)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        tx.commit().await?;
        if linked > 0 || unlinked > 0 {
            tracing::info!(user = %user.id, linked, unlinked, "relinked bookings by client email");
        }
        Ok(linked)
    }

    async fn delete_booking(&self, id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
