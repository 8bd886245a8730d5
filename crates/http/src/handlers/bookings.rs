use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use tripdesk_compositor::DateRange;
use tripdesk_core::Booking;
use tripdesk_service::{BookingLookup, ImportReport};
use tripdesk_storage::PaginatedResult;

use crate::AppState;
use crate::api_error::ApiError;
use crate::query_types::{BookingListQuery, ImportBookingsRequest, LookupQuery};
use crate::response_types::{ApiResponse, ok};

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<ApiResponse<PaginatedResult<Booking>>>, ApiError> {
    let filter = query.to_filter()?;
    let page =
        state.services.bookings.list_bookings(&filter, query.offset, query.capped_limit()).await?;
    Ok(ok(page))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(reference): Path<String>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<ApiResponse<BookingLookup>>, ApiError> {
    let found = state
        .services
        .bookings
        .find_booking(&reference, query.refresh)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("booking '{}' not found", reference.trim())))?;
    Ok(ok(found))
}

pub async fn import_bookings(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ImportBookingsRequest>,
) -> Result<Json<ApiResponse<Vec<ImportReport>>>, ApiError> {
    request.validate()?;
    let range = DateRange::new(request.from, request.to);
    let reports =
        state.services.imports.import_bookings(&range, request.microsite.as_deref()).await?;
    Ok(ok(reports))
}
