use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tripdesk_core::{Booking, NewUser, User, UserUpdate};
use tripdesk_storage::PaginatedResult;

use crate::AppState;
use crate::api_error::ApiError;
use crate::query_types::PageQuery;
use crate::response_types::{ApiResponse, DeleteResponse, ok};

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<PaginatedResult<User>>>, ApiError> {
    Ok(ok(state.services.users.list_users(query.offset, query.capped_limit()).await?))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewUser>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let user = state.services.users.create_user(input).await?;
    Ok((StatusCode::CREATED, ok(user)))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    Ok(ok(state.services.users.get_user(&id).await?))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    Ok(ok(state.services.users.update_user(&id, update).await?))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeleteResponse>>, ApiError> {
    state.services.users.delete_user(&id).await?;
    Ok(ok(DeleteResponse { deleted: true, id }))
}

pub async fn user_bookings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Booking>>>, ApiError> {
    Ok(ok(state.services.users.user_bookings(&id).await?))
}
