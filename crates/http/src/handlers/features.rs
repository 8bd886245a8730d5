use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tripdesk_core::{FeatureRequest, NewFeatureRequest};
use tripdesk_storage::PaginatedResult;

use crate::AppState;
use crate::api_error::ApiError;
use crate::query_types::{FeatureListQuery, StatusRequest, VoteRequest};
use crate::response_types::{ApiResponse, VoteResponse, ok};

pub async fn list_features(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FeatureListQuery>,
) -> Result<Json<ApiResponse<PaginatedResult<FeatureRequest>>>, ApiError> {
    let status = query.parsed_status()?;
    Ok(ok(state.services.features.list(status, query.offset, query.capped_limit()).await?))
}

pub async fn create_feature(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewFeatureRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FeatureRequest>>), ApiError> {
    let created = state.services.features.create(input).await?;
    Ok((StatusCode::CREATED, ok(created)))
}

pub async fn vote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<VoteRequest>,
) -> Result<Json<ApiResponse<VoteResponse>>, ApiError> {
    let vote_count = state.services.features.vote(&id, request.user_id.trim()).await?;
    Ok(ok(VoteResponse { feature_id: id, vote_count }))
}

pub async fn unvote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<VoteRequest>,
) -> Result<Json<ApiResponse<VoteResponse>>, ApiError> {
    let vote_count = state.services.features.unvote(&id, request.user_id.trim()).await?;
    Ok(ok(VoteResponse { feature_id: id, vote_count }))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<ApiResponse<FeatureRequest>>, ApiError> {
    let status = request.parsed()?;
    Ok(ok(state.services.features.update_status(&id, status).await?))
}
