use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use tripdesk_core::TravelIdea;
use tripdesk_service::ImportReport;
use tripdesk_storage::PaginatedResult;

use crate::AppState;
use crate::api_error::ApiError;
use crate::query_types::{IdeaListQuery, ImportIdeasRequest};
use crate::response_types::{ApiResponse, ok};

pub async fn list_ideas(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdeaListQuery>,
) -> Result<Json<ApiResponse<PaginatedResult<TravelIdea>>>, ApiError> {
    let page = state
        .services
        .ideas
        .list(query.destination.as_deref(), query.offset, query.capped_limit())
        .await?;
    Ok(ok(page))
}

pub async fn get_idea(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TravelIdea>>, ApiError> {
    Ok(ok(state.services.ideas.get(&id).await?))
}

pub async fn import_ideas(
    State(state): State<Arc<AppState>>,
    Query(request): Query<ImportIdeasRequest>,
) -> Result<Json<ApiResponse<Vec<ImportReport>>>, ApiError> {
    let reports = state.services.imports.import_travel_ideas(request.microsite.as_deref()).await?;
    Ok(ok(reports))
}

pub async fn generate_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TravelIdea>>, ApiError> {
    Ok(ok(state.services.ideas.generate_content(&id).await?))
}
