use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use tripdesk_service::Dashboard;

use crate::AppState;
use crate::api_error::ApiError;
use crate::response_types::{ApiResponse, ok};

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Dashboard>>, ApiError> {
    Ok(ok(state.services.dashboard.dashboard(Utc::now().date_naive()).await?))
}
