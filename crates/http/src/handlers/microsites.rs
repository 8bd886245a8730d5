use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use tripdesk_core::MicrositeSummary;

use crate::AppState;
use crate::response_types::{ApiResponse, ok};

pub async fn list_microsites(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<MicrositeSummary>>> {
    ok(state.services.dashboard.microsites())
}
