use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use tripdesk_service::{ChatInput, ChatReply};

use crate::AppState;
use crate::api_error::ApiError;
use crate::response_types::{ApiResponse, ok};

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ChatInput>,
) -> Result<Json<ApiResponse<ChatReply>>, ApiError> {
    Ok(ok(state.services.assistant.chat(input).await?))
}
