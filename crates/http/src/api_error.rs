//! Typed API error for HTTP handlers.
//!
//! Converts service errors into JSON responses of the form
//! `{"success": false, "error": "..."}` with a matching status code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tripdesk_service::ServiceError;

/// API error with HTTP status code and human-readable message.
///
/// `Internal` logs the real error server-side and returns a static message.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request: invalid input from caller.
    BadRequest(String),
    /// 404 Not Found: requested resource doesn't exist.
    NotFound(String),
    /// 422 Unprocessable Entity: valid syntax but semantic rejection (e.g., duplicate).
    UnprocessableEntity(String),
    /// 500 Internal Server Error: unexpected failure. Details logged, not exposed.
    Internal(anyhow::Error),
    /// 502 Bad Gateway: Travel Compositor or the AI provider failed.
    BadGateway(String),
    /// 503 Service Unavailable: required backend not configured.
    ServiceUnavailable(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::UnprocessableEntity(msg)
            | Self::ServiceUnavailable(msg) => msg,
            Self::BadGateway(msg) => {
                tracing::warn!(error = %msg, "upstream failure");
                msg
            },
            Self::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                "internal server error".to_owned()
            },
        };
        let body = serde_json::json!({"success": false, "error": message});
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        if err.is_duplicate() {
            return Self::UnprocessableEntity(err.to_string());
        }
        if err.is_not_found() {
            return Self::NotFound(match err {
                ServiceError::Storage(inner) => inner.to_string(),
                other => other.to_string(),
            });
        }
        if err.is_invalid_input() {
            return Self::BadRequest(err.to_string());
        }
        if err.is_not_configured() {
            return Self::ServiceUnavailable(err.to_string());
        }
        match err {
            ServiceError::Compositor(e) => Self::BadGateway(format!("Travel Compositor: {e}")),
            ServiceError::Llm(e) => {
                tracing::warn!(error = %e, "AI provider call failed");
                Self::BadGateway("AI provider request failed".to_owned())
            },
            other => Self::Internal(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tripdesk_compositor::CompositorError;
    use tripdesk_core::CoreError;
    use tripdesk_storage::StorageError;

    use super::*;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let (status, body) = body_json(ApiError::BadRequest("limit too large".to_owned())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"success": false, "error": "limit too large"}));
    }

    #[tokio::test]
    async fn test_internal_errors_are_masked() {
        let (status, body) = body_json(ApiError::Internal(anyhow::anyhow!("password=hunter2"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal server error");
    }

    #[test]
    fn test_service_error_mapping() {
        let cases = [
            (ServiceError::Storage(StorageError::Duplicate("email".to_owned())), StatusCode::UNPROCESSABLE_ENTITY),
            (
                ServiceError::Storage(StorageError::NotFound { entity: "user", id: "u1".to_owned() }),
                StatusCode::NOT_FOUND,
            ),
            (ServiceError::NotFound { entity: "booking", id: "RRP-1".to_owned() }, StatusCode::NOT_FOUND),
            (ServiceError::Core(CoreError::InvalidReference("x".to_owned())), StatusCode::BAD_REQUEST),
            (ServiceError::InvalidInput("empty".to_owned()), StatusCode::BAD_REQUEST),
            (ServiceError::NotConfigured("llm".to_owned()), StatusCode::SERVICE_UNAVAILABLE),
            (
                ServiceError::Compositor(CompositorError::NotConfigured("none".to_owned())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (ServiceError::Compositor(CompositorError::Timeout("siteone".to_owned())), StatusCode::BAD_GATEWAY),
            (ServiceError::Core(CoreError::Config("bad".to_owned())), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            let label = err.to_string();
            assert_eq!(ApiError::from(err).status(), expected, "{label}");
        }
    }
}
