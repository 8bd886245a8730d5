//! Typed error enum for the Travel Compositor client.

use thiserror::Error;

/// Errors from Travel Compositor API operations.
#[derive(Debug, Error)]
pub enum CompositorError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("authentication failed for microsite {microsite_id}: {reason}")]
    Auth { microsite_id: String, reason: String },
    #[error("JSON parse error in {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("client initialization failed: {0}")]
    ClientInit(String),
    #[error("microsite {0} timed out")]
    Timeout(String),
    #[error("microsite not configured: {0}")]
    NotConfigured(String),
}

impl CompositorError {
    /// Whether this error is transient and worth retrying.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpRequest(_) | Self::Timeout(_) => true,
            Self::HttpStatus { code, .. } => matches!(code, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}
