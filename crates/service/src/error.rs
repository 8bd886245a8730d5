//! Typed error enum for the service layer.
//!
//! Unifies storage, upstream, LLM and validation failures so HTTP and CLI
//! callers can match on the failure mode instead of inspecting messages.

use thiserror::Error;
use tripdesk_compositor::CompositorError;
use tripdesk_core::CoreError;
use tripdesk_llm::LlmError;
use tripdesk_storage::StorageError;

/// Service-layer error unifying storage, upstream and LLM failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed (DB, not found, duplicate, etc.).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Travel Compositor call failed.
    #[error("upstream: {0}")]
    Compositor(#[from] CompositorError),

    /// LLM API call failed.
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    /// Domain validation failed (bad reference, bad email).
    #[error("{0}")]
    Core(#[from] CoreError),

    /// Caller provided invalid input (empty title, closed feature, etc.).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Required backend (LLM, microsite credentials) is not configured.
    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
}

impl ServiceError {
    pub(crate) fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound { entity, id: id.to_owned() }
    }

    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::Compositor(e) => e.is_transient(),
            Self::Llm(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Whether this error represents a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Storage(StorageError::NotFound { .. }))
    }

    /// Whether this error represents a duplicate/conflict.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_duplicate())
    }

    /// Whether the caller sent something unusable.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::Core(CoreError::InvalidInput(_) | CoreError::InvalidReference(_))
        )
    }

    /// Whether a backend needed for the call is missing.
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured(_) | Self::Compositor(CompositorError::NotConfigured(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(ServiceError::not_found("user", "u1").is_not_found());
        assert!(
            ServiceError::Storage(StorageError::NotFound { entity: "user", id: "u1".to_owned() })
                .is_not_found()
        );
        assert!(ServiceError::Storage(StorageError::Duplicate("email".to_owned())).is_duplicate());
        assert!(ServiceError::Core(CoreError::InvalidReference("x".to_owned())).is_invalid_input());
        assert!(!ServiceError::Core(CoreError::Config("x".to_owned())).is_invalid_input());
        assert!(
            ServiceError::Compositor(CompositorError::NotConfigured("none".to_owned()))
                .is_not_configured()
        );
        assert!(ServiceError::Compositor(CompositorError::Timeout("site".to_owned())).is_transient());
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(ServiceError::not_found("booking", "RRP-1").to_string(), "booking 'RRP-1' not found");
    }
}
