use std::result::Result as StdResult;

use thiserror::Error;

/// Errors raised while building or validating domain values.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid booking reference: {0}")]
    InvalidReference(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = StdResult<T, CoreError>;
