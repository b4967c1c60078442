//! Error types for the bouncing sphere crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BounceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    #[error("Driver task failed: {0}")]
    Driver(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BounceError>;
