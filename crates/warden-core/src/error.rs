//! Error types for warden-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid trade intent: {0}")]
    InvalidIntent(String),

    #[error("Invalid order proposal: {0}")]
    InvalidProposal(String),

    #[error("Invalid trade modification: {0}")]
    InvalidModification(String),

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
