//! Error types for warden-strategy.

use thiserror::Error;

/// Strategy error types.
///
/// Insufficient history is NOT an error: engines return a no-op decision
/// with an explanatory reason. Only genuinely missing inputs error.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Missing required market data: {0}")]
    MissingData(String),

    #[error("Invalid strategy configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for strategy operations.
pub type StrategyResult<T> = std::result::Result<T, StrategyError>;
