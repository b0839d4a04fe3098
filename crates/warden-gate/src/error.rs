//! Error types for warden-gate.

use thiserror::Error;

/// Gate error types.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Validation failed: {0}")]
    Validation(#[from] warden_core::CoreError),

    #[error("Order persistence failed: {0}")]
    Persistence(String),

    #[error("Audit write failed: {0}")]
    Audit(#[from] warden_audit::AuditError),
}

/// Result type alias for gate operations.
pub type GateResult<T> = std::result::Result<T, GateError>;
