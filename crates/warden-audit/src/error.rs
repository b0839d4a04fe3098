//! Error types for warden-audit.

use thiserror::Error;

/// Audit substrate error types.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Audit log closed")]
    Closed,
}

/// Result type alias for audit operations.
pub type AuditResult<T> = std::result::Result<T, AuditError>;
