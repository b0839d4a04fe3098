//! Error types for warden-governor.

use thiserror::Error;

/// Governor error types.
#[derive(Debug, Error)]
pub enum GovernorError {
    #[error("Validation failed: {0}")]
    Validation(#[from] warden_core::CoreError),

    #[error("Audit write failed: {0}")]
    Audit(#[from] warden_audit::AuditError),

    #[error("Portfolio context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("Governor mailbox closed")]
    MailboxClosed,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for governor operations.
pub type GovernorResult<T> = std::result::Result<T, GovernorError>;
