//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Core error: {0}")]
    Core(#[from] warden_core::CoreError),

    #[error("Governor error: {0}")]
    Governor(#[from] warden_governor::GovernorError),

    #[error("Gate error: {0}")]
    Gate(#[from] warden_gate::GateError),

    #[error("Audit error: {0}")]
    Audit(#[from] warden_audit::AuditError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] warden_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
