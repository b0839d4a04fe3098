//! Event bus and append-only audit log.
//!
//! The audit log is the sole source of truth for "what decision was made":
//! no governance decision or order is considered final until it has been
//! durably appended. The bus redistributes the same events to in-process
//! subscribers with at-least-once semantics, so every handler must tolerate
//! duplicate delivery.

pub mod bus;
pub mod error;
pub mod event;
pub mod log;
pub mod sink;

pub use bus::EventBus;
pub use error::{AuditError, AuditResult};
pub use event::{AuditEnvelope, AuditEvent};
pub use log::AuditLog;
pub use sink::AuditSink;
