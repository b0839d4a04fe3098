//! The audit sink: durable log first, then bus.

use crate::bus::EventBus;
use crate::error::AuditResult;
use crate::event::{AuditEnvelope, AuditEvent};
use crate::log::AuditLog;
use parking_lot::Mutex;
use tracing::error;

/// Combined audit endpoint shared by the governor and the gate.
///
/// `record` appends the event to the append-only log and flushes before
/// publishing to the bus: subscribers can only ever observe events that are
/// already durable. A bus with no subscribers is fine; a log write failure
/// is not, and is returned to the caller so it can fail closed.
pub struct AuditSink {
    log: Mutex<AuditLog>,
    bus: EventBus,
}

impl AuditSink {
    pub fn new(log: AuditLog, bus: EventBus) -> Self {
        Self {
            log: Mutex::new(log),
            bus,
        }
    }

    /// Durably record an event, then publish it.
    pub fn record(&self, event: AuditEvent) -> AuditResult<()> {
        let envelope = AuditEnvelope::now(event.clone());
        self.log.lock().append_durable(envelope)?;
        self.bus.publish(event);
        Ok(())
    }

    /// Record an observational event; a failure is logged, not propagated.
    ///
    /// Used for scan-cycle alerts where losing one observation must not
    /// take down the scan loop.
    pub fn record_observational(&self, event: AuditEvent) {
        if let Err(e) = self.record(event) {
            error!(error = %e, "failed to record observational event");
        }
    }

    /// Subscribe to the underlying bus.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<AuditEvent> {
        self.bus.subscribe()
    }

    /// Handle to the underlying bus.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}
