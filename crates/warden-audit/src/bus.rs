//! In-process event bus.
//!
//! Backed by `tokio::sync::broadcast`. Delivery is at-least-once from the
//! consumer's point of view: a subscriber that lags far enough to overflow
//! its buffer observes a `Lagged` error and must treat the stream as
//! possibly containing duplicates after resubscribing. Handlers therefore
//! key their side effects on [`crate::AuditEvent::record_key`].

use crate::event::AuditEvent;
use tokio::sync::broadcast;
use tracing::trace;

/// Default per-subscriber buffer depth.
const DEFAULT_CAPACITY: usize = 1024;

/// Publish/subscribe handle for audit events.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AuditEvent>,
}

impl EventBus {
    /// Create a bus with the default buffer depth.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus with an explicit per-subscriber buffer depth.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received it. Zero subscribers
    /// is not an error: the audit log, not the bus, is the source of truth.
    pub fn publish(&self, event: AuditEvent) -> usize {
        let name = event.name();
        match self.tx.send(event) {
            Ok(n) => {
                trace!(event = name, receivers = n, "published");
                n
            }
            Err(_) => 0,
        }
    }

    /// Subscribe to all subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<AuditEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::{GovernanceAction, GovernanceDecision, IntentId};

    fn sample_event() -> AuditEvent {
        AuditEvent::GovernanceDecision {
            decision: GovernanceDecision::new(
                IntentId::new(),
                "monarch",
                GovernanceAction::Approve,
                "ok",
                Vec::new(),
                Vec::new(),
                0.7,
                1,
            ),
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        let event = sample_event();
        assert_eq!(bus.publish(event.clone()), 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.record_key(), event.record_key());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_not_an_error() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(sample_event()), 0);
    }

    #[tokio::test]
    async fn test_each_subscriber_sees_every_event() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(sample_event());
        bus.publish(sample_event());

        for rx in [&mut a, &mut b] {
            assert!(rx.recv().await.is_ok());
            assert!(rx.recv().await.is_ok());
        }
    }
}
