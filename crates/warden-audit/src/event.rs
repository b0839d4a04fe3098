//! The closed set of audit events.
//!
//! Every pipeline outcome is one of these tagged records. The tag doubles as
//! the wire event name consumed by downstream audit/UI collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::{
    DecisionId, GovernanceDecision, OrderId, OrderProposal, OrderRecord, RiskAlert, TradeIntent,
};

/// A pipeline event destined for the audit log and the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum AuditEvent {
    /// A governance decision was made.
    #[serde(rename = "governance.decision")]
    GovernanceDecision { decision: GovernanceDecision },

    /// An intent was approved unchanged.
    #[serde(rename = "trade.approved")]
    TradeApproved {
        intent: TradeIntent,
        decision_id: DecisionId,
    },

    /// An intent was modified and the derived copy forwarded.
    #[serde(rename = "trade.modified")]
    TradeModified {
        original: TradeIntent,
        modified: TradeIntent,
        decision_id: DecisionId,
    },

    /// An intent was blocked outright.
    #[serde(rename = "trade.blocked")]
    TradeBlocked {
        intent: TradeIntent,
        decision_id: DecisionId,
        reason: String,
    },

    /// A risk alert was raised.
    #[serde(rename = "risk.alert")]
    RiskAlert { alert: RiskAlert },

    /// An order passed the gate and was handed to execution.
    #[serde(rename = "order.placed")]
    OrderPlaced { record: OrderRecord },

    /// An order was blocked by the gate.
    #[serde(rename = "order.blocked")]
    OrderBlocked {
        proposal: OrderProposal,
        reason: String,
    },

    /// The gate passed but persistence/execution failed afterwards.
    #[serde(rename = "order.error")]
    OrderError {
        proposal: OrderProposal,
        record_id: Option<OrderId>,
        error: String,
    },
}

impl AuditEvent {
    /// The wire event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GovernanceDecision { .. } => "governance.decision",
            Self::TradeApproved { .. } => "trade.approved",
            Self::TradeModified { .. } => "trade.modified",
            Self::TradeBlocked { .. } => "trade.blocked",
            Self::RiskAlert { .. } => "risk.alert",
            Self::OrderPlaced { .. } => "order.placed",
            Self::OrderBlocked { .. } => "order.blocked",
            Self::OrderError { .. } => "order.error",
        }
    }

    /// Stable key for duplicate suppression in at-least-once handlers.
    pub fn record_key(&self) -> String {
        match self {
            Self::GovernanceDecision { decision } => decision.id.to_string(),
            Self::TradeApproved { decision_id, .. } => format!("{decision_id}/approved"),
            Self::TradeModified { decision_id, .. } => format!("{decision_id}/modified"),
            Self::TradeBlocked { decision_id, .. } => format!("{decision_id}/blocked"),
            Self::RiskAlert { alert } => alert.id.to_string(),
            Self::OrderPlaced { record } => record.id.to_string(),
            Self::OrderBlocked { proposal, reason } => {
                format!("{}/{}/{reason}", proposal.workspace_id, proposal.symbol)
            }
            Self::OrderError { proposal, error, .. } => {
                format!("{}/{}/{error}", proposal.workspace_id, proposal.symbol)
            }
        }
    }
}

/// What actually lands on a log line: the event plus the append timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEnvelope {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: AuditEvent,
}

impl AuditEnvelope {
    pub fn now(event: AuditEvent) -> Self {
        Self {
            at: Utc::now(),
            event,
        }
    }
}
