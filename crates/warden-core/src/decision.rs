//! Governance decisions.
//!
//! A [`GovernanceDecision`] is the permanent record of what the governor did
//! with a trade intent. Once persisted it is never rewritten, only superseded
//! by a new record referencing the prior one.

use crate::ids::{DecisionId, IntentId};
use crate::SCHEMA_VERSION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Governance outcome for a trade intent.
///
/// Variants are ordered by severity: checks may escalate the action but
/// never downgrade it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GovernanceAction {
    /// Forward the intent unchanged.
    Approve,
    /// Modify the intent and forward the derived copy.
    SoftPull,
    /// Block the intent outright.
    HardPull,
}

impl GovernanceAction {
    /// Return the more severe of the two actions.
    pub fn escalate(self, other: Self) -> Self {
        self.max(other)
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::HardPull)
    }
}

impl fmt::Display for GovernanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => write!(f, "approve"),
            Self::SoftPull => write!(f, "soft_pull"),
            Self::HardPull => write!(f, "hard_pull"),
        }
    }
}

/// A single field adjustment applied to produce a modified intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeModification {
    /// Intent field being changed (e.g. "quantity").
    pub field: String,
    /// Value before the change, stringified.
    pub original_value: String,
    /// Value after the change, stringified.
    pub new_value: String,
    /// Why the change was made.
    pub reason: String,
}

/// Immutable record of a governance outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceDecision {
    /// Unique decision ID.
    pub id: DecisionId,
    /// The intent this decision applies to.
    pub trade_intent_id: IntentId,
    /// Name of the governor instance that decided.
    pub governor: String,
    /// The action taken.
    pub action: GovernanceAction,
    /// Human-readable explanation.
    pub reasoning: String,
    /// Ordered modifications (non-empty only for soft pulls).
    pub modifications: Vec<TradeModification>,
    /// Machine-readable tags for every check that fired.
    pub risk_factors: Vec<String>,
    /// Decision confidence in [0, 1].
    pub confidence: f64,
    /// Wall-clock evaluation time in milliseconds.
    pub processing_time_ms: u64,
    /// Prior decision this record supersedes, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<DecisionId>,
    /// Persisted schema version.
    pub schema_version: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl GovernanceDecision {
    /// Create a new decision record.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        trade_intent_id: IntentId,
        governor: impl Into<String>,
        action: GovernanceAction,
        reasoning: impl Into<String>,
        modifications: Vec<TradeModification>,
        risk_factors: Vec<String>,
        confidence: f64,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            id: DecisionId::new(),
            trade_intent_id,
            governor: governor.into(),
            action,
            reasoning: reasoning.into(),
            modifications,
            risk_factors,
            confidence,
            processing_time_ms,
            supersedes: None,
            schema_version: SCHEMA_VERSION,
            created_at: Utc::now(),
        }
    }

    /// Whether the intent may proceed downstream (possibly modified).
    pub fn allows_forwarding(&self) -> bool {
        !self.action.is_blocking()
    }
}
