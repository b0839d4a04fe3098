//! Order proposals and persisted order records.
//!
//! An [`OrderProposal`] is what reaches the order risk gate after governance.
//! An [`OrderRecord`] is the persisted outcome of a passing proposal. Record
//! status transitions are append-only: a status change produces a new record
//! referencing the prior one.

use crate::decimal::{Price, Qty};
use crate::error::{CoreError, Result};
use crate::ids::OrderId;
use crate::intent::{OrderSide, Symbol};
use crate::SCHEMA_VERSION;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution mode for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeMode {
    /// Simulated execution.
    #[default]
    Paper,
    /// Real broker execution.
    Live,
}

impl fmt::Display for TradeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paper => write!(f, "paper"),
            Self::Live => write!(f, "live"),
        }
    }
}

/// Protective limits attached to an order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderLimits {
    /// Stop-loss distance in percent of entry price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss_pct: Option<Decimal>,
    /// Take-profit distance in percent of entry price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit_pct: Option<Decimal>,
}

/// An order proposal submitted to the risk gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProposal {
    /// Owning workspace.
    pub workspace_id: String,
    /// Strategy run that produced the order, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    pub symbol: Symbol,
    pub side: OrderSide,
    pub qty: Qty,
    /// Limit price; None means priced at the current quote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// Caller-supplied notional override. Derived from qty and quote if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notional: Option<Decimal>,
    #[serde(default)]
    pub limits: OrderLimits,
    #[serde(default)]
    pub mode: TradeMode,
}

impl OrderProposal {
    /// Validate required fields. Rejected proposals produce no side effects.
    pub fn validate(&self) -> Result<()> {
        if self.workspace_id.is_empty() {
            return Err(CoreError::InvalidProposal("empty workspace_id".into()));
        }
        if self.symbol.is_empty() {
            return Err(CoreError::InvalidProposal("empty symbol".into()));
        }
        if !self.qty.is_positive() {
            return Err(CoreError::InvalidProposal(format!(
                "non-positive qty: {}",
                self.qty
            )));
        }
        if let Some(price) = self.price {
            if !price.is_positive() {
                return Err(CoreError::InvalidProposal(format!(
                    "non-positive price: {price}"
                )));
            }
        }
        if let Some(pct) = self.limits.stop_loss_pct {
            if pct.is_sign_negative() {
                return Err(CoreError::InvalidProposal(format!(
                    "negative stop_loss_pct: {pct}"
                )));
            }
        }
        if let Some(pct) = self.limits.take_profit_pct {
            if pct.is_sign_negative() {
                return Err(CoreError::InvalidProposal(format!(
                    "negative take_profit_pct: {pct}"
                )));
            }
        }
        Ok(())
    }

    /// Dollar exposure, preferring the explicit notional over qty × price.
    pub fn notional_at(&self, reference_price: Price) -> Decimal {
        match self.notional {
            Some(n) => n,
            None => {
                let price = self.price.unwrap_or(reference_price);
                self.qty.notional(price)
            }
        }
    }
}

/// Gate verdict recorded on the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorStatus {
    Pass,
    Fail,
}

/// Broker-side lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokerStatus {
    Placed,
    Rejected,
    Error,
}

/// Persisted record of an order that passed the gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub workspace_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    pub symbol: Symbol,
    pub side: OrderSide,
    pub qty: Qty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    pub limits: OrderLimits,
    pub mode: TradeMode,
    pub validator_status: ValidatorStatus,
    pub broker_status: BrokerStatus,
    /// Prior record this one supersedes, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<OrderId>,
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Create the initial record for a proposal that passed the gate.
    pub fn placed(proposal: &OrderProposal) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            workspace_id: proposal.workspace_id.clone(),
            run_id: proposal.run_id.clone(),
            symbol: proposal.symbol.clone(),
            side: proposal.side,
            qty: proposal.qty,
            price: proposal.price,
            limits: proposal.limits,
            mode: proposal.mode,
            validator_status: ValidatorStatus::Pass,
            broker_status: BrokerStatus::Placed,
            supersedes: None,
            schema_version: SCHEMA_VERSION,
            created_at: now,
            updated_at: now,
        }
    }

    /// Derive a superseding record with a new broker status.
    ///
    /// The original record is untouched; transitions are append-only.
    pub fn superseded_with(&self, broker_status: BrokerStatus) -> Self {
        let mut next = self.clone();
        next.id = OrderId::new();
        next.supersedes = Some(self.id.clone());
        next.broker_status = broker_status;
        next.updated_at = Utc::now();
        next
    }
}
