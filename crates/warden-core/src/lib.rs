//! Core domain types for the Warden trade governance pipeline.
//!
//! This crate provides the fundamental types shared by every stage of the
//! pipeline:
//! - `Price`, `Qty`: precision-safe numeric types
//! - `TradeIntent`: a proposed order emitted by a strategy, prior to governance
//! - `GovernanceDecision`: the immutable record of a governance outcome
//! - `RiskAlert`: portfolio risk alerts raised by the governor
//! - `OrderProposal`, `OrderRecord`: the order gate's input and persisted output

pub mod alert;
pub mod decimal;
pub mod decision;
pub mod error;
pub mod ids;
pub mod intent;
pub mod order;

pub use alert::{AlertKind, AlertSeverity, RiskAlert};
pub use decimal::{Price, Qty};
pub use decision::{GovernanceAction, GovernanceDecision, TradeModification};
pub use error::{CoreError, Result};
pub use ids::{AlertId, DecisionId, IntentId, OrderId};
pub use intent::{OrderSide, OrderType, Symbol, TimeInForce, TradeIntent};
pub use order::{
    BrokerStatus, OrderLimits, OrderProposal, OrderRecord, TradeMode, ValidatorStatus,
};

/// Schema version stamped on every persisted record.
///
/// Bump when a persisted schema changes shape so downstream consumers can
/// branch on it instead of guessing.
pub const SCHEMA_VERSION: u32 = 1;
