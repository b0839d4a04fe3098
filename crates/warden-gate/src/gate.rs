//! The order gate itself.
//!
//! Checks run in a fixed order and the first failure wins; a blocked
//! proposal creates nothing. A passing proposal becomes an `OrderRecord`
//! persisted through the injected store, and every outcome lands on the
//! audit trail before the caller hears about it.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use warden_audit::{AuditEvent, AuditSink};
use warden_core::{OrderProposal, OrderRecord};
use warden_telemetry::metrics::{GATE_BLOCKED_TOTAL, ORDERS_PLACED_TOTAL};

use crate::error::{GateError, GateResult};
use crate::idempotency::{IdempotencyKey, IdempotencyStore};
use crate::policy::RiskPolicy;
use crate::view::{AccountView, MarketQuote};

/// Fraction of equity a single order may represent, independent of the
/// policy's absolute cap.
const EQUITY_FRACTION: Decimal = Decimal::from_parts(2, 0, 0, false, 2); // 0.02

/// Machine-readable rejection codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    MarketDataStale,
    InsufficientBuyingPower,
    ExceedsMaxNotional,
    StopLossRequired,
    SpreadTooWide,
    MaxPositionsReached,
    TradeLimitReached,
    DailyLossLimit,
    CooldownActive,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Self::MarketDataStale => "market_data_stale",
            Self::InsufficientBuyingPower => "insufficient_buying_power",
            Self::ExceedsMaxNotional => "exceeds_max_notional",
            Self::StopLossRequired => "stop_loss_required",
            Self::SpreadTooWide => "spread_too_wide",
            Self::MaxPositionsReached => "max_positions_reached",
            Self::TradeLimitReached => "trade_limit_reached",
            Self::DailyLossLimit => "daily_loss_limit",
            Self::CooldownActive => "cooldown_active",
        };
        write!(f, "{code}")
    }
}

/// What the gate did with a proposal.
#[derive(Debug)]
pub enum GateOutcome {
    /// Checks passed, the order record exists and was audited.
    Placed(OrderRecord),
    /// Same fingerprint already seen this second; nothing was done.
    Idempotent,
    /// A check failed; nothing was created.
    Blocked(RejectReason),
}

impl GateOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, Self::Placed(_))
    }
}

/// Persistence boundary for order records.
pub trait OrderStore: Send + Sync {
    fn insert(&self, record: &OrderRecord) -> GateResult<()>;
}

/// In-memory store used by paper mode and tests.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    records: RwLock<Vec<OrderRecord>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<OrderRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl OrderStore for InMemoryOrderStore {
    fn insert(&self, record: &OrderRecord) -> GateResult<()> {
        self.records.write().push(record.clone());
        Ok(())
    }
}

/// The order risk gate.
///
/// Safe to call concurrently: proposals with distinct idempotency keys are
/// independent, identical keys serialize on the store's atomic first-insert.
pub struct OrderGate {
    policy: RwLock<RiskPolicy>,
    idempotency: IdempotencyStore,
    store: Arc<dyn OrderStore>,
    sink: Arc<AuditSink>,
}

impl OrderGate {
    pub fn new(policy: RiskPolicy, store: Arc<dyn OrderStore>, sink: Arc<AuditSink>) -> Self {
        Self {
            policy: RwLock::new(policy),
            idempotency: IdempotencyStore::default(),
            store,
            sink,
        }
    }

    /// Replace the policy; takes effect on the next submission.
    pub fn update_policy(&self, mut policy: RiskPolicy) {
        policy.touch();
        info!("gate policy updated");
        *self.policy.write() = policy;
    }

    /// Current policy snapshot.
    pub fn policy(&self) -> RiskPolicy {
        self.policy.read().clone()
    }

    /// Submit a proposal at the current wall clock.
    pub fn submit(
        &self,
        proposal: &OrderProposal,
        quote: Option<&MarketQuote>,
        account: &AccountView,
    ) -> GateResult<GateOutcome> {
        self.submit_at(proposal, quote, account, Utc::now())
    }

    /// Submit a proposal at an explicit `now` (second-resolution idempotency).
    pub fn submit_at(
        &self,
        proposal: &OrderProposal,
        quote: Option<&MarketQuote>,
        account: &AccountView,
        now: DateTime<Utc>,
    ) -> GateResult<GateOutcome> {
        // Malformed proposals are rejected before any side effect.
        proposal.validate().map_err(GateError::Validation)?;

        // The key is recorded before anything else happens: a duplicate
        // racing in behind us within the same second resolves idempotent
        // even if this submission later blocks.
        let key = IdempotencyKey::derive(proposal, now);
        if !self.idempotency.record_first(key, now) {
            debug!(
                workspace = %proposal.workspace_id,
                symbol = %proposal.symbol,
                "duplicate submission suppressed"
            );
            return Ok(GateOutcome::Idempotent);
        }
        self.idempotency.prune(now);

        let policy = self.policy.read().clone();

        if let Some(reason) = first_failure(proposal, quote, account, &policy, now) {
            GATE_BLOCKED_TOTAL
                .with_label_values(&[&reason.to_string()])
                .inc();
            self.sink.record(AuditEvent::OrderBlocked {
                proposal: proposal.clone(),
                reason: reason.to_string(),
            })?;
            warn!(
                workspace = %proposal.workspace_id,
                symbol = %proposal.symbol,
                reason = %reason,
                "order blocked"
            );
            return Ok(GateOutcome::Blocked(reason));
        }

        let record = OrderRecord::placed(proposal);
        match self.store.insert(&record) {
            Ok(()) => {
                ORDERS_PLACED_TOTAL
                    .with_label_values(&[&record.mode.to_string()])
                    .inc();
                self.sink.record(AuditEvent::OrderPlaced {
                    record: record.clone(),
                })?;
                info!(
                    workspace = %record.workspace_id,
                    symbol = %record.symbol,
                    order = %record.id,
                    mode = %record.mode,
                    "order placed"
                );
                Ok(GateOutcome::Placed(record))
            }
            Err(e) => {
                // A pass without a durable record must still leave a trail.
                self.sink.record_observational(AuditEvent::OrderError {
                    proposal: proposal.clone(),
                    record_id: Some(record.id.clone()),
                    error: e.to_string(),
                });
                Err(GateError::Persistence(e.to_string()))
            }
        }
    }
}

/// Ordered policy checks; the first failure wins.
fn first_failure(
    proposal: &OrderProposal,
    quote: Option<&MarketQuote>,
    account: &AccountView,
    policy: &RiskPolicy,
    now: DateTime<Utc>,
) -> Option<RejectReason> {
    // Check 1: market data freshness.
    let quote = match quote {
        Some(q) if !q.is_stale(now, policy.max_quote_age_secs) => q,
        _ => return Some(RejectReason::MarketDataStale),
    };

    let notional = proposal.notional_at(quote.mid());

    // Check 2: buying power.
    if account.buying_power < notional {
        return Some(RejectReason::InsufficientBuyingPower);
    }

    // Check 3: tighter of the absolute cap and 2% of equity.
    let cap = policy
        .max_notional_per_trade
        .min(EQUITY_FRACTION * account.equity);
    if notional > cap {
        return Some(RejectReason::ExceedsMaxNotional);
    }

    // Check 4: protective stop.
    if policy.require_stop_loss && proposal.limits.stop_loss_pct.is_none() {
        return Some(RejectReason::StopLossRequired);
    }

    // Check 5: spread.
    if quote.spread_pct() > policy.max_spread_pct {
        return Some(RejectReason::SpreadTooWide);
    }

    // Workspace throttles, evaluated after the per-order checks.
    if account.open_positions >= policy.max_positions {
        return Some(RejectReason::MaxPositionsReached);
    }
    if account.trades_today >= policy.max_trades_per_day {
        return Some(RejectReason::TradeLimitReached);
    }
    if account.day_pnl_pct < -policy.max_daily_loss_pct {
        return Some(RejectReason::DailyLossLimit);
    }
    if let Some(loss_at) = account.last_loss_at {
        if now - loss_at < Duration::seconds(policy.cooldown_after_loss_secs as i64) {
            return Some(RejectReason::CooldownActive);
        }
    }

    None
}
