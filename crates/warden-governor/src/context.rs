//! Portfolio context snapshot and its provider.
//!
//! The context is a derived, read-mostly snapshot of the portfolio rebuilt
//! from upstream collaborators before each evaluation or scan. It is owned
//! by the governor actor; nothing else mutates it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use warden_core::Symbol;

use crate::error::GovernorResult;

/// Snapshot of portfolio state used by every evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioContext {
    /// Total portfolio value in dollars.
    pub portfolio_value: Decimal,
    /// Uninvested cash.
    pub available_cash: Decimal,
    /// Signed day change in percent (negative = drawdown).
    pub day_change_pct: Decimal,
    /// Signed week change in percent.
    pub week_change_pct: Decimal,
    /// Sector name -> share of portfolio in percent.
    pub sector_exposures: HashMap<String, Decimal>,
    /// Symbol -> current position notional in dollars.
    pub top_positions: HashMap<Symbol, Decimal>,
    /// Annualized portfolio volatility estimate.
    pub volatility: Decimal,
    /// Concentration metric on a 0-1 scale (1 = everything in one name).
    pub concentration_risk: Decimal,
    /// Number of bots currently trading this portfolio.
    pub active_bots: u32,
    /// When this snapshot was built.
    pub last_updated: DateTime<Utc>,
}

impl PortfolioContext {
    /// Current allocation of a symbol as a percentage of portfolio value.
    pub fn allocation_pct(&self, symbol: &Symbol) -> Decimal {
        if self.portfolio_value.is_zero() {
            return Decimal::ZERO;
        }
        let notional = self
            .top_positions
            .get(symbol)
            .copied()
            .unwrap_or(Decimal::ZERO);
        notional / self.portfolio_value * Decimal::from(100)
    }

    /// What a new exposure of `notional` dollars adds, in percent.
    pub fn exposure_pct(&self, notional: Decimal) -> Decimal {
        if self.portfolio_value.is_zero() {
            return Decimal::ZERO;
        }
        notional / self.portfolio_value * Decimal::from(100)
    }
}

/// Upstream source for portfolio context snapshots.
///
/// Implemented by the portfolio/risk-metric collaborators; the governor
/// wraps every fetch in a bounded timeout and treats timeout or failure as
/// a missing snapshot, which fails closed.
#[cfg_attr(test, mockall::automock)]
pub trait PortfolioProvider: Send + Sync {
    fn fetch_context(&self) -> GovernorResult<PortfolioContext>;
}
