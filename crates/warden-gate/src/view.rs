//! Market and account views consumed by the gate.
//!
//! Both come from external collaborators (quote feed, account service);
//! the gate only reads them.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use warden_core::Price;

/// Top-of-book quote for the proposal's symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub bid: Price,
    pub ask: Price,
    pub last: Price,
    /// When the quote was taken.
    pub as_of: DateTime<Utc>,
}

impl MarketQuote {
    pub fn new(bid: Price, ask: Price, last: Price) -> Self {
        Self {
            bid,
            ask,
            last,
            as_of: Utc::now(),
        }
    }

    /// Mid price; falls back to last when one side is missing.
    pub fn mid(&self) -> Price {
        if self.bid.is_positive() && self.ask.is_positive() {
            Price::new((self.bid.inner() + self.ask.inner()) / Decimal::TWO)
        } else {
            self.last
        }
    }

    /// Spread as a percentage of mid.
    pub fn spread_pct(&self) -> Decimal {
        let mid = self.mid();
        if !mid.is_positive() || !self.bid.is_positive() || !self.ask.is_positive() {
            return Decimal::ZERO;
        }
        (self.ask.inner() - self.bid.inner()) / mid.inner() * Decimal::from(100)
    }

    /// Whether the quote is older than `max_age_secs` at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>, max_age_secs: u64) -> bool {
        now - self.as_of > Duration::seconds(max_age_secs as i64)
    }
}

/// Account state for the proposal's workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountView {
    /// Total account equity.
    pub equity: Decimal,
    /// Cash available for new orders.
    pub buying_power: Decimal,
    /// Currently open positions.
    pub open_positions: u32,
    /// Orders already gated today.
    pub trades_today: u32,
    /// Signed day P&L in percent of equity.
    pub day_pnl_pct: Decimal,
    /// When the last realized loss happened, for cooldown.
    pub last_loss_at: Option<DateTime<Utc>>,
}

impl AccountView {
    pub fn new(equity: Decimal, buying_power: Decimal) -> Self {
        Self {
            equity,
            buying_power,
            open_positions: 0,
            trades_today: 0,
            day_pnl_pct: Decimal::ZERO,
            last_loss_at: None,
        }
    }
}
