//! Market view passed to strategy engines.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use warden_core::{OrderSide, Price, Qty, Symbol};

/// A single OHLCV candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub ts: DateTime<Utc>,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Decimal,
}

impl Candle {
    pub fn new(
        ts: DateTime<Utc>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Decimal,
    ) -> Self {
        Self {
            ts,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// An open position in the symbol under evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionState {
    pub side: OrderSide,
    pub qty: Qty,
}

/// Everything an engine needs to decide on one symbol:
/// a rolling candle window plus sizing inputs and the current position.
#[derive(Debug, Clone)]
pub struct MarketView {
    pub symbol: Symbol,
    /// Rolling OHLCV window, oldest first.
    pub candles: Vec<Candle>,
    /// Account equity for position sizing.
    pub equity: Decimal,
    /// Per-trade notional cap for position sizing.
    pub max_notional: Decimal,
    /// Open position in this symbol, if any.
    pub position: Option<PositionState>,
}

impl MarketView {
    pub fn new(symbol: Symbol, candles: Vec<Candle>, equity: Decimal, max_notional: Decimal) -> Self {
        Self {
            symbol,
            candles,
            equity,
            max_notional,
            position: None,
        }
    }

    pub fn with_position(mut self, side: OrderSide, qty: Qty) -> Self {
        self.position = Some(PositionState { side, qty });
        self
    }

    /// Closing prices, oldest first.
    pub fn closes(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.close.inner()).collect()
    }

    /// Most recent candle, if any.
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }
}
