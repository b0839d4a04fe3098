//! Trade intents and order enums.
//!
//! A [`TradeIntent`] is a proposed order generated by a strategy, prior to
//! risk governance. Intents are immutable: a governance modification
//! produces a derived copy via [`TradeIntent::with_modifications`], never an
//! in-place mutation.

use crate::decimal::{Price, Qty};
use crate::decision::TradeModification;
use crate::error::{CoreError, Result};
use crate::ids::IntentId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Returns 1 for buy, -1 for sell (for exposure calculations).
    pub fn sign(&self) -> i8 {
        match self {
            Self::Buy => 1,
            Self::Sell => -1,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Market order.
    #[default]
    Market,
    /// Limit order.
    Limit,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "market"),
            Self::Limit => write!(f, "limit"),
        }
    }
}

/// Time-in-force for orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    /// Valid for the trading day.
    #[default]
    Day,
    /// Good-til-cancelled.
    Gtc,
    /// Immediate-or-cancel.
    Ioc,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Gtc => write!(f, "gtc"),
            Self::Ioc => write!(f, "ioc"),
        }
    }
}

/// Uppercase ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol, normalizing to uppercase.
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A proposed order generated by a strategy, prior to risk governance.
///
/// Created once per strategy evaluation tick and consumed exactly once by
/// the governor. Never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeIntent {
    /// Unique intent ID.
    pub id: IntentId,
    /// Owning bot/strategy-run identifier.
    pub bot_id: String,
    /// Target symbol.
    pub symbol: Symbol,
    /// Trade side.
    pub side: OrderSide,
    /// Proposed quantity (shares).
    pub quantity: Qty,
    /// Proposed price. None for market orders priced at execution.
    pub price: Option<Price>,
    /// Order type.
    pub order_type: OrderType,
    /// Time-in-force.
    pub time_in_force: TimeInForce,
    /// Name of the strategy that produced this intent.
    pub strategy_name: String,
    /// Strategy confidence in [0, 1].
    pub confidence: f64,
    /// Human-readable explanation of why the strategy wants this trade.
    pub reasoning: String,
    /// Stop-loss price, if the strategy set one.
    pub stop_loss: Option<Price>,
    /// Take-profit price, if the strategy set one.
    pub take_profit: Option<Price>,
    /// Maximum dollar risk the strategy is willing to take on this trade.
    pub max_risk: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Optional expiry; an expired intent must not be forwarded to execution.
    pub expires_at: Option<DateTime<Utc>>,
}

impl TradeIntent {
    /// Dollar exposure of this intent, if the price is known.
    pub fn notional(&self) -> Option<Decimal> {
        self.price.map(|p| self.quantity.notional(p))
    }

    /// Whether the intent has expired as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| now >= exp).unwrap_or(false)
    }

    /// Validate required fields. Rejected intents produce no side effects.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.is_empty() {
            return Err(CoreError::InvalidIntent("empty symbol".into()));
        }
        if !self.quantity.is_positive() {
            return Err(CoreError::InvalidIntent(format!(
                "non-positive quantity: {}",
                self.quantity
            )));
        }
        if let Some(price) = self.price {
            if !price.is_positive() {
                return Err(CoreError::InvalidIntent(format!(
                    "non-positive price: {price}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(CoreError::InvalidIntent(format!(
                "confidence out of range: {}",
                self.confidence
            )));
        }
        if self.max_risk.is_sign_negative() {
            return Err(CoreError::InvalidIntent(format!(
                "negative max_risk: {}",
                self.max_risk
            )));
        }
        Ok(())
    }

    /// Produce a derived copy with the given modifications applied in order.
    ///
    /// The copy keeps the original intent ID: it is the same logical intent,
    /// adjusted by governance. Unknown fields are rejected so a typo in a
    /// modification can never be silently dropped.
    pub fn with_modifications(&self, modifications: &[TradeModification]) -> Result<Self> {
        let mut derived = self.clone();
        for m in modifications {
            match m.field.as_str() {
                "quantity" => {
                    derived.quantity = m
                        .new_value
                        .parse::<Qty>()
                        .map_err(|e| CoreError::InvalidModification(e.to_string()))?;
                }
                "price" => {
                    derived.price = Some(
                        m.new_value
                            .parse::<Price>()
                            .map_err(|e| CoreError::InvalidModification(e.to_string()))?,
                    );
                }
                "stop_loss" => {
                    derived.stop_loss = Some(
                        m.new_value
                            .parse::<Price>()
                            .map_err(|e| CoreError::InvalidModification(e.to_string()))?,
                    );
                }
                "take_profit" => {
                    derived.take_profit = Some(
                        m.new_value
                            .parse::<Price>()
                            .map_err(|e| CoreError::InvalidModification(e.to_string()))?,
                    );
                }
                other => {
                    return Err(CoreError::InvalidModification(format!(
                        "unknown field: {other}"
                    )));
                }
            }
        }
        Ok(derived)
    }
}

/// Builder-style constructor used by the strategy engines.
#[derive(Debug, Clone)]
pub struct TradeIntentBuilder {
    bot_id: String,
    symbol: Symbol,
    side: OrderSide,
    quantity: Qty,
    price: Option<Price>,
    order_type: OrderType,
    time_in_force: TimeInForce,
    strategy_name: String,
    confidence: f64,
    reasoning: String,
    stop_loss: Option<Price>,
    take_profit: Option<Price>,
    max_risk: Decimal,
    expires_at: Option<DateTime<Utc>>,
}

impl TradeIntentBuilder {
    pub fn new(
        bot_id: impl Into<String>,
        symbol: Symbol,
        side: OrderSide,
        quantity: Qty,
        strategy_name: impl Into<String>,
    ) -> Self {
        Self {
            bot_id: bot_id.into(),
            symbol,
            side,
            quantity,
            price: None,
            order_type: OrderType::Market,
            time_in_force: TimeInForce::Day,
            strategy_name: strategy_name.into(),
            confidence: 0.5,
            reasoning: String::new(),
            stop_loss: None,
            take_profit: None,
            max_risk: Decimal::ZERO,
            expires_at: None,
        }
    }

    pub fn price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self.order_type = OrderType::Limit;
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn stop_loss(mut self, price: Price) -> Self {
        self.stop_loss = Some(price);
        self
    }

    pub fn take_profit(mut self, price: Price) -> Self {
        self.take_profit = Some(price);
        self
    }

    pub fn max_risk(mut self, max_risk: Decimal) -> Self {
        self.max_risk = max_risk;
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn build(self) -> TradeIntent {
        TradeIntent {
            id: IntentId::new(),
            bot_id: self.bot_id,
            symbol: self.symbol,
            side: self.side,
            quantity: self.quantity,
            price: self.price,
            order_type: self.order_type,
            time_in_force: self.time_in_force,
            strategy_name: self.strategy_name,
            confidence: self.confidence,
            reasoning: self.reasoning,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            max_risk: self.max_risk,
            created_at: Utc::now(),
            expires_at: self.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_intent() -> TradeIntent {
        TradeIntentBuilder::new("bot-1", Symbol::new("aapl"), OrderSide::Buy, Qty::new(dec!(100)), "momentum")
            .price(Price::new(dec!(150)))
            .confidence(0.8)
            .reasoning("fast EMA crossed above slow")
            .build()
    }

    #[test]
    fn test_symbol_normalized() {
        assert_eq!(Symbol::new(" aapl ").as_str(), "AAPL");
    }

    #[test]
    fn test_notional() {
        assert_eq!(sample_intent().notional(), Some(dec!(15000)));
    }

    #[test]
    fn test_validate_rejects_bad_confidence() {
        let mut intent = sample_intent();
        intent.confidence = 1.5;
        assert!(intent.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let mut intent = sample_intent();
        intent.quantity = Qty::ZERO;
        assert!(intent.validate().is_err());
    }

    #[test]
    fn test_expiry() {
        let mut intent = sample_intent();
        assert!(!intent.is_expired(Utc::now()));
        intent.expires_at = Some(Utc::now() - chrono::Duration::seconds(1));
        assert!(intent.is_expired(Utc::now()));
    }

    #[test]
    fn test_with_modifications_quantity() {
        let intent = sample_intent();
        let m = TradeModification {
            field: "quantity".into(),
            original_value: "100".into(),
            new_value: "50".into(),
            reason: "position size cap".into(),
        };
        let derived = intent.with_modifications(&[m]).unwrap();
        assert_eq!(derived.quantity, Qty::new(dec!(50)));
        // Same logical intent, untouched original.
        assert_eq!(derived.id, intent.id);
        assert_eq!(intent.quantity, Qty::new(dec!(100)));
    }

    #[test]
    fn test_with_modifications_unknown_field() {
        let intent = sample_intent();
        let m = TradeModification {
            field: "leverage".into(),
            original_value: "1".into(),
            new_value: "2".into(),
            reason: "oops".into(),
        };
        assert!(intent.with_modifications(&[m]).is_err());
    }
}
