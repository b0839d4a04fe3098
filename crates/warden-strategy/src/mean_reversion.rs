//! Mean reversion engine: 14-period RSI.
//!
//! Enter long when RSI drops below the oversold threshold, enter short when
//! it rises above the overbought threshold. Exit an open long when RSI
//! recovers above the exit level; exit an open short when it falls below.

use crate::config::MeanReversionConfig;
use crate::decision::Decision;
use crate::engine::StrategyEngine;
use crate::error::{StrategyError, StrategyResult};
use crate::indicators::rsi;
use crate::market::MarketView;
use crate::sizing::position_qty;
use warden_core::OrderSide;

/// RSI mean reversion engine.
pub struct MeanReversionEngine {
    config: MeanReversionConfig,
}

impl MeanReversionEngine {
    pub fn new(config: MeanReversionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MeanReversionConfig {
        &self.config
    }
}

impl StrategyEngine for MeanReversionEngine {
    fn name(&self) -> &str {
        "mean_reversion"
    }

    fn decide(&self, view: &MarketView) -> StrategyResult<Decision> {
        let closes = view.closes();
        if closes.is_empty() {
            return Err(StrategyError::MissingData(format!(
                "no candles for {}",
                view.symbol
            )));
        }

        let series = rsi(&closes, self.config.rsi_period);
        let Some(current) = series.last().copied() else {
            return Ok(Decision::none(format!(
                "insufficient history: {} candles, need {}",
                closes.len(),
                self.config.rsi_period + 1
            )));
        };

        // Exits take priority over fresh entries while a position is open.
        if let Some(pos) = view.position {
            return Ok(match pos.side {
                OrderSide::Buy if current > self.config.exit_level => Decision::exit(
                    OrderSide::Sell,
                    pos.qty,
                    format!("RSI {current:.1} recovered above {}", self.config.exit_level),
                ),
                OrderSide::Sell if current < self.config.exit_level => Decision::exit(
                    OrderSide::Buy,
                    pos.qty,
                    format!("RSI {current:.1} fell below {}", self.config.exit_level),
                ),
                _ => Decision::none(format!("holding through RSI {current:.1}")),
            });
        }

        let last = view.last().expect("candles checked non-empty");
        if current < self.config.oversold {
            let qty = position_qty(view.equity, view.max_notional, last.close);
            if qty.is_zero() {
                return Ok(Decision::none("untradeable price"));
            }
            return Ok(Decision::enter(
                OrderSide::Buy,
                qty,
                format!("RSI {current:.1} oversold (below {})", self.config.oversold),
            ));
        }
        if current > self.config.overbought {
            let qty = position_qty(view.equity, view.max_notional, last.close);
            if qty.is_zero() {
                return Ok(Decision::none("untradeable price"));
            }
            return Ok(Decision::enter(
                OrderSide::Sell,
                qty,
                format!(
                    "RSI {current:.1} overbought (above {})",
                    self.config.overbought
                ),
            ));
        }

        Ok(Decision::none(format!("RSI {current:.1} neutral")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::DecisionAction;
    use crate::market::Candle;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use warden_core::{Price, Qty, Symbol};

    fn view(closes: &[Decimal]) -> MarketView {
        let start = Utc::now() - Duration::minutes(closes.len() as i64);
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                Candle::new(
                    start + Duration::minutes(i as i64),
                    Price::new(*c),
                    Price::new(*c),
                    Price::new(*c),
                    Price::new(*c),
                    dec!(5000),
                )
            })
            .collect();
        MarketView::new(Symbol::new("XOM"), candles, dec!(50000), dec!(5000))
    }

    fn falling() -> Vec<Decimal> {
        (0..20).map(|i| Decimal::from(100 - i)).collect()
    }

    fn rising() -> Vec<Decimal> {
        (0..20).map(|i| Decimal::from(100 + i)).collect()
    }

    fn choppy() -> Vec<Decimal> {
        (0..20)
            .map(|i| if i % 2 == 0 { dec!(100) } else { dec!(101) })
            .collect()
    }

    #[test]
    fn test_oversold_enters_long() {
        let engine = MeanReversionEngine::new(MeanReversionConfig::default());
        let decision = engine.decide(&view(&falling())).unwrap();
        assert_eq!(decision.action, DecisionAction::Enter);
        assert_eq!(decision.side, Some(OrderSide::Buy));
    }

    #[test]
    fn test_overbought_enters_short() {
        let engine = MeanReversionEngine::new(MeanReversionConfig::default());
        let decision = engine.decide(&view(&rising())).unwrap();
        assert_eq!(decision.action, DecisionAction::Enter);
        assert_eq!(decision.side, Some(OrderSide::Sell));
    }

    #[test]
    fn test_neutral_rsi_does_nothing() {
        let engine = MeanReversionEngine::new(MeanReversionConfig::default());
        let decision = engine.decide(&view(&choppy())).unwrap();
        assert_eq!(decision.action, DecisionAction::None);
        assert!(decision.reason.contains("neutral"));
    }

    #[test]
    fn test_recovery_exits_long() {
        let engine = MeanReversionEngine::new(MeanReversionConfig::default());
        let v = view(&rising()).with_position(OrderSide::Buy, Qty::new(dec!(25)));
        let decision = engine.decide(&v).unwrap();
        assert_eq!(decision.action, DecisionAction::Exit);
        assert_eq!(decision.side, Some(OrderSide::Sell));
        assert_eq!(decision.qty, Qty::new(dec!(25)));
    }

    #[test]
    fn test_slide_exits_short() {
        let engine = MeanReversionEngine::new(MeanReversionConfig::default());
        let v = view(&falling()).with_position(OrderSide::Sell, Qty::new(dec!(25)));
        let decision = engine.decide(&v).unwrap();
        assert_eq!(decision.action, DecisionAction::Exit);
        assert_eq!(decision.side, Some(OrderSide::Buy));
    }

    #[test]
    fn test_insufficient_history_is_none() {
        let engine = MeanReversionEngine::new(MeanReversionConfig::default());
        let decision = engine.decide(&view(&falling()[..10])).unwrap();
        assert_eq!(decision.action, DecisionAction::None);
        assert!(decision.reason.contains("insufficient history"));
    }
}
