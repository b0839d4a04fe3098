//! Momentum engine: fast/slow EMA crossover.
//!
//! Enter long when the fast EMA crosses above the slow EMA with the close
//! confirming above the fast line. Crossing detection uses a one-sample lag:
//! previous fast <= previous slow AND current fast > current slow.

use crate::config::MomentumConfig;
use crate::decision::Decision;
use crate::engine::StrategyEngine;
use crate::error::{StrategyError, StrategyResult};
use crate::indicators::ema;
use crate::market::MarketView;
use crate::sizing::position_qty;
use warden_core::OrderSide;

/// EMA crossover momentum engine.
pub struct MomentumEngine {
    config: MomentumConfig,
}

impl MomentumEngine {
    pub fn new(config: MomentumConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MomentumConfig {
        &self.config
    }
}

impl StrategyEngine for MomentumEngine {
    fn name(&self) -> &str {
        "momentum"
    }

    fn decide(&self, view: &MarketView) -> StrategyResult<Decision> {
        let closes = view.closes();
        if closes.is_empty() {
            return Err(StrategyError::MissingData(format!(
                "no candles for {}",
                view.symbol
            )));
        }

        let fast = ema(&closes, self.config.fast_period);
        let slow = ema(&closes, self.config.slow_period);

        // Crossing detection needs a previous sample on both series.
        if fast.len() < 2 || slow.len() < 2 {
            return Ok(Decision::none(format!(
                "insufficient history: {} candles, need {}",
                closes.len(),
                self.config.slow_period + 1
            )));
        }

        let (fast_now, fast_prev) = (fast[fast.len() - 1], fast[fast.len() - 2]);
        let (slow_now, slow_prev) = (slow[slow.len() - 1], slow[slow.len() - 2]);
        let close = *closes.last().expect("closes checked non-empty");

        let crossed_up = fast_prev <= slow_prev && fast_now > slow_now;
        let crossed_down = fast_prev >= slow_prev && fast_now < slow_now;

        if crossed_up && close > fast_now {
            let last = view.last().expect("candles checked non-empty");
            let qty = position_qty(view.equity, view.max_notional, last.close);
            if qty.is_zero() {
                return Ok(Decision::none("untradeable price"));
            }
            return Ok(Decision::enter(
                OrderSide::Buy,
                qty,
                format!(
                    "fast EMA {fast_now:.2} crossed above slow EMA {slow_now:.2} with close {close:.2} confirming"
                ),
            ));
        }

        if crossed_down {
            if let Some(pos) = view.position.filter(|p| p.side == OrderSide::Buy) {
                return Ok(Decision::exit(
                    OrderSide::Sell,
                    pos.qty,
                    format!("fast EMA {fast_now:.2} crossed back below slow EMA {slow_now:.2}"),
                ));
            }
            return Ok(Decision::none("bearish crossover with no open long"));
        }

        Ok(Decision::none("no crossover"))
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

    fn candles_from_closes(closes: &[Decimal]) -> Vec<Candle> {
        let start = Utc::now() - Duration::minutes(closes.len() as i64);
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                Candle::new(
                    start + Duration::minutes(i as i64),
                    Price::new(*c),
                    Price::new(*c + dec!(1)),
                    Price::new(*c - dec!(1)),
                    Price::new(*c),
                    dec!(10000),
                )
            })
            .collect()
    }

    fn view(closes: &[Decimal]) -> MarketView {
        MarketView::new(
            Symbol::new("AAPL"),
            candles_from_closes(closes),
            dec!(100000),
            dec!(10000),
        )
    }

    /// Flat series then a single sharp up-bar. On the flat stretch both EMAs
    /// sit exactly at 100, so the up-bar is the crossing bar: the fast EMA
    /// jumps above the slow EMA and the close leads both.
    fn rally_closes() -> Vec<Decimal> {
        let mut closes: Vec<Decimal> = vec![dec!(100); 25];
        closes.push(dec!(103));
        closes
    }

    #[test]
    fn test_insufficient_history_is_none_not_error() {
        let engine = MomentumEngine::new(MomentumConfig::default());
        let decision = engine.decide(&view(&[dec!(100); 10])).unwrap();
        assert_eq!(decision.action, DecisionAction::None);
        assert!(decision.reason.contains("insufficient history"));
    }

    #[test]
    fn test_empty_window_is_error() {
        let engine = MomentumEngine::new(MomentumConfig::default());
        assert!(engine.decide(&view(&[])).is_err());
    }

    #[test]
    fn test_rally_triggers_entry() {
        let engine = MomentumEngine::new(MomentumConfig::default());
        let decision = engine.decide(&view(&rally_closes())).unwrap();
        assert_eq!(decision.action, DecisionAction::Enter);
        assert_eq!(decision.side, Some(OrderSide::Buy));
        assert!(decision.qty.is_positive());
    }

    #[test]
    fn test_determinism() {
        let engine = MomentumEngine::new(MomentumConfig::default());
        let a = engine.decide(&view(&rally_closes())).unwrap();
        let b = engine.decide(&view(&rally_closes())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_breakdown_exits_open_long() {
        // Rally, then slide. The fast EMA crosses back under the slow EMA
        // at some bar of the decline; at that bar an open long must exit
        // and a flat book must not.
        let engine = MomentumEngine::new(MomentumConfig::default());
        let mut exited = false;

        for n in 1..=12 {
            let mut closes = rally_closes();
            for i in 0..n {
                closes.push(dec!(103) - Decimal::from(4 * (i + 1)));
            }

            let with_long = view(&closes).with_position(OrderSide::Buy, Qty::new(dec!(40)));
            let decision = engine.decide(&with_long).unwrap();
            if decision.action == DecisionAction::Exit {
                exited = true;
                assert_eq!(decision.side, Some(OrderSide::Sell));
                assert_eq!(decision.qty, Qty::new(dec!(40)));

                // Same bar, no position: nothing to exit.
                let flat = engine.decide(&view(&closes)).unwrap();
                assert_eq!(flat.action, DecisionAction::None);
            }
        }

        assert!(exited, "decline never produced a bearish crossover");
    }
}
