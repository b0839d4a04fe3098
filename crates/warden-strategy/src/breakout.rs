//! Breakout engine: rolling high/low channel with volume confirmation.
//!
//! Enter in the breakout direction when the close clears the prior channel
//! bound and current volume runs above the rolling average. Exit when price
//! re-enters the channel, with a buffer on either bound so a marginal wick
//! back inside does not shake the position out.

use crate::config::BreakoutConfig;
use crate::decision::Decision;
use crate::engine::StrategyEngine;
use crate::error::{StrategyError, StrategyResult};
use crate::indicators::{highest, lowest, mean};
use crate::market::{Candle, MarketView};
use crate::sizing::position_qty;
use rust_decimal::Decimal;
use warden_core::OrderSide;

/// Channel breakout engine.
pub struct BreakoutEngine {
    config: BreakoutConfig,
}

impl BreakoutEngine {
    pub fn new(config: BreakoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BreakoutConfig {
        &self.config
    }

    fn buffer_fraction(&self) -> Decimal {
        self.config.reentry_buffer_pct / Decimal::from(100)
    }
}

/// The prior-bar channel the breakout is judged against.
struct Channel {
    high: Decimal,
    low: Decimal,
    avg_volume: Decimal,
}

impl Channel {
    /// Channel over the `period` bars preceding the current one.
    fn over(window: &[Candle]) -> Option<Self> {
        let highs: Vec<Decimal> = window.iter().map(|c| c.high.inner()).collect();
        let lows: Vec<Decimal> = window.iter().map(|c| c.low.inner()).collect();
        let volumes: Vec<Decimal> = window.iter().map(|c| c.volume).collect();
        Some(Self {
            high: highest(&highs)?,
            low: lowest(&lows)?,
            avg_volume: mean(&volumes)?,
        })
    }
}

impl StrategyEngine for BreakoutEngine {
    fn name(&self) -> &str {
        "breakout"
    }

    fn decide(&self, view: &MarketView) -> StrategyResult<Decision> {
        if view.candles.is_empty() {
            return Err(StrategyError::MissingData(format!(
                "no candles for {}",
                view.symbol
            )));
        }

        let period = self.config.channel_period;
        if view.candles.len() < period + 1 {
            return Ok(Decision::none(format!(
                "insufficient history: {} candles, need {}",
                view.candles.len(),
                period + 1
            )));
        }

        let last = view.last().expect("candles checked non-empty");
        let window = &view.candles[view.candles.len() - 1 - period..view.candles.len() - 1];
        let channel = Channel::over(window).expect("window checked non-empty");
        let close = last.close.inner();

        // An open position is managed against the channel, not re-entered.
        if let Some(pos) = view.position {
            let buffer = self.buffer_fraction();
            return Ok(match pos.side {
                OrderSide::Buy if close < channel.high * (Decimal::ONE - buffer) => {
                    Decision::exit(
                        OrderSide::Sell,
                        pos.qty,
                        format!(
                            "close {close:.2} re-entered channel below {:.2}",
                            channel.high
                        ),
                    )
                }
                OrderSide::Sell if close > channel.low * (Decimal::ONE + buffer) => {
                    Decision::exit(
                        OrderSide::Buy,
                        pos.qty,
                        format!(
                            "close {close:.2} re-entered channel above {:.2}",
                            channel.low
                        ),
                    )
                }
                _ => Decision::none("breakout position holding outside channel"),
            });
        }

        let volume_confirmed = last.volume > self.config.volume_multiple * channel.avg_volume;

        if close > channel.high {
            if !volume_confirmed {
                return Ok(Decision::none(format!(
                    "upside breakout without volume confirmation ({} vs {:.0} avg)",
                    last.volume, channel.avg_volume
                )));
            }
            let qty = position_qty(view.equity, view.max_notional, last.close);
            if qty.is_zero() {
                return Ok(Decision::none("untradeable price"));
            }
            return Ok(Decision::enter(
                OrderSide::Buy,
                qty,
                format!(
                    "close {close:.2} broke above {:.2} on {}x volume",
                    channel.high, self.config.volume_multiple
                ),
            ));
        }

        if close < channel.low {
            if !volume_confirmed {
                return Ok(Decision::none(format!(
                    "downside breakout without volume confirmation ({} vs {:.0} avg)",
                    last.volume, channel.avg_volume
                )));
            }
            let qty = position_qty(view.equity, view.max_notional, last.close);
            if qty.is_zero() {
                return Ok(Decision::none("untradeable price"));
            }
            return Ok(Decision::enter(
                OrderSide::Sell,
                qty,
                format!(
                    "close {close:.2} broke below {:.2} on {}x volume",
                    channel.low, self.config.volume_multiple
                ),
            ));
        }

        Ok(Decision::none("inside channel"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::DecisionAction;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;
    use warden_core::{Price, Qty, Symbol};

    /// Flat channel: high 101, low 99, close 100, volume 10k.
    fn flat_candles(n: usize) -> Vec<Candle> {
        let start = Utc::now() - Duration::minutes(n as i64);
        (0..n)
            .map(|i| {
                Candle::new(
                    start + Duration::minutes(i as i64),
                    Price::new(dec!(100)),
                    Price::new(dec!(101)),
                    Price::new(dec!(99)),
                    Price::new(dec!(100)),
                    dec!(10000),
                )
            })
            .collect()
    }

    fn with_final(close: Decimal, volume: Decimal) -> Vec<Candle> {
        let mut candles = flat_candles(25);
        let ts = Utc::now();
        candles.push(Candle::new(
            ts,
            Price::new(dec!(100)),
            Price::new(close.max(dec!(101))),
            Price::new(close.min(dec!(99))),
            Price::new(close),
            volume,
        ));
        candles
    }

    fn view(candles: Vec<Candle>) -> MarketView {
        MarketView::new(Symbol::new("NVDA"), candles, dec!(200000), dec!(20000))
    }

    #[test]
    fn test_upside_breakout_with_volume() {
        let engine = BreakoutEngine::new(BreakoutConfig::default());
        let decision = engine
            .decide(&view(with_final(dec!(105), dec!(20000))))
            .unwrap();
        assert_eq!(decision.action, DecisionAction::Enter);
        assert_eq!(decision.side, Some(OrderSide::Buy));
    }

    #[test]
    fn test_downside_breakout_with_volume() {
        let engine = BreakoutEngine::new(BreakoutConfig::default());
        let decision = engine
            .decide(&view(with_final(dec!(95), dec!(20000))))
            .unwrap();
        assert_eq!(decision.action, DecisionAction::Enter);
        assert_eq!(decision.side, Some(OrderSide::Sell));
    }

    #[test]
    fn test_breakout_without_volume_is_skipped() {
        let engine = BreakoutEngine::new(BreakoutConfig::default());
        let decision = engine
            .decide(&view(with_final(dec!(105), dec!(10000))))
            .unwrap();
        assert_eq!(decision.action, DecisionAction::None);
        assert!(decision.reason.contains("volume"));
    }

    #[test]
    fn test_inside_channel_is_none() {
        let engine = BreakoutEngine::new(BreakoutConfig::default());
        let decision = engine
            .decide(&view(with_final(dec!(100), dec!(20000))))
            .unwrap();
        assert_eq!(decision.action, DecisionAction::None);
    }

    #[test]
    fn test_reentry_exits_long_with_buffer() {
        let engine = BreakoutEngine::new(BreakoutConfig::default());

        // 98 < 101 * 0.98 = 98.98: re-entered with room to spare.
        let v = view(with_final(dec!(98), dec!(10000)))
            .with_position(OrderSide::Buy, Qty::new(dec!(30)));
        let decision = engine.decide(&v).unwrap();
        assert_eq!(decision.action, DecisionAction::Exit);
        assert_eq!(decision.side, Some(OrderSide::Sell));
        assert_eq!(decision.qty, Qty::new(dec!(30)));

        // 100 is inside the raw channel but within the 2% buffer: hold.
        let v = view(with_final(dec!(100), dec!(10000)))
            .with_position(OrderSide::Buy, Qty::new(dec!(30)));
        let decision = engine.decide(&v).unwrap();
        assert_eq!(decision.action, DecisionAction::None);
    }

    #[test]
    fn test_reentry_exits_short_with_buffer() {
        let engine = BreakoutEngine::new(BreakoutConfig::default());

        // 103 > 99 * 1.02 = 100.98: re-entered from below.
        let v = view(with_final(dec!(103), dec!(10000)))
            .with_position(OrderSide::Sell, Qty::new(dec!(30)));
        let decision = engine.decide(&v).unwrap();
        assert_eq!(decision.action, DecisionAction::Exit);
        assert_eq!(decision.side, Some(OrderSide::Buy));
    }

    #[test]
    fn test_insufficient_history_is_none() {
        let engine = BreakoutEngine::new(BreakoutConfig::default());
        let decision = engine.decide(&view(flat_candles(10))).unwrap();
        assert_eq!(decision.action, DecisionAction::None);
        assert!(decision.reason.contains("insufficient history"));
    }
}
