//! Strategy engine trait, the multi-symbol runner, and intent conversion.

use crate::decision::{Decision, DecisionAction};
use crate::error::{StrategyError, StrategyResult};
use crate::market::MarketView;
use chrono::{Duration, Utc};
use tracing::{debug, warn};
use warden_core::intent::TradeIntentBuilder;
use warden_core::{Symbol, TradeIntent};

/// How long an emitted intent stays valid before the governor refuses it.
const INTENT_TTL_SECS: i64 = 300;

/// Confidence attached to fresh entries.
const ENTER_CONFIDENCE: f64 = 0.75;

/// Confidence attached to exits (closing risk is the safer direction).
const EXIT_CONFIDENCE: f64 = 0.9;

/// A pure decision function over a market view.
///
/// Implementations must be deterministic: identical candle sequences always
/// yield identical decisions.
pub trait StrategyEngine: Send + Sync {
    /// Stable engine name, used as the intent's strategy tag.
    fn name(&self) -> &str;

    /// Evaluate one symbol.
    ///
    /// Insufficient history returns a no-op decision with a reason; only a
    /// genuinely missing market-data input is an error.
    fn decide(&self, view: &MarketView) -> StrategyResult<Decision>;
}

/// Outcome of one engine pass over a batch of symbols.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Actionable (non-noop) decisions.
    pub decisions: Vec<(Symbol, Decision)>,
    /// Per-symbol failures; the run continued past each one.
    pub failures: Vec<(Symbol, StrategyError)>,
    /// Symbols evaluated without producing an actionable decision.
    pub skipped: usize,
}

/// Run an engine across many symbols.
///
/// A failure on one symbol is recorded and logged but never aborts the
/// remaining symbols.
pub fn run_symbols(engine: &dyn StrategyEngine, views: &[MarketView]) -> RunReport {
    let mut report = RunReport::default();

    for view in views {
        match engine.decide(view) {
            Ok(decision) if decision.is_none() => {
                debug!(
                    strategy = engine.name(),
                    symbol = %view.symbol,
                    reason = %decision.reason,
                    "no action"
                );
                report.skipped += 1;
            }
            Ok(decision) => {
                debug!(
                    strategy = engine.name(),
                    symbol = %view.symbol,
                    action = %decision.action,
                    reason = %decision.reason,
                    "decision"
                );
                report.decisions.push((view.symbol.clone(), decision));
            }
            Err(e) => {
                warn!(
                    strategy = engine.name(),
                    symbol = %view.symbol,
                    error = %e,
                    "symbol evaluation failed, continuing run"
                );
                report.failures.push((view.symbol.clone(), e));
            }
        }
    }

    report
}

/// Convert an actionable decision into a trade intent for governance.
///
/// Returns `None` for no-op decisions and for decisions missing a side or a
/// positive quantity (nothing to govern).
pub fn intent_from_decision(
    bot_id: &str,
    engine_name: &str,
    view: &MarketView,
    decision: &Decision,
) -> Option<TradeIntent> {
    if decision.action == DecisionAction::None {
        return None;
    }
    let side = decision.side?;
    if !decision.qty.is_positive() {
        return None;
    }
    let last = view.last()?;

    let confidence = match decision.action {
        DecisionAction::Enter => ENTER_CONFIDENCE,
        DecisionAction::Exit => EXIT_CONFIDENCE,
        DecisionAction::None => unreachable!("filtered above"),
    };

    Some(
        TradeIntentBuilder::new(bot_id, view.symbol.clone(), side, decision.qty, engine_name)
            .price(last.close)
            .confidence(confidence)
            .reasoning(decision.reason.clone())
            .max_risk(decision.qty.notional(last.close))
            .expires_at(Utc::now() + Duration::seconds(INTENT_TTL_SECS))
            .build(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MomentumConfig;
    use crate::market::Candle;
    use crate::momentum::MomentumEngine;
    use rust_decimal_macros::dec;
    use warden_core::{OrderSide, Price, Qty};

    fn flat_view(symbol: &str, n: usize) -> MarketView {
        let start = Utc::now() - Duration::minutes(n as i64);
        let candles = (0..n)
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
            .collect();
        MarketView::new(Symbol::new(symbol), candles, dec!(100000), dec!(10000))
    }

    #[test]
    fn test_run_isolates_symbol_failures() {
        let engine = MomentumEngine::new(MomentumConfig::default());
        let views = vec![
            flat_view("AAPL", 30),
            flat_view("EMPTY", 0), // errors: no candles at all
            flat_view("MSFT", 30),
        ];

        let report = run_symbols(&engine, &views);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, Symbol::new("EMPTY"));
        // Both healthy symbols were still evaluated.
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn test_intent_from_enter_decision() {
        let view = flat_view("AAPL", 30);
        let decision = Decision::enter(OrderSide::Buy, Qty::new(dec!(20)), "test entry");

        let intent = intent_from_decision("bot-7", "momentum", &view, &decision).unwrap();
        assert_eq!(intent.symbol, Symbol::new("AAPL"));
        assert_eq!(intent.quantity, Qty::new(dec!(20)));
        assert_eq!(intent.strategy_name, "momentum");
        assert_eq!(intent.max_risk, dec!(2000));
        assert!(intent.expires_at.is_some());
        assert!(intent.validate().is_ok());
    }

    #[test]
    fn test_noop_decision_produces_no_intent() {
        let view = flat_view("AAPL", 30);
        let decision = Decision::none("nothing to do");
        assert!(intent_from_decision("bot-7", "momentum", &view, &decision).is_none());
    }

    #[test]
    fn test_exit_has_higher_confidence_than_enter() {
        let view = flat_view("AAPL", 30);
        let enter = Decision::enter(OrderSide::Buy, Qty::ONE, "in");
        let exit = Decision::exit(OrderSide::Sell, Qty::ONE, "out");

        let enter_intent = intent_from_decision("b", "momentum", &view, &enter).unwrap();
        let exit_intent = intent_from_decision("b", "momentum", &view, &exit).unwrap();
        assert!(exit_intent.confidence > enter_intent.confidence);
    }
}
