//! Application wiring and the intent-to-order pipeline.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use warden_audit::{AuditLog, AuditSink, EventBus};
use warden_core::{GovernanceDecision, OrderLimits, OrderProposal, OrderRecord, TradeIntent};
use warden_gate::{AccountView, GateOutcome, MarketQuote, OrderGate, OrderStore, RejectReason};
use warden_governor::{spawn_governor, GovernorHandle, PortfolioProvider};
use warden_strategy::{
    intent_from_decision, run_symbols, BreakoutEngine, MarketView, MeanReversionEngine,
    MomentumEngine, StrategyEngine,
};

use crate::config::AppConfig;
use crate::error::AppResult;

/// End-to-end outcome of pushing one intent through governance and the gate.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// The governor hard-pulled; nothing reached the gate.
    GovernorBlocked { decision: GovernanceDecision },
    /// Approved (possibly modified) and placed.
    Placed {
        decision: GovernanceDecision,
        record: OrderRecord,
    },
    /// Passed governance but failed the independent gate check.
    GateBlocked {
        decision: GovernanceDecision,
        reason: RejectReason,
    },
    /// Duplicate submission suppressed at the gate.
    Idempotent { decision: GovernanceDecision },
}

/// The wired application.
pub struct Application {
    config: AppConfig,
    engines: Vec<Box<dyn StrategyEngine>>,
    governor: GovernorHandle,
    governor_join: JoinHandle<()>,
    gate: Arc<OrderGate>,
    sink: Arc<AuditSink>,
}

impl Application {
    /// Construct and start the pipeline. Must run inside a tokio runtime.
    pub fn start(
        config: AppConfig,
        provider: Arc<dyn PortfolioProvider>,
        store: Arc<dyn OrderStore>,
    ) -> AppResult<Self> {
        let sink = Arc::new(AuditSink::new(
            AuditLog::new(&config.audit.dir, config.audit.buffer),
            EventBus::new(),
        ));

        let (governor, governor_join) = spawn_governor(
            config.governor.governor_config(),
            config.governor.params.clone(),
            provider,
            Arc::clone(&sink),
        );

        let gate = Arc::new(OrderGate::new(
            config.policy.clone(),
            store,
            Arc::clone(&sink),
        ));

        let engines: Vec<Box<dyn StrategyEngine>> = vec![
            Box::new(MomentumEngine::new(config.strategies.momentum.clone())),
            Box::new(MeanReversionEngine::new(
                config.strategies.mean_reversion.clone(),
            )),
            Box::new(BreakoutEngine::new(config.strategies.breakout.clone())),
        ];

        info!(
            workspace = %config.workspace_id,
            mode = %config.mode,
            engines = engines.len(),
            "application started"
        );

        Ok(Self {
            config,
            engines,
            governor,
            governor_join,
            gate,
            sink,
        })
    }

    /// Handle to the governor actor.
    pub fn governor(&self) -> &GovernorHandle {
        &self.governor
    }

    /// Handle to the order gate.
    pub fn gate(&self) -> &OrderGate {
        &self.gate
    }

    /// Audit sink, for subscribing to pipeline events.
    pub fn sink(&self) -> &Arc<AuditSink> {
        &self.sink
    }

    /// Evaluate every engine over the given market views and collect the
    /// resulting trade intents. Per-symbol failures never abort the sweep.
    pub fn evaluate_strategies(&self, views: &[MarketView]) -> Vec<TradeIntent> {
        let mut intents = Vec::new();
        for engine in &self.engines {
            let report = run_symbols(engine.as_ref(), views);
            for (symbol, decision) in &report.decisions {
                let view = views
                    .iter()
                    .find(|v| &v.symbol == symbol)
                    .expect("decision symbol came from views");
                if let Some(intent) = intent_from_decision(
                    &self.config.strategies.bot_id,
                    engine.name(),
                    view,
                    decision,
                ) {
                    intents.push(intent);
                }
            }
        }
        intents
    }

    /// Push one intent through governance and, if it survives, the gate.
    pub async fn process_intent(
        &self,
        intent: TradeIntent,
        quote: Option<&MarketQuote>,
        account: &AccountView,
    ) -> AppResult<PipelineOutcome> {
        let outcome = self.governor.evaluate(intent).await?;
        let decision = outcome.decision;

        let Some(forwarded) = outcome.forwarded else {
            return Ok(PipelineOutcome::GovernorBlocked { decision });
        };

        let proposal = self.proposal_from_intent(&forwarded);
        match self.gate.submit(&proposal, quote, account)? {
            GateOutcome::Placed(record) => Ok(PipelineOutcome::Placed { decision, record }),
            GateOutcome::Blocked(reason) => {
                warn!(
                    intent = %decision.trade_intent_id,
                    reason = %reason,
                    "intent survived governance but failed the gate"
                );
                Ok(PipelineOutcome::GateBlocked { decision, reason })
            }
            GateOutcome::Idempotent => Ok(PipelineOutcome::Idempotent { decision }),
        }
    }

    /// Map a governed intent onto an order proposal for the gate.
    fn proposal_from_intent(&self, intent: &TradeIntent) -> OrderProposal {
        let limits = OrderLimits {
            stop_loss_pct: pct_distance(intent.price, intent.stop_loss),
            take_profit_pct: pct_distance(intent.price, intent.take_profit),
        };
        OrderProposal {
            workspace_id: self.config.workspace_id.clone(),
            run_id: Some(intent.bot_id.clone()),
            symbol: intent.symbol.clone(),
            side: intent.side,
            qty: intent.quantity,
            price: intent.price,
            notional: None,
            limits,
            mode: self.config.mode,
        }
    }

    /// Run until interrupted, then shut down the governor.
    pub async fn run(self) -> AppResult<()> {
        info!("pipeline running; press ctrl-c to stop");
        tokio::signal::ctrl_c().await?;
        info!("shutdown requested");
        self.shutdown().await;
        Ok(())
    }

    /// Graceful shutdown.
    pub async fn shutdown(self) {
        self.governor.shutdown().await;
        if let Err(e) = self.governor_join.await {
            warn!(error = %e, "governor task ended abnormally");
        }
    }
}

/// Absolute percent distance between an entry price and a protective level.
fn pct_distance(
    price: Option<warden_core::Price>,
    level: Option<warden_core::Price>,
) -> Option<rust_decimal::Decimal> {
    let price = price?;
    let level = level?;
    if !price.is_positive() {
        return None;
    }
    Some(
        ((price.inner() - level.inner()) / price.inner() * rust_decimal::Decimal::from(100)).abs(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::FixedPortfolioProvider;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;
    use warden_core::intent::TradeIntentBuilder;
    use warden_core::{GovernanceAction, OrderSide, Price, Qty, Symbol};
    use warden_gate::InMemoryOrderStore;

    fn test_config(dir: &TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.audit.dir = dir.path().to_string_lossy().into_owned();
        // Keep the scan ticker quiet during tests.
        config.governor.scan_interval_secs = 3600;
        config
    }

    fn start_app(
        dir: &TempDir,
        provider: Arc<FixedPortfolioProvider>,
    ) -> (Application, Arc<InMemoryOrderStore>) {
        let store = Arc::new(InMemoryOrderStore::new());
        let app = Application::start(test_config(dir), provider, store.clone()).unwrap();
        (app, store)
    }

    fn intent(qty: i64, price: i64) -> TradeIntent {
        TradeIntentBuilder::new(
            "bot-1",
            Symbol::new("AAPL"),
            OrderSide::Buy,
            Qty::new(Decimal::from(qty)),
            "momentum",
        )
        .price(Price::new(Decimal::from(price)))
        .confidence(0.8)
        .build()
    }

    fn quote(price: i64) -> MarketQuote {
        let p = Decimal::from(price);
        MarketQuote::new(
            Price::new(p - dec!(0.05)),
            Price::new(p + dec!(0.05)),
            Price::new(p),
        )
    }

    fn account() -> AccountView {
        AccountView::new(dec!(100000), dec!(50000))
    }

    #[tokio::test]
    async fn test_clean_intent_flows_to_placed_order() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(FixedPortfolioProvider::new(dec!(100000), dec!(50000)));
        let (app, store) = start_app(&dir, provider);

        let outcome = app
            .process_intent(intent(10, 100), Some(&quote(100)), &account())
            .await
            .unwrap();

        let PipelineOutcome::Placed { decision, record } = outcome else {
            panic!("expected placed, got {outcome:?}");
        };
        assert_eq!(decision.action, GovernanceAction::Approve);
        assert_eq!(record.symbol, Symbol::new("AAPL"));
        assert_eq!(store.len(), 1);

        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_drawdown_blocks_before_gate() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(FixedPortfolioProvider::new(dec!(100000), dec!(50000)));
        let mut ctx = provider.get();
        ctx.day_change_pct = dec!(-6);
        provider.set(ctx);
        let (app, store) = start_app(&dir, provider);

        let outcome = app
            .process_intent(intent(10, 100), Some(&quote(100)), &account())
            .await
            .unwrap();

        let PipelineOutcome::GovernorBlocked { decision } = outcome else {
            panic!("expected governor block, got {outcome:?}");
        };
        assert_eq!(decision.action, GovernanceAction::HardPull);
        assert!(store.is_empty());

        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_clamped_intent_still_faces_the_gate() {
        // 600 @ $100 is soft-pulled to 500 shares ($50k) by the governor,
        // then independently rejected by the gate's tighter per-order cap.
        // Defense in depth: surviving governance is not a free pass.
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(FixedPortfolioProvider::new(dec!(100000), dec!(50000)));
        let (app, store) = start_app(&dir, provider);

        let outcome = app
            .process_intent(intent(600, 100), Some(&quote(100)), &account())
            .await
            .unwrap();

        let PipelineOutcome::GateBlocked { decision, reason } = outcome else {
            panic!("expected gate block, got {outcome:?}");
        };
        assert_eq!(decision.action, GovernanceAction::SoftPull);
        assert_eq!(reason, RejectReason::ExceedsMaxNotional);
        assert!(store.is_empty());

        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_strategy_sweep_produces_governable_intents() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(FixedPortfolioProvider::new(dec!(100000), dec!(50000)));
        let (app, _store) = start_app(&dir, provider);

        // Falling closes push RSI oversold: mean reversion wants in.
        let closes: Vec<Decimal> = (0..20).map(|i| Decimal::from(100 - i)).collect();
        let start = chrono::Utc::now() - chrono::Duration::minutes(closes.len() as i64);
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                warden_strategy::Candle::new(
                    start + chrono::Duration::minutes(i as i64),
                    Price::new(*c),
                    Price::new(*c),
                    Price::new(*c),
                    Price::new(*c),
                    dec!(10000),
                )
            })
            .collect();
        let views = vec![MarketView::new(
            Symbol::new("XOM"),
            candles,
            dec!(100000),
            dec!(10000),
        )];

        let intents = app.evaluate_strategies(&views);
        assert!(!intents.is_empty());
        for i in &intents {
            assert!(i.validate().is_ok());
            assert_eq!(i.bot_id, "warden-bot");
        }

        app.shutdown().await;
    }

    #[test]
    fn test_pct_distance() {
        let price = Some(Price::new(dec!(100)));
        let stop = Some(Price::new(dec!(95)));
        assert_eq!(pct_distance(price, stop), Some(dec!(5)));
        assert_eq!(pct_distance(price, None), None);
        assert_eq!(pct_distance(None, stop), None);
    }
}
