//! The governor actor ("Monarch").
//!
//! A single tokio task owns the risk parameters, the portfolio context
//! snapshot, and the alert book, and processes a serialized mailbox of
//! {evaluate, refresh, scan, ingest, update} messages. Serialization is the
//! concurrency design: two intents arriving together are evaluated one
//! after the other against a context that reflects each other's outcome
//! window, never against the same stale equity figure in parallel.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, trace, warn};

use warden_audit::{AuditEvent, AuditSink};
use warden_core::{
    AlertKind, AlertSeverity, GovernanceAction, GovernanceDecision, RiskAlert, TradeIntent,
};
use warden_telemetry::metrics::{
    CONTEXT_REFRESH_FAILURES_TOTAL, DECISIONS_TOTAL, DECISION_LATENCY_MS, INTERVENTIONS_TOTAL,
    RISK_ALERTS_TOTAL, SCAN_CYCLES_TOTAL,
};

use crate::alerts::{AlertBook, ExternalAlert};
use crate::context::{PortfolioContext, PortfolioProvider};
use crate::error::{GovernorError, GovernorResult};
use crate::evaluator::evaluate_intent;
use crate::params::RiskParameters;

/// Governor construction parameters.
#[derive(Debug, Clone)]
pub struct GovernorConfig {
    /// Governor instance name, stamped on every decision and alert.
    pub name: String,
    /// Continuous scan interval.
    pub scan_interval: Duration,
    /// Bounded timeout for portfolio context fetches.
    pub context_timeout: Duration,
    /// Mailbox depth.
    pub mailbox_capacity: usize,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            name: "monarch".to_string(),
            scan_interval: Duration::from_secs(30),
            context_timeout: Duration::from_secs(2),
            mailbox_capacity: 64,
        }
    }
}

/// What the caller gets back from an evaluation.
#[derive(Debug)]
pub struct EvaluationOutcome {
    /// The persisted decision record.
    pub decision: GovernanceDecision,
    /// The intent to forward downstream: the original on approve, the
    /// derived copy on soft pull, nothing on hard pull.
    pub forwarded: Option<TradeIntent>,
}

/// Point-in-time governor state for operators and tests.
#[derive(Debug, Clone)]
pub struct GovernorState {
    pub is_active: bool,
    pub interventions: u64,
    pub decisions_today: u32,
    pub params: RiskParameters,
    pub context: Option<PortfolioContext>,
    pub active_alerts: usize,
}

/// Messages for the governor actor.
enum GovernorMsg {
    Evaluate {
        intent: TradeIntent,
        reply: oneshot::Sender<GovernorResult<EvaluationOutcome>>,
    },
    RefreshContext,
    Scan,
    IngestAlert(ExternalAlert),
    UpdateParams {
        params: RiskParameters,
        reply: oneshot::Sender<()>,
    },
    SetActive(bool),
    State {
        reply: oneshot::Sender<GovernorState>,
    },
    Shutdown,
}

impl std::fmt::Debug for GovernorMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Evaluate { intent, .. } => f
                .debug_struct("Evaluate")
                .field("intent", &intent.id)
                .finish(),
            Self::RefreshContext => write!(f, "RefreshContext"),
            Self::Scan => write!(f, "Scan"),
            Self::IngestAlert(a) => f.debug_tuple("IngestAlert").field(&a.title).finish(),
            Self::UpdateParams { .. } => write!(f, "UpdateParams"),
            Self::SetActive(v) => f.debug_tuple("SetActive").field(v).finish(),
            Self::State { .. } => write!(f, "State"),
            Self::Shutdown => write!(f, "Shutdown"),
        }
    }
}

// ============================================================================
// GovernorTask
// ============================================================================

/// The actor task. Holds all mutable governor state.
struct GovernorTask {
    rx: mpsc::Receiver<GovernorMsg>,
    config: GovernorConfig,
    params: RiskParameters,
    context: Option<PortfolioContext>,
    provider: Arc<dyn PortfolioProvider>,
    sink: Arc<AuditSink>,
    alert_book: AlertBook,
    interventions: u64,
    /// Decisions made in the current UTC day.
    decisions_today: u32,
    /// UTC day the counter belongs to.
    counter_day: chrono::NaiveDate,
    is_active: bool,
}

impl GovernorTask {
    async fn run(mut self) {
        debug!(governor = %self.config.name, "GovernorTask started");

        while let Some(msg) = self.rx.recv().await {
            match msg {
                GovernorMsg::Shutdown => {
                    debug!(governor = %self.config.name, "GovernorTask shutting down");
                    break;
                }
                GovernorMsg::Evaluate { intent, reply } => {
                    let outcome = self.handle_evaluate(intent).await;
                    let _ = reply.send(outcome);
                }
                GovernorMsg::RefreshContext => {
                    self.refresh_context().await;
                }
                GovernorMsg::Scan => {
                    self.handle_scan().await;
                }
                GovernorMsg::IngestAlert(alert) => {
                    self.handle_ingest(alert);
                }
                GovernorMsg::UpdateParams { mut params, reply } => {
                    params.touch();
                    info!(governor = %self.config.name, "risk parameters updated");
                    self.params = params;
                    let _ = reply.send(());
                }
                GovernorMsg::SetActive(active) => {
                    info!(governor = %self.config.name, active, "governor activity toggled");
                    self.is_active = active;
                }
                GovernorMsg::State { reply } => {
                    let _ = reply.send(GovernorState {
                        is_active: self.is_active,
                        interventions: self.interventions,
                        decisions_today: self.decisions_today,
                        params: self.params.clone(),
                        context: self.context.clone(),
                        active_alerts: self.alert_book.len(),
                    });
                }
            }
        }

        debug!(governor = %self.config.name, "GovernorTask terminated");
    }

    /// Rebuild the portfolio context from the provider, with a bounded
    /// timeout. On any failure the old snapshot is discarded rather than
    /// reused: evaluating against stale equity would silently open the
    /// trade path, so a refresh failure fails closed via the missing-context
    /// check.
    async fn refresh_context(&mut self) {
        let provider = Arc::clone(&self.provider);
        let fetch = tokio::task::spawn_blocking(move || provider.fetch_context());

        self.context = match tokio::time::timeout(self.config.context_timeout, fetch).await {
            Ok(Ok(Ok(ctx))) => Some(ctx),
            Ok(Ok(Err(e))) => {
                warn!(governor = %self.config.name, error = %e, "context fetch failed");
                CONTEXT_REFRESH_FAILURES_TOTAL.inc();
                None
            }
            Ok(Err(join_err)) => {
                warn!(governor = %self.config.name, error = %join_err, "context fetch panicked");
                CONTEXT_REFRESH_FAILURES_TOTAL.inc();
                None
            }
            Err(_) => {
                warn!(
                    governor = %self.config.name,
                    timeout_ms = self.config.context_timeout.as_millis() as u64,
                    "context fetch timed out"
                );
                CONTEXT_REFRESH_FAILURES_TOTAL.inc();
                None
            }
        };
    }

    /// Per-intent evaluation entry point.
    ///
    /// Validation failures are rejected with no side effects. Everything
    /// past validation fails closed: an internal error becomes a synthetic
    /// blocking decision, never an escaped fault.
    async fn handle_evaluate(&mut self, intent: TradeIntent) -> GovernorResult<EvaluationOutcome> {
        intent.validate().map_err(GovernorError::Validation)?;

        let started = Instant::now();
        match self.try_evaluate(&intent, started).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => Ok(self.fail_closed(&intent, &e, started)),
        }
    }

    async fn try_evaluate(
        &mut self,
        intent: &TradeIntent,
        started: Instant,
    ) -> GovernorResult<EvaluationOutcome> {
        self.refresh_context().await;

        let now = Utc::now();
        self.alert_book.sweep_expired(now);

        let evaluation = {
            let matching = self.alert_book.matching(
                &intent.symbol,
                self.params.alert_severity_threshold,
                now,
            );
            evaluate_intent(intent, &self.params, self.context.as_ref(), &matching, now)
        };

        let processing_time_ms = started.elapsed().as_millis() as u64;
        let decision = GovernanceDecision::new(
            intent.id.clone(),
            self.config.name.clone(),
            evaluation.action,
            evaluation.reasoning.clone(),
            evaluation.modifications,
            evaluation.risk_factors,
            evaluation.confidence,
            processing_time_ms,
        );

        // The decision is not final until durably recorded.
        self.sink.record(AuditEvent::GovernanceDecision {
            decision: decision.clone(),
        })?;
        self.note_decision();
        DECISIONS_TOTAL
            .with_label_values(&[&decision.action.to_string()])
            .inc();
        DECISION_LATENCY_MS.observe(processing_time_ms as f64);

        match decision.action {
            GovernanceAction::HardPull => {
                self.note_intervention();
                self.raise_governance_alert(intent, &decision, AlertSeverity::Critical);
                self.sink.record(AuditEvent::TradeBlocked {
                    intent: intent.clone(),
                    decision_id: decision.id.clone(),
                    reason: decision.reasoning.clone(),
                })?;
                info!(
                    governor = %self.config.name,
                    intent = %intent.id,
                    reasoning = %decision.reasoning,
                    "hard pull"
                );
                Ok(EvaluationOutcome {
                    decision,
                    forwarded: None,
                })
            }
            GovernanceAction::SoftPull => {
                self.note_intervention();
                // The derived copy is forwarded as-is; re-evaluating it here
                // would let a clamp trigger further clamps (amplification),
                // so it deliberately skips a second pass.
                let modified = intent
                    .with_modifications(&decision.modifications)
                    .map_err(GovernorError::Validation)?;
                self.raise_governance_alert(intent, &decision, AlertSeverity::Medium);
                self.sink.record(AuditEvent::TradeModified {
                    original: intent.clone(),
                    modified: modified.clone(),
                    decision_id: decision.id.clone(),
                })?;
                info!(
                    governor = %self.config.name,
                    intent = %intent.id,
                    modifications = decision.modifications.len(),
                    "soft pull"
                );
                Ok(EvaluationOutcome {
                    decision,
                    forwarded: Some(modified),
                })
            }
            GovernanceAction::Approve => {
                self.sink.record(AuditEvent::TradeApproved {
                    intent: intent.clone(),
                    decision_id: decision.id.clone(),
                })?;
                trace!(governor = %self.config.name, intent = %intent.id, "approved");
                Ok(EvaluationOutcome {
                    decision,
                    forwarded: Some(intent.clone()),
                })
            }
        }
    }

    /// Convert an internal failure into a synthetic blocking decision.
    fn fail_closed(
        &mut self,
        intent: &TradeIntent,
        error: &GovernorError,
        started: Instant,
    ) -> EvaluationOutcome {
        error!(
            governor = %self.config.name,
            intent = %intent.id,
            error = %error,
            "evaluation failed, failing closed"
        );

        let decision = GovernanceDecision::new(
            intent.id.clone(),
            self.config.name.clone(),
            GovernanceAction::HardPull,
            format!("governor internal error: {error}"),
            Vec::new(),
            vec!["system_error".to_string()],
            1.0,
            started.elapsed().as_millis() as u64,
        );

        // Best effort: the block stands even if the audit path is what broke.
        self.sink.record_observational(AuditEvent::GovernanceDecision {
            decision: decision.clone(),
        });
        self.sink.record_observational(AuditEvent::TradeBlocked {
            intent: intent.clone(),
            decision_id: decision.id.clone(),
            reason: decision.reasoning.clone(),
        });
        self.note_decision();
        self.note_intervention();
        DECISIONS_TOTAL
            .with_label_values(&[&decision.action.to_string()])
            .inc();

        EvaluationOutcome {
            decision,
            forwarded: None,
        }
    }

    fn note_intervention(&mut self) {
        self.interventions += 1;
        INTERVENTIONS_TOTAL
            .with_label_values(&[&self.config.name])
            .inc();
    }

    /// Track decisions per UTC day. The daily limit is advisory at this
    /// layer (the per-order throttle lives in the gate policy); crossing it
    /// is surfaced loudly rather than blocking.
    fn note_decision(&mut self) {
        let today = Utc::now().date_naive();
        if today != self.counter_day {
            self.counter_day = today;
            self.decisions_today = 0;
        }
        self.decisions_today += 1;
        if self.decisions_today > self.params.max_trades_per_day {
            warn!(
                governor = %self.config.name,
                decisions_today = self.decisions_today,
                limit = self.params.max_trades_per_day,
                "daily trade-count limit exceeded"
            );
        }
    }

    fn raise_governance_alert(
        &self,
        intent: &TradeIntent,
        decision: &GovernanceDecision,
        severity: AlertSeverity,
    ) {
        let alert = RiskAlert::new(
            AlertKind::GovernanceBlock,
            severity,
            format!("Trade {}", decision.action),
            decision.reasoning.clone(),
            intent.notional().unwrap_or_default(),
            self.params.max_position_size,
            "review risk parameters if unexpected",
            self.config.name.clone(),
        )
        .for_symbol(intent.symbol.clone());

        RISK_ALERTS_TOTAL
            .with_label_values(&[&alert.kind.to_string(), &alert.severity.to_string()])
            .inc();
        self.sink
            .record_observational(AuditEvent::RiskAlert { alert });
    }

    /// Continuous scan cycle.
    ///
    /// Raises observational alerts for drawdown and concentration breaches.
    /// These do not block trades by themselves; they reach future decisions
    /// only through the refreshed shared context.
    async fn handle_scan(&mut self) {
        if !self.is_active {
            trace!(governor = %self.config.name, "scan skipped, governor inactive");
            return;
        }

        SCAN_CYCLES_TOTAL.inc();
        self.refresh_context().await;
        self.alert_book.sweep_expired(Utc::now());

        let Some(ctx) = self.context.as_ref() else {
            warn!(governor = %self.config.name, "scan has no portfolio context");
            return;
        };

        if ctx.day_change_pct < -self.params.max_daily_drawdown_pct {
            let alert = RiskAlert::new(
                AlertKind::DrawdownBreach,
                AlertSeverity::High,
                "Daily drawdown limit breached",
                format!(
                    "day change {}% beyond -{}% limit",
                    ctx.day_change_pct, self.params.max_daily_drawdown_pct
                ),
                ctx.day_change_pct,
                -self.params.max_daily_drawdown_pct,
                "halt new entries until drawdown recovers",
                self.config.name.clone(),
            );
            RISK_ALERTS_TOTAL
                .with_label_values(&[&alert.kind.to_string(), &alert.severity.to_string()])
                .inc();
            self.sink
                .record_observational(AuditEvent::RiskAlert { alert });
        }

        if ctx.concentration_risk > self.params.max_concentration_risk {
            let alert = RiskAlert::new(
                AlertKind::ConcentrationBreach,
                AlertSeverity::Medium,
                "Portfolio concentration limit breached",
                format!(
                    "concentration {} over {} limit",
                    ctx.concentration_risk, self.params.max_concentration_risk
                ),
                ctx.concentration_risk,
                self.params.max_concentration_risk,
                "rebalance toward a flatter allocation",
                self.config.name.clone(),
            );
            RISK_ALERTS_TOTAL
                .with_label_values(&[&alert.kind.to_string(), &alert.severity.to_string()])
                .inc();
            self.sink
                .record_observational(AuditEvent::RiskAlert { alert });
        }
    }

    fn handle_ingest(&mut self, alert: ExternalAlert) {
        let converted = self.alert_book.ingest(
            alert,
            self.params.alert_severity_threshold,
            &self.config.name,
        );
        if let Some(alert) = converted {
            RISK_ALERTS_TOTAL
                .with_label_values(&[&alert.kind.to_string(), &alert.severity.to_string()])
                .inc();
            // Observational at ingestion time; blocking happens only when a
            // decision consults the book.
            self.sink
                .record_observational(AuditEvent::RiskAlert { alert });
        }
    }
}

// ============================================================================
// GovernorHandle
// ============================================================================

/// Cloneable handle to the governor actor.
#[derive(Clone)]
pub struct GovernorHandle {
    tx: mpsc::Sender<GovernorMsg>,
}

impl GovernorHandle {
    /// Evaluate a trade intent.
    ///
    /// Returns a validation error for malformed intents (no side effects);
    /// every other failure mode resolves to a blocking decision inside the
    /// returned outcome.
    pub async fn evaluate(&self, intent: TradeIntent) -> GovernorResult<EvaluationOutcome> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(GovernorMsg::Evaluate { intent, reply })
            .await
            .map_err(|_| GovernorError::MailboxClosed)?;
        rx.await.map_err(|_| GovernorError::MailboxClosed)?
    }

    /// Replace the risk parameters; takes effect on the next evaluation.
    pub async fn update_params(&self, params: RiskParameters) -> GovernorResult<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(GovernorMsg::UpdateParams { params, reply })
            .await
            .map_err(|_| GovernorError::MailboxClosed)?;
        rx.await.map_err(|_| GovernorError::MailboxClosed)
    }

    /// Ingest an external alert.
    pub async fn ingest_alert(&self, alert: ExternalAlert) -> GovernorResult<()> {
        self.tx
            .send(GovernorMsg::IngestAlert(alert))
            .await
            .map_err(|_| GovernorError::MailboxClosed)
    }

    /// Request an out-of-band context refresh.
    pub async fn refresh_context(&self) -> GovernorResult<()> {
        self.tx
            .send(GovernorMsg::RefreshContext)
            .await
            .map_err(|_| GovernorError::MailboxClosed)
    }

    /// Trigger a scan cycle outside the timer.
    pub async fn scan_now(&self) -> GovernorResult<()> {
        self.tx
            .send(GovernorMsg::Scan)
            .await
            .map_err(|_| GovernorError::MailboxClosed)
    }

    /// Toggle the active flag.
    ///
    /// Deactivation suspends ONLY the continuous scan; per-intent evaluation
    /// keeps gating trades. Governance never silently opens the trade path.
    pub async fn set_active(&self, active: bool) -> GovernorResult<()> {
        self.tx
            .send(GovernorMsg::SetActive(active))
            .await
            .map_err(|_| GovernorError::MailboxClosed)
    }

    /// Read current governor state.
    pub async fn state(&self) -> GovernorResult<GovernorState> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(GovernorMsg::State { reply })
            .await
            .map_err(|_| GovernorError::MailboxClosed)?;
        rx.await.map_err(|_| GovernorError::MailboxClosed)
    }

    /// Graceful shutdown.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(GovernorMsg::Shutdown).await;
    }
}

/// Spawn the governor actor and its scan ticker.
///
/// Returns the handle and the actor's join handle. The ticker task ends on
/// its own once the mailbox closes.
pub fn spawn_governor(
    config: GovernorConfig,
    params: RiskParameters,
    provider: Arc<dyn PortfolioProvider>,
    sink: Arc<AuditSink>,
) -> (GovernorHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(config.mailbox_capacity);

    let scan_tx = tx.clone();
    let scan_interval = config.scan_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(scan_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The immediate first tick would scan before wiring finishes.
        interval.tick().await;
        loop {
            interval.tick().await;
            if scan_tx.send(GovernorMsg::Scan).await.is_err() {
                break;
            }
        }
    });

    let task = GovernorTask {
        rx,
        config,
        params,
        context: None,
        provider,
        sink,
        alert_book: AlertBook::new(),
        interventions: 0,
        decisions_today: 0,
        counter_day: Utc::now().date_naive(),
        is_active: true,
    };

    let join = tokio::spawn(task.run());
    (GovernorHandle { tx }, join)
}
