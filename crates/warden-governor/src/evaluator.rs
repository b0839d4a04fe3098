//! The ordered decision algorithm.
//!
//! A pure function from (intent, parameters, context, matching alerts) to an
//! evaluation. Checks run in a fixed order and can only escalate the action,
//! never downgrade it; every check that fires contributes its tag to the
//! risk factor list regardless of which check set the final action.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use warden_core::{
    AlertSeverity, GovernanceAction, Price, Qty, RiskAlert, TradeIntent, TradeModification,
};

use crate::context::PortfolioContext;
use crate::params::RiskParameters;

/// Assumed unit price when an intent carries no price and no quote is known.
const FALLBACK_UNIT_PRICE: u32 = 100;

/// Result of running the decision algorithm.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub action: GovernanceAction,
    pub reasoning: String,
    pub modifications: Vec<TradeModification>,
    pub risk_factors: Vec<String>,
    pub confidence: f64,
}

/// Run the ordered checks against one intent.
///
/// `matching_alerts` must already be filtered to the intent's symbol and the
/// configured severity threshold; the evaluator only grades their severity.
pub fn evaluate_intent(
    intent: &TradeIntent,
    params: &RiskParameters,
    context: Option<&PortfolioContext>,
    matching_alerts: &[&RiskAlert],
    now: DateTime<Utc>,
) -> Evaluation {
    let mut action = GovernanceAction::Approve;
    let mut reasons: Vec<String> = Vec::new();
    let mut modifications: Vec<TradeModification> = Vec::new();
    let mut risk_factors: Vec<String> = Vec::new();

    let unit_price = intent
        .price
        .unwrap_or_else(|| Price::new(Decimal::from(FALLBACK_UNIT_PRICE)));
    let position_value = intent.quantity.notional(unit_price);

    // Expiry precedes the portfolio checks: a stale intent is never
    // forwarded no matter how healthy the portfolio looks.
    if intent.is_expired(now) {
        action = action.escalate(GovernanceAction::HardPull);
        risk_factors.push("intent_expired".into());
        reasons.push(format!(
            "intent expired at {}",
            intent.expires_at.expect("expired implies expires_at")
        ));
    }

    // Check 1: a missing snapshot blocks outright.
    if context.is_none() {
        action = action.escalate(GovernanceAction::HardPull);
        risk_factors.push("missing_portfolio_context".into());
        reasons.push("portfolio context unavailable".into());
    }

    if let Some(ctx) = context {
        // Check 2: daily drawdown breach blocks regardless of other factors.
        if ctx.day_change_pct < -params.max_daily_drawdown_pct {
            action = action.escalate(GovernanceAction::HardPull);
            risk_factors.push("daily_drawdown_breach".into());
            reasons.push(format!(
                "daily drawdown {}% beyond -{}% limit",
                ctx.day_change_pct, params.max_daily_drawdown_pct
            ));
        }

        // Check 3: position size cap clamps the quantity.
        if position_value > params.max_position_size {
            let clamped = Qty::new((params.max_position_size / unit_price.inner()).floor());
            if clamped.is_positive() {
                action = action.escalate(GovernanceAction::SoftPull);
                risk_factors.push("position_size_breach".into());
                reasons.push(format!(
                    "position value {position_value} over {} cap, quantity {} -> {}",
                    params.max_position_size, intent.quantity, clamped
                ));
                modifications.push(TradeModification {
                    field: "quantity".into(),
                    original_value: intent.quantity.to_string(),
                    new_value: clamped.to_string(),
                    reason: format!(
                        "clamp position value to max_position_size {}",
                        params.max_position_size
                    ),
                });
            } else {
                // One share already busts the cap; nothing left to clamp to.
                action = action.escalate(GovernanceAction::HardPull);
                risk_factors.push("position_size_breach".into());
                reasons.push(format!(
                    "unit price {unit_price} exceeds position cap {}",
                    params.max_position_size
                ));
            }
        }

        // Check 4: single-symbol exposure.
        let combined_pct = ctx.allocation_pct(&intent.symbol) + ctx.exposure_pct(position_value);
        if combined_pct > params.max_single_stock_exposure_pct {
            action = action.escalate(GovernanceAction::SoftPull);
            risk_factors.push("exposure_concentration".into());
            reasons.push(format!(
                "{} allocation would reach {:.1}% over {}% limit",
                intent.symbol, combined_pct, params.max_single_stock_exposure_pct
            ));
        }

        // Check 5: portfolio-wide concentration metric.
        if ctx.concentration_risk > params.max_concentration_risk {
            action = action.escalate(GovernanceAction::SoftPull);
            risk_factors.push("portfolio_concentration".into());
            reasons.push(format!(
                "portfolio concentration {} over {} limit",
                ctx.concentration_risk, params.max_concentration_risk
            ));
        }
    }

    // Check 6: external alerts; critical blocks, anything else modifies.
    if !matching_alerts.is_empty() {
        let worst = matching_alerts
            .iter()
            .map(|a| a.severity)
            .max()
            .expect("non-empty alerts");
        let escalation = if worst >= AlertSeverity::Critical {
            GovernanceAction::HardPull
        } else {
            GovernanceAction::SoftPull
        };
        action = action.escalate(escalation);
        risk_factors.push("external_alert".into());
        let titles: Vec<&str> = matching_alerts.iter().map(|a| a.title.as_str()).collect();
        reasons.push(format!(
            "{} active {worst} alert(s) for {}: {}",
            matching_alerts.len(),
            intent.symbol,
            titles.join(", ")
        ));
    }

    // Check 7: penny stock floor, only when a real price is known.
    if let Some(price) = intent.price {
        if price.is_positive() && price.inner() < params.min_stock_price {
            action = action.escalate(GovernanceAction::HardPull);
            risk_factors.push("penny_stock".into());
            reasons.push(format!(
                "price {price} below {} minimum",
                params.min_stock_price
            ));
        }
    }

    let confidence = (0.7 + 0.1 * risk_factors.len() as f64).min(1.0);
    let reasoning = if reasons.is_empty() {
        "all risk checks passed".to_string()
    } else {
        reasons.join("; ")
    };

    Evaluation {
        action,
        reasoning,
        modifications,
        risk_factors,
        confidence,
    }
}
