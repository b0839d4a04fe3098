//! Collaborator implementations for paper mode.
//!
//! A live deployment injects real portfolio and account services; paper
//! mode runs against a fixture snapshot that operators (and tests) can
//! update at runtime.

use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::HashMap;
use warden_governor::{GovernorResult, PortfolioContext, PortfolioProvider};

/// Portfolio provider backed by an in-memory snapshot.
pub struct FixedPortfolioProvider {
    context: RwLock<PortfolioContext>,
}

impl FixedPortfolioProvider {
    pub fn new(portfolio_value: Decimal, available_cash: Decimal) -> Self {
        Self {
            context: RwLock::new(PortfolioContext {
                portfolio_value,
                available_cash,
                day_change_pct: Decimal::ZERO,
                week_change_pct: Decimal::ZERO,
                sector_exposures: HashMap::new(),
                top_positions: HashMap::new(),
                volatility: Decimal::ZERO,
                concentration_risk: Decimal::ZERO,
                active_bots: 1,
                last_updated: Utc::now(),
            }),
        }
    }

    /// Replace the snapshot (e.g. after a simulated fill).
    pub fn set(&self, mut context: PortfolioContext) {
        context.last_updated = Utc::now();
        *self.context.write() = context;
    }

    /// Current snapshot.
    pub fn get(&self) -> PortfolioContext {
        self.context.read().clone()
    }
}

impl PortfolioProvider for FixedPortfolioProvider {
    fn fetch_context(&self) -> GovernorResult<PortfolioContext> {
        let mut ctx = self.context.read().clone();
        ctx.last_updated = Utc::now();
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fetch_returns_current_snapshot() {
        let provider = FixedPortfolioProvider::new(dec!(100000), dec!(50000));
        let ctx = provider.fetch_context().unwrap();
        assert_eq!(ctx.portfolio_value, dec!(100000));

        let mut updated = provider.get();
        updated.day_change_pct = dec!(-6);
        provider.set(updated);
        assert_eq!(provider.fetch_context().unwrap().day_change_pct, dec!(-6));
    }
}
