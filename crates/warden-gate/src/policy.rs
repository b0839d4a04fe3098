//! Workspace-scoped gate policy.
//!
//! Independent of the governor's `RiskParameters`: the gate is a separate
//! defense layer with its own, typically tighter, per-order thresholds.
//! Defaults apply when a workspace has no explicit policy.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-workspace order gate thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPolicy {
    /// Hard dollar cap per trade. Default: 10,000.
    #[serde(default = "default_max_notional_per_trade")]
    pub max_notional_per_trade: Decimal,
    /// Maximum concurrently open positions. Default: 10.
    #[serde(default = "default_max_positions")]
    pub max_positions: u32,
    /// Maximum gated trades per UTC day. Default: 50.
    #[serde(default = "default_max_trades_per_day")]
    pub max_trades_per_day: u32,
    /// Daily loss limit in percent of equity. Default: 3.
    #[serde(default = "default_max_daily_loss_pct")]
    pub max_daily_loss_pct: Decimal,
    /// Cooldown after a realized loss before new orders. Default: 300 s.
    #[serde(default = "default_cooldown_after_loss_secs")]
    pub cooldown_after_loss_secs: u64,
    /// Whether orders must carry a stop loss. Default: false.
    #[serde(default)]
    pub require_stop_loss: bool,
    /// Maximum tolerated quote spread in percent. Default: 1.
    #[serde(default = "default_max_spread_pct")]
    pub max_spread_pct: Decimal,
    /// Maximum quote age before market data counts as stale. Default: 10 s.
    #[serde(default = "default_max_quote_age_secs")]
    pub max_quote_age_secs: u64,
    /// Timestamp of the last update.
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

fn default_max_notional_per_trade() -> Decimal {
    Decimal::from(10_000)
}

fn default_max_positions() -> u32 {
    10
}

fn default_max_trades_per_day() -> u32 {
    50
}

fn default_max_daily_loss_pct() -> Decimal {
    Decimal::from(3)
}

fn default_cooldown_after_loss_secs() -> u64 {
    300
}

fn default_max_spread_pct() -> Decimal {
    Decimal::ONE
}

fn default_max_quote_age_secs() -> u64 {
    10
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            max_notional_per_trade: default_max_notional_per_trade(),
            max_positions: default_max_positions(),
            max_trades_per_day: default_max_trades_per_day(),
            max_daily_loss_pct: default_max_daily_loss_pct(),
            cooldown_after_loss_secs: default_cooldown_after_loss_secs(),
            require_stop_loss: false,
            max_spread_pct: default_max_spread_pct(),
            max_quote_age_secs: default_max_quote_age_secs(),
            last_updated: Utc::now(),
        }
    }
}

impl RiskPolicy {
    /// Stamp the policy as updated now.
    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let policy = RiskPolicy::default();
        assert_eq!(policy.max_notional_per_trade, dec!(10000));
        assert!(!policy.require_stop_loss);
    }

    #[test]
    fn test_absent_fields_use_defaults() {
        let policy: RiskPolicy = toml::from_str("require_stop_loss = true").unwrap();
        assert!(policy.require_stop_loss);
        assert_eq!(policy.max_spread_pct, dec!(1));
    }
}
