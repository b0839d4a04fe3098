//! Portfolio-wide risk parameters.
//!
//! Owned by the governor and mutated only through an explicit update
//! operation. Every evaluation reads the parameters current at that moment;
//! updates take effect on the next evaluation without a restart.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use warden_core::AlertSeverity;

/// Versioned bag of portfolio-wide thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskParameters {
    /// Maximum dollar value of a single position. Default: 50,000.
    #[serde(default = "default_max_position_size")]
    pub max_position_size: Decimal,
    /// Maximum tolerated daily drawdown in percent. Default: 5.
    #[serde(default = "default_max_daily_drawdown_pct")]
    pub max_daily_drawdown_pct: Decimal,
    /// Maximum single-symbol share of the portfolio in percent. Default: 20.
    #[serde(default = "default_max_single_stock_exposure_pct")]
    pub max_single_stock_exposure_pct: Decimal,
    /// Maximum portfolio concentration metric (0-1 scale). Default: 0.6.
    #[serde(default = "default_max_concentration_risk")]
    pub max_concentration_risk: Decimal,
    /// Maximum governed trades per UTC day. Default: 200.
    #[serde(default = "default_max_trades_per_day")]
    pub max_trades_per_day: u32,
    /// Minimum tradeable stock price; anything below is treated as a penny
    /// stock and blocked. Default: 5.
    #[serde(default = "default_min_stock_price")]
    pub min_stock_price: Decimal,
    /// Minimum severity at which external alerts influence decisions.
    /// Default: high.
    #[serde(default = "default_alert_severity_threshold")]
    pub alert_severity_threshold: AlertSeverity,
    /// Timestamp of the last update.
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

fn default_max_position_size() -> Decimal {
    Decimal::from(50_000)
}

fn default_max_daily_drawdown_pct() -> Decimal {
    Decimal::from(5)
}

fn default_max_single_stock_exposure_pct() -> Decimal {
    Decimal::from(20)
}

fn default_max_concentration_risk() -> Decimal {
    Decimal::new(6, 1) // 0.6
}

fn default_max_trades_per_day() -> u32 {
    200
}

fn default_min_stock_price() -> Decimal {
    Decimal::from(5)
}

fn default_alert_severity_threshold() -> AlertSeverity {
    AlertSeverity::High
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self {
            max_position_size: default_max_position_size(),
            max_daily_drawdown_pct: default_max_daily_drawdown_pct(),
            max_single_stock_exposure_pct: default_max_single_stock_exposure_pct(),
            max_concentration_risk: default_max_concentration_risk(),
            max_trades_per_day: default_max_trades_per_day(),
            min_stock_price: default_min_stock_price(),
            alert_severity_threshold: default_alert_severity_threshold(),
            last_updated: Utc::now(),
        }
    }
}

impl RiskParameters {
    /// Stamp the parameters as updated now.
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
        let params = RiskParameters::default();
        assert_eq!(params.max_position_size, dec!(50000));
        assert_eq!(params.max_daily_drawdown_pct, dec!(5));
        assert_eq!(params.alert_severity_threshold, AlertSeverity::High);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let params: RiskParameters =
            serde_json::from_str(r#"{"max_position_size": "10000"}"#).unwrap();
        assert_eq!(params.max_position_size, dec!(10000));
        assert_eq!(params.max_daily_drawdown_pct, dec!(5));
    }

    #[test]
    fn test_touch_advances_timestamp() {
        let mut params = RiskParameters::default();
        let before = params.last_updated;
        std::thread::sleep(std::time::Duration::from_millis(2));
        params.touch();
        assert!(params.last_updated > before);
    }
}
