//! Application configuration.

use crate::error::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use warden_core::TradeMode;
use warden_gate::RiskPolicy;
use warden_governor::{GovernorConfig, RiskParameters};
use warden_strategy::{BreakoutConfig, MeanReversionConfig, MomentumConfig};

/// Governor section of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernorSection {
    /// Governor instance name. Default: "monarch".
    #[serde(default = "default_governor_name")]
    pub name: String,
    /// Continuous scan interval in seconds. Default: 30.
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
    /// Bounded timeout for portfolio fetches in milliseconds. Default: 2000.
    #[serde(default = "default_context_timeout_ms")]
    pub context_timeout_ms: u64,
    /// Portfolio-wide risk parameters.
    #[serde(default)]
    pub params: RiskParameters,
}

fn default_governor_name() -> String {
    "monarch".to_string()
}

fn default_scan_interval_secs() -> u64 {
    30
}

fn default_context_timeout_ms() -> u64 {
    2000
}

impl Default for GovernorSection {
    fn default() -> Self {
        Self {
            name: default_governor_name(),
            scan_interval_secs: default_scan_interval_secs(),
            context_timeout_ms: default_context_timeout_ms(),
            params: RiskParameters::default(),
        }
    }
}

impl GovernorSection {
    pub fn governor_config(&self) -> GovernorConfig {
        GovernorConfig {
            name: self.name.clone(),
            scan_interval: Duration::from_secs(self.scan_interval_secs),
            context_timeout: Duration::from_millis(self.context_timeout_ms),
            ..Default::default()
        }
    }
}

/// Strategy engines section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategiesSection {
    /// Bot identifier stamped on emitted intents.
    #[serde(default = "default_bot_id")]
    pub bot_id: String,
    #[serde(default)]
    pub momentum: MomentumConfig,
    #[serde(default)]
    pub mean_reversion: MeanReversionConfig,
    #[serde(default)]
    pub breakout: BreakoutConfig,
}

fn default_bot_id() -> String {
    "warden-bot".to_string()
}

impl Default for StrategiesSection {
    fn default() -> Self {
        Self {
            bot_id: default_bot_id(),
            momentum: MomentumConfig::default(),
            mean_reversion: MeanReversionConfig::default(),
            breakout: BreakoutConfig::default(),
        }
    }
}

/// Audit log section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSection {
    /// Directory for the append-only JSON Lines files. Default: data/audit.
    #[serde(default = "default_audit_dir")]
    pub dir: String,
    /// Buffer size before flush for non-durable appends. Default: 1.
    #[serde(default = "default_audit_buffer")]
    pub buffer: usize,
}

fn default_audit_dir() -> String {
    "data/audit".to_string()
}

fn default_audit_buffer() -> usize {
    1
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            dir: default_audit_dir(),
            buffer: default_audit_buffer(),
        }
    }
}

/// Paper-mode portfolio fixture used when no live portfolio service is wired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperSection {
    /// Simulated portfolio value. Default: 100,000.
    #[serde(default = "default_portfolio_value")]
    pub portfolio_value: Decimal,
    /// Simulated available cash. Default: 50,000.
    #[serde(default = "default_available_cash")]
    pub available_cash: Decimal,
}

fn default_portfolio_value() -> Decimal {
    Decimal::from(100_000)
}

fn default_available_cash() -> Decimal {
    Decimal::from(50_000)
}

impl Default for PaperSection {
    fn default() -> Self {
        Self {
            portfolio_value: default_portfolio_value(),
            available_cash: default_available_cash(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace owning the gated orders.
    #[serde(default = "default_workspace_id")]
    pub workspace_id: String,
    /// Execution mode.
    #[serde(default)]
    pub mode: TradeMode,
    #[serde(default)]
    pub governor: GovernorSection,
    /// Workspace gate policy.
    #[serde(default)]
    pub policy: RiskPolicy,
    #[serde(default)]
    pub strategies: StrategiesSection,
    #[serde(default)]
    pub audit: AuditSection,
    #[serde(default)]
    pub paper: PaperSection,
}

fn default_workspace_id() -> String {
    "default".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace_id: default_workspace_id(),
            mode: TradeMode::default(),
            governor: GovernorSection::default(),
            policy: RiskPolicy::default(),
            strategies: StrategiesSection::default(),
            audit: AuditSection::default(),
            paper: PaperSection::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the conventional location.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("WARDEN_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.workspace_id, "default");
        assert_eq!(config.governor.scan_interval_secs, 30);
        assert_eq!(config.policy.max_positions, 10);
        assert_eq!(config.strategies.momentum.fast_period, 9);
    }

    #[test]
    fn test_partial_overrides() {
        let toml_str = r#"
            workspace_id = "ws-42"
            mode = "live"

            [governor]
            scan_interval_secs = 10

            [governor.params]
            max_position_size = "25000"

            [policy]
            require_stop_loss = true

            [strategies.momentum]
            fast_period = 5
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.workspace_id, "ws-42");
        assert_eq!(config.mode, TradeMode::Live);
        assert_eq!(config.governor.scan_interval_secs, 10);
        assert_eq!(config.governor.params.max_position_size, dec!(25000));
        // Untouched params keep their defaults.
        assert_eq!(config.governor.params.max_daily_drawdown_pct, dec!(5));
        assert!(config.policy.require_stop_loss);
        assert_eq!(config.strategies.momentum.fast_period, 5);
        assert_eq!(config.strategies.momentum.slow_period, 21);
    }

    #[test]
    fn test_governor_config_mapping() {
        let section = GovernorSection::default();
        let gc = section.governor_config();
        assert_eq!(gc.scan_interval, Duration::from_secs(30));
        assert_eq!(gc.context_timeout, Duration::from_millis(2000));
        assert_eq!(gc.name, "monarch");
    }
}
