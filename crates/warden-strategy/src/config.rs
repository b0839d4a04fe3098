//! Strategy engine configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Momentum (EMA crossover) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumConfig {
    /// Fast EMA period. Default: 9.
    #[serde(default = "default_fast_period")]
    pub fast_period: usize,
    /// Slow EMA period. Default: 21.
    #[serde(default = "default_slow_period")]
    pub slow_period: usize,
}

fn default_fast_period() -> usize {
    9
}

fn default_slow_period() -> usize {
    21
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            fast_period: default_fast_period(),
            slow_period: default_slow_period(),
        }
    }
}

/// Mean reversion (RSI) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeanReversionConfig {
    /// RSI lookback period. Default: 14.
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    /// Oversold entry threshold. Default: 30.
    #[serde(default = "default_oversold")]
    pub oversold: Decimal,
    /// Overbought entry threshold. Default: 70.
    #[serde(default = "default_overbought")]
    pub overbought: Decimal,
    /// Exit level crossed from either side. Default: 50.
    #[serde(default = "default_exit_level")]
    pub exit_level: Decimal,
}

fn default_rsi_period() -> usize {
    14
}

fn default_oversold() -> Decimal {
    Decimal::from(30)
}

fn default_overbought() -> Decimal {
    Decimal::from(70)
}

fn default_exit_level() -> Decimal {
    Decimal::from(50)
}

impl Default for MeanReversionConfig {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            oversold: default_oversold(),
            overbought: default_overbought(),
            exit_level: default_exit_level(),
        }
    }
}

/// Breakout (channel + volume) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakoutConfig {
    /// Rolling high/low channel period. Default: 20.
    #[serde(default = "default_channel_period")]
    pub channel_period: usize,
    /// Volume confirmation multiple over the rolling average. Default: 1.3.
    #[serde(default = "default_volume_multiple")]
    pub volume_multiple: Decimal,
    /// Re-entry buffer applied to either channel bound on exit, in percent.
    /// Default: 2.
    #[serde(default = "default_reentry_buffer_pct")]
    pub reentry_buffer_pct: Decimal,
}

fn default_channel_period() -> usize {
    20
}

fn default_volume_multiple() -> Decimal {
    Decimal::new(13, 1) // 1.3
}

fn default_reentry_buffer_pct() -> Decimal {
    Decimal::from(2)
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self {
            channel_period: default_channel_period(),
            volume_multiple: default_volume_multiple(),
            reentry_buffer_pct: default_reentry_buffer_pct(),
        }
    }
}
