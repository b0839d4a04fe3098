//! Strategy decision engines.
//!
//! Each engine is a pure function from a market view (rolling OHLCV window
//! plus sizing inputs) to a [`Decision`]. Engines hold no state across calls
//! beyond indicator recomputation; identical candle sequences always yield
//! identical decisions.

pub mod breakout;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod market;
pub mod mean_reversion;
pub mod momentum;
pub mod sizing;

pub use breakout::BreakoutEngine;
pub use config::{BreakoutConfig, MeanReversionConfig, MomentumConfig};
pub use decision::{Decision, DecisionAction};
pub use engine::{intent_from_decision, run_symbols, RunReport, StrategyEngine};
pub use error::{StrategyError, StrategyResult};
pub use market::{Candle, MarketView, PositionState};
pub use mean_reversion::MeanReversionEngine;
pub use momentum::MomentumEngine;
pub use sizing::position_qty;
