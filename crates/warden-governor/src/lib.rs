//! Portfolio risk governor ("Monarch").
//!
//! A single-threaded actor that owns the portfolio risk parameters and a
//! refreshable portfolio context snapshot, and evaluates every trade intent
//! against portfolio-wide limits. All entry points — per-intent evaluation,
//! context refresh, external alert ingestion, and the fixed-interval scan —
//! are serialized through one mailbox, so two intents can never be checked
//! against the same pre-trade equity figure concurrently.
//!
//! The governor fails closed: any internal failure during evaluation
//! resolves to a blocking decision, never an escaped error.

pub mod alerts;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod governor;
pub mod params;

pub use alerts::{AlertBook, ExternalAlert};
pub use context::{PortfolioContext, PortfolioProvider};
pub use error::{GovernorError, GovernorResult};
pub use evaluator::{evaluate_intent, Evaluation};
pub use governor::{
    spawn_governor, EvaluationOutcome, GovernorConfig, GovernorHandle, GovernorState,
};
pub use params::RiskParameters;
