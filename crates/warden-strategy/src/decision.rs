//! Strategy decision types.

use serde::{Deserialize, Serialize};
use std::fmt;
use warden_core::{OrderSide, Qty};

/// What the engine wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    /// Open a new position.
    Enter,
    /// Close the current position.
    Exit,
    /// Do nothing.
    None,
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enter => write!(f, "enter"),
            Self::Exit => write!(f, "exit"),
            Self::None => write!(f, "none"),
        }
    }
}

/// The outcome of one engine evaluation on one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: DecisionAction,
    /// Trade side for enter/exit decisions.
    pub side: Option<OrderSide>,
    /// Sized quantity for enter decisions; exit closes the full position.
    pub qty: Qty,
    /// Why the engine decided this.
    pub reason: String,
}

impl Decision {
    /// A no-op decision with an explanatory reason.
    pub fn none(reason: impl Into<String>) -> Self {
        Self {
            action: DecisionAction::None,
            side: None,
            qty: Qty::ZERO,
            reason: reason.into(),
        }
    }

    pub fn enter(side: OrderSide, qty: Qty, reason: impl Into<String>) -> Self {
        Self {
            action: DecisionAction::Enter,
            side: Some(side),
            qty,
            reason: reason.into(),
        }
    }

    pub fn exit(side: OrderSide, qty: Qty, reason: impl Into<String>) -> Self {
        Self {
            action: DecisionAction::Exit,
            side: Some(side),
            qty,
            reason: reason.into(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.action == DecisionAction::None
    }
}
