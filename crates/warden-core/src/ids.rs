//! Unique record identifiers.
//!
//! Every persisted record carries a prefixed, globally unique string ID.
//! Format: `{prefix}_{timestamp_ms}_{uuid_short}` — sortable by creation
//! time and unique across restarts.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

fn generate(prefix: &str) -> String {
    let ts = chrono::Utc::now().timestamp_millis();
    let uuid_short = &Uuid::new_v4().to_string()[..8];
    format!("{prefix}_{ts}_{uuid_short}")
}

macro_rules! record_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Create a new unique ID.
            pub fn new() -> Self {
                Self(generate($prefix))
            }

            /// Create from an existing string (for parsing stored records).
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::from_string(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

record_id!(
    /// Identifier for a [`crate::TradeIntent`].
    IntentId,
    "int"
);

record_id!(
    /// Identifier for a [`crate::GovernanceDecision`].
    DecisionId,
    "gd"
);

record_id!(
    /// Identifier for a [`crate::RiskAlert`].
    AlertId,
    "ra"
);

record_id!(
    /// Identifier for an [`crate::OrderRecord`].
    OrderId,
    "ord"
);
