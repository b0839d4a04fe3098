//! Portfolio risk alerts.

use crate::ids::AlertId;
use crate::intent::Symbol;
use crate::SCHEMA_VERSION;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert severity, totally ordered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Alert classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Daily or weekly drawdown limit breached.
    DrawdownBreach,
    /// Portfolio concentration limit breached.
    ConcentrationBreach,
    /// External oracle alert relevant to a tracked symbol.
    OracleWarning,
    /// A governance hard pull was issued.
    GovernanceBlock,
    /// Internal system failure.
    System,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DrawdownBreach => write!(f, "drawdown_breach"),
            Self::ConcentrationBreach => write!(f, "concentration_breach"),
            Self::OracleWarning => write!(f, "oracle_warning"),
            Self::GovernanceBlock => write!(f, "governance_block"),
            Self::System => write!(f, "system"),
        }
    }
}

/// A risk alert raised by the governor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAlert {
    pub id: AlertId,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    /// Symbol the alert applies to, if symbol-scoped.
    pub symbol: Option<Symbol>,
    /// Sector the alert applies to, if sector-scoped.
    pub sector: Option<String>,
    /// Observed value that triggered the alert.
    pub current_value: Decimal,
    /// Configured threshold it was compared against.
    pub threshold_value: Decimal,
    /// Suggested operator response.
    pub recommended_action: String,
    /// Name of the governor instance that raised it.
    pub governor: String,
    pub acknowledged: bool,
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl RiskAlert {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: AlertKind,
        severity: AlertSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
        current_value: Decimal,
        threshold_value: Decimal,
        recommended_action: impl Into<String>,
        governor: impl Into<String>,
    ) -> Self {
        Self {
            id: AlertId::new(),
            kind,
            severity,
            title: title.into(),
            message: message.into(),
            symbol: None,
            sector: None,
            current_value,
            threshold_value,
            recommended_action: recommended_action.into(),
            governor: governor.into(),
            acknowledged: false,
            schema_version: SCHEMA_VERSION,
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    pub fn for_symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub fn for_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn expiring_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    /// Whether the alert has expired as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| now >= exp).unwrap_or(false)
    }

    /// Whether the alert matches a symbol (symbol-scoped alerts only).
    pub fn matches_symbol(&self, symbol: &Symbol) -> bool {
        self.symbol.as_ref() == Some(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_severity_ordering() {
        assert!(AlertSeverity::Low < AlertSeverity::Medium);
        assert!(AlertSeverity::High < AlertSeverity::Critical);
    }

    #[test]
    fn test_symbol_matching() {
        let alert = RiskAlert::new(
            AlertKind::OracleWarning,
            AlertSeverity::High,
            "Earnings risk",
            "Earnings call in 2 hours",
            dec!(0),
            dec!(0),
            "Avoid new entries",
            "monarch",
        )
        .for_symbol(Symbol::new("TSLA"));

        assert!(alert.matches_symbol(&Symbol::new("tsla")));
        assert!(!alert.matches_symbol(&Symbol::new("AAPL")));
    }

    #[test]
    fn test_expiry() {
        let alert = RiskAlert::new(
            AlertKind::System,
            AlertSeverity::Low,
            "t",
            "m",
            dec!(0),
            dec!(0),
            "none",
            "monarch",
        )
        .expiring_at(Utc::now() - chrono::Duration::seconds(5));
        assert!(alert.is_expired(Utc::now()));
    }
}
