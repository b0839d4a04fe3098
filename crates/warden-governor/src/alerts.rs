//! External alert ingestion and the active alert book.
//!
//! Incoming alerts are filtered at ingestion by symbol relevance and the
//! configured severity threshold, then kept as `oracle_warning` risk alerts.
//! Ingestion itself never blocks a trade: the blocking effect happens only
//! when the decision algorithm consults the book for the intent's symbol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use warden_core::{AlertKind, AlertSeverity, RiskAlert, Symbol};

/// An alert arriving from an external monitoring collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalAlert {
    /// Source system name (e.g. "oracle").
    pub source: String,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    /// Symbol the alert concerns; symbol-less alerts are not actionable here.
    pub symbol: Option<Symbol>,
    pub recommended_action: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Active external alerts, indexed by symbol.
#[derive(Debug, Default)]
pub struct AlertBook {
    by_symbol: HashMap<Symbol, Vec<RiskAlert>>,
}

impl AlertBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest an external alert.
    ///
    /// Returns the converted `oracle_warning` alert when it qualifies:
    /// the alert must be symbol-scoped and at or above `threshold`.
    pub fn ingest(
        &mut self,
        alert: ExternalAlert,
        threshold: AlertSeverity,
        governor: &str,
    ) -> Option<RiskAlert> {
        let Some(symbol) = alert.symbol.clone() else {
            debug!(source = %alert.source, "dropping alert without symbol scope");
            return None;
        };
        if alert.severity < threshold {
            debug!(
                source = %alert.source,
                symbol = %symbol,
                severity = %alert.severity,
                "dropping alert below severity threshold"
            );
            return None;
        }

        let mut converted = RiskAlert::new(
            AlertKind::OracleWarning,
            alert.severity,
            alert.title,
            alert.message,
            rust_decimal::Decimal::ZERO,
            rust_decimal::Decimal::ZERO,
            alert.recommended_action,
            governor,
        )
        .for_symbol(symbol.clone());
        if let Some(at) = alert.expires_at {
            converted = converted.expiring_at(at);
        }

        self.by_symbol
            .entry(symbol)
            .or_default()
            .push(converted.clone());

        Some(converted)
    }

    /// Active (unexpired) alerts for a symbol at or above a severity.
    pub fn matching(
        &self,
        symbol: &Symbol,
        threshold: AlertSeverity,
        now: DateTime<Utc>,
    ) -> Vec<&RiskAlert> {
        self.by_symbol
            .get(symbol)
            .map(|alerts| {
                alerts
                    .iter()
                    .filter(|a| !a.is_expired(now) && a.severity >= threshold)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drop expired alerts. Called from the scan cycle.
    pub fn sweep_expired(&mut self, now: DateTime<Utc>) {
        for alerts in self.by_symbol.values_mut() {
            alerts.retain(|a| !a.is_expired(now));
        }
        self.by_symbol.retain(|_, alerts| !alerts.is_empty());
    }

    /// Total active alerts.
    pub fn len(&self) -> usize {
        self.by_symbol.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn external(symbol: Option<&str>, severity: AlertSeverity) -> ExternalAlert {
        ExternalAlert {
            source: "oracle".into(),
            severity,
            title: "Volatility spike".into(),
            message: "Implied vol doubled in an hour".into(),
            symbol: symbol.map(Symbol::new),
            recommended_action: "Reduce exposure".into(),
            expires_at: None,
        }
    }

    #[test]
    fn test_ingest_filters_below_threshold() {
        let mut book = AlertBook::new();
        let kept = book.ingest(
            external(Some("TSLA"), AlertSeverity::Low),
            AlertSeverity::High,
            "monarch",
        );
        assert!(kept.is_none());
        assert!(book.is_empty());
    }

    #[test]
    fn test_ingest_drops_symbolless() {
        let mut book = AlertBook::new();
        assert!(book
            .ingest(external(None, AlertSeverity::Critical), AlertSeverity::Low, "monarch")
            .is_none());
    }

    #[test]
    fn test_ingest_converts_to_oracle_warning() {
        let mut book = AlertBook::new();
        let kept = book
            .ingest(
                external(Some("TSLA"), AlertSeverity::Critical),
                AlertSeverity::High,
                "monarch",
            )
            .unwrap();
        assert_eq!(kept.kind, AlertKind::OracleWarning);
        assert_eq!(book.len(), 1);

        let matches = book.matching(&Symbol::new("TSLA"), AlertSeverity::High, Utc::now());
        assert_eq!(matches.len(), 1);
        assert!(book
            .matching(&Symbol::new("AAPL"), AlertSeverity::Low, Utc::now())
            .is_empty());
    }

    #[test]
    fn test_sweep_removes_expired() {
        let mut book = AlertBook::new();
        let mut alert = external(Some("TSLA"), AlertSeverity::Critical);
        alert.expires_at = Some(Utc::now() - Duration::seconds(1));
        book.ingest(alert, AlertSeverity::Low, "monarch").unwrap();
        assert_eq!(book.len(), 1);

        book.sweep_expired(Utc::now());
        assert!(book.is_empty());
    }
}
