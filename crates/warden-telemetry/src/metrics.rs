//! Prometheus metrics for the governance pipeline.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent
//! failure. These panics only occur during static initialization, never at
//! runtime.

use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, register_int_counter, CounterVec, Histogram, IntCounter};

/// Governance decisions by action.
pub static DECISIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "warden_decisions_total",
        "Total governance decisions",
        &["action"]
    )
    .unwrap()
});

/// Interventions (soft or hard pulls) by governor.
pub static INTERVENTIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "warden_interventions_total",
        "Total governance interventions",
        &["governor"]
    )
    .unwrap()
});

/// Orders blocked by the gate, by reason code.
pub static GATE_BLOCKED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "warden_gate_blocked_total",
        "Total order gate blocks",
        &["reason"]
    )
    .unwrap()
});

/// Orders placed, by execution mode.
pub static ORDERS_PLACED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "warden_orders_placed_total",
        "Total orders placed after passing the gate",
        &["mode"]
    )
    .unwrap()
});

/// Risk alerts raised, by kind and severity.
pub static RISK_ALERTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "warden_risk_alerts_total",
        "Total risk alerts raised",
        &["kind", "severity"]
    )
    .unwrap()
});

/// Portfolio context refresh failures.
pub static CONTEXT_REFRESH_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "warden_context_refresh_failures_total",
        "Total portfolio context refresh failures"
    )
    .unwrap()
});

/// Continuous scan cycles executed.
pub static SCAN_CYCLES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "warden_scan_cycles_total",
        "Total continuous risk scan cycles"
    )
    .unwrap()
});

/// Per-intent decision latency in milliseconds.
pub static DECISION_LATENCY_MS: Lazy<Histogram> = Lazy::new(|| {
    prometheus::register_histogram!(prometheus::histogram_opts!(
        "warden_decision_latency_ms",
        "Governance decision latency in milliseconds",
        vec![0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 250.0, 500.0]
    ))
    .unwrap()
});
