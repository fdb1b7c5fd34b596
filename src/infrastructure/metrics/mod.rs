//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Registered session gauge
//! - Applied move counter
//! - Finished game counts by end type
//! - Negotiation results by offer kind

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Sessions currently held by the registry
pub static SESSIONS_REGISTERED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("sessions_registered", "Number of sessions held by the registry")
            .namespace("chess_sessions"),
    )
    .expect("Failed to create SESSIONS_REGISTERED metric")
});

/// Moves applied across all sessions
pub static MOVES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("moves_total", "Total number of applied moves").namespace("chess_sessions"),
    )
    .expect("Failed to create MOVES_TOTAL metric")
});

/// Finished games by how they ended
pub static GAMES_FINISHED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("games_finished_total", "Total number of finished games")
            .namespace("chess_sessions"),
        &["end"],
    )
    .expect("Failed to create GAMES_FINISHED_TOTAL metric")
});

/// Draw and rematch offers by result
pub static NEGOTIATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("negotiations_total", "Total number of settled offers")
            .namespace("chess_sessions"),
        &["kind", "result"], // "draw"/"rematch", "accepted"/"declined"/"expired"
    )
    .expect("Failed to create NEGOTIATIONS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(SESSIONS_REGISTERED.clone()))
        .expect("Failed to register SESSIONS_REGISTERED");
    registry
        .register(Box::new(MOVES_TOTAL.clone()))
        .expect("Failed to register MOVES_TOTAL");
    registry
        .register(Box::new(GAMES_FINISHED_TOTAL.clone()))
        .expect("Failed to register GAMES_FINISHED_TOTAL");
    registry
        .register(Box::new(NEGOTIATIONS_TOTAL.clone()))
        .expect("Failed to register NEGOTIATIONS_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to update the registered session count
pub fn set_sessions_registered(count: usize) {
    SESSIONS_REGISTERED.set(i64::try_from(count).unwrap_or(i64::MAX));
}

/// Helper to record an applied move
pub fn record_move() {
    MOVES_TOTAL.inc();
}

/// Helper to record a finished game
pub fn record_game_finished(end: &str) {
    GAMES_FINISHED_TOTAL.with_label_values(&[end]).inc();
}

/// Helper to record a settled draw or rematch offer
pub fn record_negotiation(kind: &str, result: &str) {
    NEGOTIATIONS_TOTAL.with_label_values(&[kind, result]).inc();
}
