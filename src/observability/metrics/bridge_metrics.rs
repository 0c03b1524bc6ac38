//! # Bridge Metrics
//!
//! Metrics for watch notifications, the event buffer and the poll loop.

use crate::event::SecretAction;
use crate::observability::metrics::registry::REGISTRY;
use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec, IntGauge};
use std::sync::LazyLock;

// Watch metrics
static EVENTS_RECEIVED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secret_watch_bridge_events_received_total",
            "Total number of Secret watch notifications received",
        ),
        &["action"],
    )
    .expect("Failed to create EVENTS_RECEIVED_TOTAL metric - this should never happen")
});

static WATCH_CLOSURES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secret_watch_bridge_watch_closures_total",
            "Total number of Secret watch closures",
        ),
        &["outcome"],
    )
    .expect("Failed to create WATCH_CLOSURES_TOTAL metric - this should never happen")
});

// Buffer metrics
static BUFFER_SIZE: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "secret_watch_bridge_buffer_size",
        "Current number of events waiting to be drained",
    )
    .expect("Failed to create BUFFER_SIZE metric - this should never happen")
});

static BUFFER_OVERWRITES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "secret_watch_bridge_buffer_overwrites_total",
        "Total number of buffered events replaced by a later event with the same timestamp",
    )
    .expect("Failed to create BUFFER_OVERWRITES_TOTAL metric - this should never happen")
});

// Poll metrics
static EXCHANGES_DRAINED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "secret_watch_bridge_exchanges_drained_total",
        "Total number of exchanges handed to the processor and removed from the buffer",
    )
    .expect("Failed to create EXCHANGES_DRAINED_TOTAL metric - this should never happen")
});

static POLL_FAILURES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "secret_watch_bridge_poll_failures_total",
        "Total number of polls aborted by a processor failure",
    )
    .expect("Failed to create POLL_FAILURES_TOTAL metric - this should never happen")
});

static POLLS_SKIPPED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "secret_watch_bridge_polls_skipped_total",
        "Total number of scheduled polls skipped by backoff",
    )
    .expect("Failed to create POLLS_SKIPPED_TOTAL metric - this should never happen")
});

static POLL_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "secret_watch_bridge_poll_duration_seconds",
            "Duration of a poll in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
    )
    .expect("Failed to create POLL_DURATION metric - this should never happen")
});

/// Register bridge metrics with the registry
pub(crate) fn register_bridge_metrics() -> Result<()> {
    REGISTRY.register(Box::new(EVENTS_RECEIVED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(WATCH_CLOSURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(BUFFER_SIZE.clone()))?;
    REGISTRY.register(Box::new(BUFFER_OVERWRITES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(EXCHANGES_DRAINED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(POLL_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(POLLS_SKIPPED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(POLL_DURATION.clone()))?;
    Ok(())
}

pub fn increment_events_received(action: SecretAction) {
    EVENTS_RECEIVED_TOTAL
        .with_label_values(&[action.as_str()])
        .inc();
}

pub fn increment_watch_closures(outcome: &str) {
    WATCH_CLOSURES_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn set_buffer_size(size: usize) {
    BUFFER_SIZE.set(i64::try_from(size).unwrap_or(i64::MAX));
}

pub fn increment_buffer_overwrites() {
    BUFFER_OVERWRITES_TOTAL.inc();
}

pub fn increment_exchanges_drained() {
    EXCHANGES_DRAINED_TOTAL.inc();
}

pub fn increment_poll_failures() {
    POLL_FAILURES_TOTAL.inc();
}

pub fn increment_polls_skipped() {
    POLLS_SKIPPED_TOTAL.inc();
}

pub fn observe_poll_duration(duration: f64) {
    POLL_DURATION.observe(duration);
}
