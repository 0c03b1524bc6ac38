//! # Observability
//!
//! Prometheus metrics for the watch, the buffer and the poll loop.

pub mod metrics;
