//! # Metrics Module
//!
//! Prometheus metrics for monitoring the bridge, organized by responsibility.
//!
//! ## Sub-modules
//!
//! - `registry` - Metrics registry setup, registration and text encoding
//! - `bridge_metrics` - Watch, buffer and poll metrics

pub mod bridge_metrics;
pub mod registry;

pub use bridge_metrics::*;
pub use registry::*;
