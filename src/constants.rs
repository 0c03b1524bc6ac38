//! # Constants
//!
//! Default values and well-known names shared across the bridge.

/// Default port for the metrics and probe HTTP server
pub const DEFAULT_METRICS_PORT: u16 = 5000;

/// Default time to wait for the HTTP server to bind (seconds)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default interval between server readiness checks during startup (milliseconds)
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Default delay before the first poll (milliseconds)
pub const DEFAULT_POLL_INITIAL_DELAY_MS: u64 = 1000;

/// Default fixed delay between the end of one poll and the start of the next (milliseconds)
pub const DEFAULT_POLL_DELAY_MS: u64 = 500;

/// Backoff is disabled unless a multiplier is configured
pub const DEFAULT_POLL_BACKOFF_MULTIPLIER: u32 = 0;

/// Header carrying the watch action of a drained event
pub const KUBERNETES_EVENT_ACTION: &str = "KubernetesEventAction";

/// Header carrying the buffer timestamp key (milliseconds since epoch) of a drained event
pub const KUBERNETES_EVENT_TIMESTAMP: &str = "KubernetesEventTimestamp";

/// Default tracing filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "secret_watch_bridge=info";
