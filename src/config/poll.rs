//! # Poll Configuration
//!
//! Fixed-delay scheduling and backoff settings for the poll loop.

use super::var_or_default;
use crate::constants::{
    DEFAULT_POLL_BACKOFF_MULTIPLIER, DEFAULT_POLL_DELAY_MS, DEFAULT_POLL_INITIAL_DELAY_MS,
};
use std::time::Duration;

/// Poll scheduling settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before the first poll (milliseconds)
    pub initial_delay_ms: u64,
    /// Delay between the end of one poll and the start of the next (milliseconds)
    pub delay_ms: u64,
    /// Number of scheduled polls to skip once a backoff threshold is hit; 0 disables backoff
    pub backoff_multiplier: u32,
    /// Consecutive empty polls that trigger a backoff; 0 disables idle backoff
    pub backoff_idle_threshold: u32,
    /// Consecutive failed polls that trigger a backoff; 0 disables error backoff
    pub backoff_error_threshold: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: DEFAULT_POLL_INITIAL_DELAY_MS,
            delay_ms: DEFAULT_POLL_DELAY_MS,
            backoff_multiplier: DEFAULT_POLL_BACKOFF_MULTIPLIER,
            backoff_idle_threshold: 0,
            backoff_error_threshold: 0,
        }
    }
}

impl PollConfig {
    pub(crate) fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        Self {
            initial_delay_ms: var_or_default(
                lookup,
                "POLL_INITIAL_DELAY_MS",
                DEFAULT_POLL_INITIAL_DELAY_MS,
            ),
            delay_ms: var_or_default(lookup, "POLL_DELAY_MS", DEFAULT_POLL_DELAY_MS),
            backoff_multiplier: var_or_default(
                lookup,
                "POLL_BACKOFF_MULTIPLIER",
                DEFAULT_POLL_BACKOFF_MULTIPLIER,
            ),
            backoff_idle_threshold: var_or_default(lookup, "POLL_BACKOFF_IDLE_THRESHOLD", 0),
            backoff_error_threshold: var_or_default(lookup, "POLL_BACKOFF_ERROR_THRESHOLD", 0),
        }
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}
