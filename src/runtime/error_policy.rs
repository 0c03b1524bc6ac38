//! # Error Policy
//!
//! Handling of poll outcomes for the poll loop: logging of failures and the
//! optional skip-based backoff.
//!
//! Backoff follows the usual scheduled-poll model. After
//! `backoff_error_threshold` consecutive failed polls, or
//! `backoff_idle_threshold` consecutive polls that found nothing, the next
//! `backoff_multiplier` scheduled polls are skipped. The counters then start
//! over. A multiplier of 0 disables backoff.

use crate::config::PollConfig;
use crate::error::PollError;
use crate::observability;
use tracing::{debug, error, info};

/// Skip-based poll backoff state
#[derive(Debug, Clone, Default)]
pub struct PollBackoff {
    multiplier: u32,
    idle_threshold: u32,
    error_threshold: u32,
    idle_count: u32,
    error_count: u32,
    skip_remaining: u32,
}

impl PollBackoff {
    pub fn new(multiplier: u32, idle_threshold: u32, error_threshold: u32) -> Self {
        Self {
            multiplier,
            idle_threshold,
            error_threshold,
            ..Self::default()
        }
    }

    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(
            config.backoff_multiplier,
            config.backoff_idle_threshold,
            config.backoff_error_threshold,
        )
    }

    /// Whether the current scheduled poll should be skipped
    ///
    /// Consumes one skip when a backoff is in progress.
    pub fn should_skip(&mut self) -> bool {
        if self.skip_remaining == 0 {
            return false;
        }
        self.skip_remaining -= 1;
        observability::metrics::increment_polls_skipped();
        debug!(remaining = self.skip_remaining, "poll.skipped.backoff");
        true
    }

    /// Record the outcome of a poll that ran
    pub fn record(&mut self, outcome: &Result<usize, PollError>) {
        if self.multiplier == 0 {
            return;
        }

        match outcome {
            Ok(0) => {
                self.idle_count += 1;
                self.error_count = 0;
            }
            Ok(_) => {
                self.idle_count = 0;
                self.error_count = 0;
            }
            Err(_) => {
                self.error_count += 1;
                self.idle_count = 0;
            }
        }

        let idle_hit = self.idle_threshold > 0 && self.idle_count >= self.idle_threshold;
        let error_hit = self.error_threshold > 0 && self.error_count >= self.error_threshold;
        if idle_hit || error_hit {
            info!(
                "Backing off, skipping the next {} polls (idle: {}, errors: {})",
                self.multiplier, self.idle_count, self.error_count
            );
            self.skip_remaining = self.multiplier;
            self.idle_count = 0;
            self.error_count = 0;
        }
    }

    /// Number of scheduled polls still to be skipped
    pub fn skip_remaining(&self) -> u32 {
        self.skip_remaining
    }
}

/// Log the outcome of a poll
///
/// Failures are reported here and never stop the loop; the entries that were
/// not reached stay buffered for the next poll.
pub fn handle_poll_result(result: &Result<usize, PollError>) {
    match result {
        Ok(0) => {}
        Ok(count) => debug!(count, "poll.drained"),
        Err(e) => {
            error!(error = %e, "Poll failed: {}", e);
        }
    }
}
