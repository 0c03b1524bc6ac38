//! # Poll Loop
//!
//! Fixed-delay scheduler driving the drain: wait `initial_delay`, poll, then wait
//! `delay` after every poll until shutdown is signalled.

use crate::config::PollConfig;
use crate::consumer::SecretsConsumer;
use crate::error::PollError;
use crate::observability;
use crate::runtime::error_policy::{handle_poll_result, PollBackoff};
use crate::watch::SecretWatchSource;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::info;

/// Anything the poll loop can drain
#[async_trait]
pub trait PollTarget: Send + Sync {
    async fn poll(&self) -> Result<usize, PollError>;
}

#[async_trait]
impl<S: SecretWatchSource> PollTarget for SecretsConsumer<S> {
    async fn poll(&self) -> Result<usize, PollError> {
        SecretsConsumer::poll(self).await
    }
}

/// Run the poll loop until `shutdown` becomes `true` or its sender is dropped
pub async fn run_poll_loop<P>(target: &P, config: &PollConfig, mut shutdown: watch::Receiver<bool>)
where
    P: PollTarget + ?Sized,
{
    let mut backoff = PollBackoff::from_config(config);

    info!(
        initial_delay_ms = config.initial_delay_ms,
        delay_ms = config.delay_ms,
        "Starting poll loop"
    );

    if wait_or_shutdown(config.initial_delay(), &mut shutdown).await {
        info!("Poll loop stopped before the first poll");
        return;
    }

    loop {
        if !backoff.should_skip() {
            let started = Instant::now();
            let result = target.poll().await;
            observability::metrics::observe_poll_duration(started.elapsed().as_secs_f64());
            handle_poll_result(&result);
            backoff.record(&result);
        }

        if wait_or_shutdown(config.delay(), &mut shutdown).await {
            break;
        }
    }

    info!("Poll loop stopped");
}

/// Sleep for `delay`; returns `true` when shutdown was requested
async fn wait_or_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return true;
    }
    tokio::select! {
        () = tokio::time::sleep(delay) => false,
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
    }
}
