//! # Secrets Consumer
//!
//! Ties the watch listener and the poll drainer around one shared [`EventBuffer`].
//!
//! ```text
//! Stopped --start()--> Running --poll()--> Running --stop()--> Stopped (buffer cleared)
//! ```
//!
//! ## Drain semantics
//!
//! `poll` records the buffer size, then walks a snapshot of the keys. For every
//! key still present it hands an [`Exchange`] to the processor and removes the
//! entry right after the hand-off. A processor failure aborts the poll: entries
//! already handed off are gone, the failing entry and everything after it stay
//! buffered for the next poll.

use crate::buffer::EventBuffer;
use crate::config::KubernetesConfig;
use crate::error::{ConsumerError, PollError};
use crate::exchange::Exchange;
use crate::observability;
use crate::processor::Processor;
use crate::watch::{BufferingHandler, SecretWatchSource, WatchHandler, WatchSubscription};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Bridge between a Secret watch and a downstream processor
pub struct SecretsConsumer<S> {
    config: KubernetesConfig,
    source: S,
    processor: Arc<dyn Processor>,
    buffer: Arc<EventBuffer>,
    subscription: Mutex<Option<WatchSubscription>>,
    running: AtomicBool,
}

impl<S> std::fmt::Debug for SecretsConsumer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsConsumer")
            .field("config", &self.config)
            .field("buffered", &self.buffer.len())
            .field("running", &self.running.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl<S: SecretWatchSource> SecretsConsumer<S> {
    pub fn new(config: KubernetesConfig, source: S, processor: Arc<dyn Processor>) -> Self {
        Self {
            config,
            source,
            processor,
            buffer: Arc::new(EventBuffer::new()),
            subscription: Mutex::new(None),
            running: AtomicBool::new(false),
        }
    }

    /// Shared buffer fed by the watch
    pub fn buffer(&self) -> &Arc<EventBuffer> {
        &self.buffer
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Whether a watch subscription is currently open
    pub async fn is_watching(&self) -> bool {
        self.subscription.lock().await.is_some()
    }

    /// Start with an empty buffer and, when a credential is configured, open the watch
    ///
    /// Without a credential the consumer runs idle: no subscription is made and
    /// every poll returns 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the watch subscription cannot be opened.
    pub async fn start(&self) -> Result<(), ConsumerError> {
        let mut subscription = self.subscription.lock().await;
        if self.is_running() {
            debug!("Secrets consumer already running");
            return Ok(());
        }

        self.buffer.clear();

        if self.config.has_credential() {
            let scope = self.config.scope();
            let handler: Arc<dyn WatchHandler> =
                Arc::new(BufferingHandler::new(Arc::clone(&self.buffer)));
            let opened = self
                .source
                .watch(scope.clone(), handler)
                .await
                .map_err(|e| ConsumerError::Watch(e.into()))?;
            *subscription = Some(opened);
            info!("Secrets consumer started, watching {}", scope);
        } else {
            debug!("No OAuth token configured, Secret watch not started");
        }

        self.running.store(true, Ordering::Release);
        Ok(())
    }

    /// Close the watch and drop every pending event
    pub async fn stop(&self) {
        let mut subscription = self.subscription.lock().await;
        if !self.is_running() {
            debug!("Secrets consumer already stopped");
            return;
        }

        if let Some(open) = subscription.take() {
            open.close();
        }
        let dropped = self.buffer.len();
        self.buffer.clear();
        self.running.store(false, Ordering::Release);
        info!(dropped, "Secrets consumer stopped");
    }

    /// Drain the buffer into the processor
    ///
    /// Returns the number of entries buffered when the poll started.
    ///
    /// # Errors
    ///
    /// Returns [`PollError::Processing`] when the processor fails; the failing
    /// entry and the ones after it stay buffered.
    pub async fn poll(&self) -> Result<usize, PollError> {
        let count = self.buffer.len();

        for timestamp in self.buffer.keys() {
            // Entry may have been replaced since the snapshot; deliver the current value
            let Some(event) = self.buffer.get(timestamp) else {
                continue;
            };
            let (action, secret) = event.into_parts();
            let exchange = Exchange::for_event(action, timestamp, secret);

            if let Err(source) = self.processor.process(exchange).await {
                observability::metrics::increment_poll_failures();
                return Err(PollError::Processing { timestamp, source });
            }

            self.buffer.remove(timestamp);
            observability::metrics::increment_exchanges_drained();
        }

        Ok(count)
    }
}
