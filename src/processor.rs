//! # Downstream Processors
//!
//! The drain hands every exchange to a [`Processor`] and waits for it to finish
//! before removing the buffered entry.

use crate::error::ProcessError;
use crate::exchange::Exchange;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

/// Consumer of drained exchanges
#[async_trait]
pub trait Processor: Send + Sync {
    /// Process one exchange. An error fails the whole poll.
    async fn process(&self, exchange: Exchange) -> Result<(), ProcessError>;
}

/// Logs every exchange without exposing Secret values
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingProcessor;

#[async_trait]
impl Processor for LoggingProcessor {
    async fn process(&self, exchange: Exchange) -> Result<(), ProcessError> {
        let action = exchange
            .event_action()
            .map_or("unknown", |a| a.as_str());
        let timestamp = exchange.event_timestamp().unwrap_or_default();
        let secret_type = exchange.body.type_.as_deref().unwrap_or("Opaque");

        // Key names only, values stay out of the logs
        let mut keys: Vec<&str> = exchange
            .body
            .data
            .iter()
            .flat_map(|data| data.keys())
            .chain(exchange.body.string_data.iter().flat_map(|data| data.keys()))
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys.dedup();

        info!(
            exchange.id = %exchange.id,
            secret = %exchange.secret_ref(),
            secret_type,
            event.action = action,
            event.timestamp = timestamp,
            keys = ?keys,
            "secret.event"
        );
        Ok(())
    }
}

/// Forwards exchanges into a tokio channel
#[derive(Debug, Clone)]
pub struct ChannelProcessor {
    sender: mpsc::Sender<Exchange>,
}

impl ChannelProcessor {
    pub fn new(sender: mpsc::Sender<Exchange>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Processor for ChannelProcessor {
    async fn process(&self, exchange: Exchange) -> Result<(), ProcessError> {
        self.sender
            .send(exchange)
            .await
            .map_err(|_closed| ProcessError::ChannelClosed)
    }
}
