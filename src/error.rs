//! # Error Types
//!
//! Errors surfaced by the watch binding, the downstream processor, the drain and
//! consumer startup.

use thiserror::Error;

/// Reason a Secret watch closed abnormally
#[derive(Debug, Error)]
pub enum WatchError {
    /// The API server sent an error status on the watch stream
    #[error("watch error status {code}: {reason}: {message}")]
    Status {
        code: u16,
        reason: String,
        message: String,
    },
    /// The request or connection to the API server failed
    #[error("watch transport failed: {0}")]
    Transport(#[from] kube::Error),
}

impl WatchError {
    /// A 410 status means the resource version expired and the watch cannot resume
    pub fn is_gone(&self) -> bool {
        matches!(self, WatchError::Status { code: 410, .. })
    }
}

/// Failure reported by a downstream processor
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Downstream channel has been closed
    #[error("downstream channel closed")]
    ChannelClosed,
    /// Any other processing failure
    #[error("processing failed: {0}")]
    Failed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ProcessError {
    /// Wrap an arbitrary failure raised while processing an exchange
    pub fn failed(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ProcessError::Failed(error.into())
    }
}

/// Failure of a single drain pass
#[derive(Debug, Error)]
pub enum PollError {
    /// The processor rejected the exchange for the entry keyed by `timestamp`
    #[error("processor failed on event at {timestamp}: {source}")]
    Processing {
        timestamp: i64,
        #[source]
        source: ProcessError,
    },
}

/// Failure while starting the consumer
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// The Kubernetes client could not be configured
    #[error("failed to configure Kubernetes client: {0}")]
    ClientConfig(String),
    /// The client could not be built from the configuration
    #[error("failed to create Kubernetes client: {0}")]
    Client(#[from] kube::Error),
    /// The watch subscription could not be opened
    #[error("failed to open secret watch: {0}")]
    Watch(#[source] Box<dyn std::error::Error + Send + Sync>),
}
