//! # Secret Watch
//!
//! Capability interfaces between the bridge and a Kubernetes client binding.
//!
//! - [`WatchHandler`] receives notifications (`on_event`) and the end of the
//!   subscription (`on_close`).
//! - [`SecretWatchSource`] opens a subscription for a [`WatchScope`] and hands back
//!   a [`WatchSubscription`] used to terminate it.
//!
//! [`BufferingHandler`] is the listener side: it turns every notification into a
//! [`SecretEvent`] stored in the [`EventBuffer`]. The kube-rs binding lives in
//! [`kube_source`].

pub mod kube_source;

use crate::buffer::EventBuffer;
use crate::error::WatchError;
use crate::event::{SecretAction, SecretEvent};
use crate::observability;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

pub use kube_source::KubeSecretSource;

/// Namespaces covered by a watch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchScope {
    /// Every namespace in the cluster
    AllNamespaces,
    /// A single named namespace
    Namespace(String),
}

impl WatchScope {
    /// Scope for an optional namespace setting; empty or absent means cluster-wide
    pub fn from_namespace(namespace: Option<&str>) -> Self {
        match namespace.map(str::trim) {
            Some(ns) if !ns.is_empty() => WatchScope::Namespace(ns.to_string()),
            _ => WatchScope::AllNamespaces,
        }
    }
}

impl fmt::Display for WatchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchScope::AllNamespaces => f.write_str("all namespaces"),
            WatchScope::Namespace(ns) => write!(f, "namespace '{ns}'"),
        }
    }
}

/// Receiver of watch notifications
///
/// Called from the client binding's own task, concurrently with polling.
pub trait WatchHandler: Send + Sync {
    /// A Secret was added, modified or deleted
    fn on_event(&self, action: SecretAction, secret: Secret);

    /// The subscription ended; `cause` is set when it ended abnormally
    fn on_close(&self, cause: Option<&WatchError>);
}

/// Handle to an open watch subscription
///
/// Dropping the handle closes the subscription.
pub struct WatchSubscription {
    close: Option<Box<dyn FnOnce() + Send>>,
}

impl WatchSubscription {
    pub fn new(close: impl FnOnce() + Send + 'static) -> Self {
        Self {
            close: Some(Box::new(close)),
        }
    }

    /// Terminate the subscription
    pub fn close(mut self) {
        if let Some(close) = self.close.take() {
            close();
        }
    }
}

impl Drop for WatchSubscription {
    fn drop(&mut self) {
        if let Some(close) = self.close.take() {
            close();
        }
    }
}

impl fmt::Debug for WatchSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchSubscription")
            .field("open", &self.close.is_some())
            .finish()
    }
}

/// Something able to watch Secrets for a scope
#[async_trait]
pub trait SecretWatchSource: Send + Sync {
    /// Open a subscription delivering notifications to `handler`
    async fn watch(
        &self,
        scope: WatchScope,
        handler: Arc<dyn WatchHandler>,
    ) -> anyhow::Result<WatchSubscription>;
}

/// Listener that stores every notification in the shared buffer
#[derive(Debug, Clone)]
pub struct BufferingHandler {
    buffer: Arc<EventBuffer>,
}

impl BufferingHandler {
    pub fn new(buffer: Arc<EventBuffer>) -> Self {
        Self { buffer }
    }
}

impl WatchHandler for BufferingHandler {
    fn on_event(&self, action: SecretAction, secret: Secret) {
        observability::metrics::increment_events_received(action);
        let timestamp = self.buffer.insert(SecretEvent::new(action, secret));
        debug!(event.action = %action, event.timestamp = timestamp, "watch.event.buffered");
    }

    fn on_close(&self, cause: Option<&WatchError>) {
        match cause {
            Some(cause) => {
                observability::metrics::increment_watch_closures("error");
                error!(error = %cause, "Secret watch closed: {}", cause);
            }
            None => {
                observability::metrics::increment_watch_closures("closed");
                debug!("Secret watch closed");
            }
        }
    }
}
