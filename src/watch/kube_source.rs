//! # kube-rs Secret Watch Binding
//!
//! Drives a raw Kubernetes watch on `Secret` resources and translates the
//! notifications into [`WatchHandler`] calls.
//!
//! The raw watch API is used instead of `kube_runtime::watcher` because the
//! listener needs the distinct ADDED/MODIFIED/DELETED actions, which the
//! runtime watcher folds into a single `Apply` event.
//!
//! When the API server ends a watch normally (server-side timeout) the binding
//! resumes from the last resource version it saw. A `410 Gone` status or a
//! transport failure ends the subscription with `on_close(Some(..))`; there is
//! no retry. Any other error status is delivered as an `ERROR` event carrying
//! an empty Secret and the watch keeps streaming.

use super::{SecretWatchSource, WatchHandler, WatchScope, WatchSubscription};
use crate::config::KubernetesConfig;
use crate::error::{ConsumerError, WatchError};
use crate::event::SecretAction;
use async_trait::async_trait;
use futures::{pin_mut, StreamExt};
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, WatchEvent, WatchParams};
use kube::Client;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Resource version that asks the API server to replay current state as ADDED events
const INITIAL_RESOURCE_VERSION: &str = "0";

/// Secret watch source backed by a kube-rs [`Client`]
///
/// The client is created lazily on the first `watch` call so that an idle
/// bridge (no credential configured) never touches the cluster.
#[derive(Clone)]
pub struct KubeSecretSource {
    master_url: Option<String>,
    oauth_token: Option<String>,
    client: Option<Client>,
}

impl std::fmt::Debug for KubeSecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeSecretSource")
            .field("master_url", &self.master_url)
            .field("oauth_token", &self.oauth_token.as_ref().map(|_| "<redacted>"))
            .field("client", &self.client.is_some())
            .finish()
    }
}

impl KubeSecretSource {
    /// Source that builds its client from the bridge configuration
    pub fn from_config(config: &KubernetesConfig) -> Self {
        Self {
            master_url: config.master_url.clone(),
            oauth_token: config.oauth_token.clone(),
            client: None,
        }
    }

    /// Source reusing an existing client
    pub fn with_client(client: Client) -> Self {
        Self {
            master_url: None,
            oauth_token: None,
            client: Some(client),
        }
    }

    async fn client(&self) -> Result<Client, ConsumerError> {
        if let Some(ref client) = self.client {
            return Ok(client.clone());
        }

        let mut config = match self.master_url.as_deref() {
            Some(url) => kube::Config::new(url.parse().map_err(|e| {
                ConsumerError::ClientConfig(format!("invalid master URL '{url}': {e}"))
            })?),
            None => kube::Config::infer()
                .await
                .map_err(|e| ConsumerError::ClientConfig(e.to_string()))?,
        };

        if let Some(ref token) = self.oauth_token {
            config.auth_info.token = Some(token.clone().into());
        }

        Ok(Client::try_from(config)?)
    }
}

#[async_trait]
impl SecretWatchSource for KubeSecretSource {
    async fn watch(
        &self,
        scope: WatchScope,
        handler: Arc<dyn WatchHandler>,
    ) -> anyhow::Result<WatchSubscription> {
        let client = self.client().await?;
        let secrets: Api<Secret> = match scope {
            WatchScope::AllNamespaces => Api::all(client),
            WatchScope::Namespace(ref ns) => Api::namespaced(client, ns),
        };

        info!("Starting Secret watch in {}", scope);

        // Whichever side ends the subscription first reports the close
        let closed = Arc::new(AtomicBool::new(false));
        let task_handler = Arc::clone(&handler);
        let task_closed = Arc::clone(&closed);
        let task = tokio::spawn(async move {
            let cause = run_watch(secrets, task_handler.as_ref()).await;
            if !task_closed.swap(true, Ordering::AcqRel) {
                task_handler.on_close(Some(&cause));
            }
        });
        let abort = task.abort_handle();

        Ok(WatchSubscription::new(move || {
            if !closed.swap(true, Ordering::AcqRel) {
                abort.abort();
                handler.on_close(None);
            }
        }))
    }
}

/// Run the watch until it expires or the transport fails, returning the cause
async fn run_watch(secrets: Api<Secret>, handler: &dyn WatchHandler) -> WatchError {
    let params = WatchParams::default();
    let mut resource_version = INITIAL_RESOURCE_VERSION.to_string();

    loop {
        let stream = match secrets.watch(&params, &resource_version).await {
            Ok(stream) => stream,
            Err(e) => return WatchError::Transport(e),
        };
        pin_mut!(stream);

        while let Some(item) = stream.next().await {
            let flow = match item {
                Ok(event) => dispatch_event(event, handler, &mut resource_version),
                Err(e) => ControlFlow::Break(WatchError::Transport(e)),
            };
            if let ControlFlow::Break(cause) = flow {
                return cause;
            }
        }

        debug!(
            resource_version = %resource_version,
            "Secret watch ended by API server, resuming"
        );
    }
}

/// Translate one watch notification into a handler call
///
/// Keeps `resource_version` at the newest version seen so the watch can resume.
/// Returns `Break` with the cause when the notification ends the watch, which
/// only a `410 Gone` status does.
pub fn dispatch_event(
    event: WatchEvent<Secret>,
    handler: &dyn WatchHandler,
    resource_version: &mut String,
) -> ControlFlow<WatchError> {
    let (action, secret) = match event {
        WatchEvent::Added(secret) => (SecretAction::Added, secret),
        WatchEvent::Modified(secret) => (SecretAction::Modified, secret),
        WatchEvent::Deleted(secret) => (SecretAction::Deleted, secret),
        WatchEvent::Bookmark(bookmark) => {
            resource_version.clone_from(&bookmark.metadata.resource_version);
            return ControlFlow::Continue(());
        }
        WatchEvent::Error(status) => {
            let cause = WatchError::Status {
                code: status.code,
                reason: status.reason,
                message: status.message,
            };
            if cause.is_gone() {
                warn!("Secret watch resource version {} expired", resource_version);
                return ControlFlow::Break(cause);
            }
            // Other statuses are reported as events and the watch stays open
            warn!(error = %cause, "Secret watch reported an error status");
            handler.on_event(SecretAction::Error, Secret::default());
            return ControlFlow::Continue(());
        }
    };

    if let Some(ref version) = secret.metadata.resource_version {
        resource_version.clone_from(version);
    }
    handler.on_event(action, secret);
    ControlFlow::Continue(())
}
