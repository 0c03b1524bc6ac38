//! # Kubernetes Configuration
//!
//! Connection and scope settings for the Secret watch.

use super::non_empty_var;
use crate::watch::WatchScope;

/// Kubernetes connection settings
#[derive(Clone, Default)]
pub struct KubernetesConfig {
    /// Bearer token used to authenticate; watching is disabled without it
    pub oauth_token: Option<String>,
    /// Namespace to watch; `None` watches all namespaces
    pub namespace: Option<String>,
    /// API server URL; inferred from kubeconfig or the in-cluster environment when unset
    pub master_url: Option<String>,
}

impl std::fmt::Debug for KubernetesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubernetesConfig")
            .field("oauth_token", &self.oauth_token.as_ref().map(|_| "<redacted>"))
            .field("namespace", &self.namespace)
            .field("master_url", &self.master_url)
            .finish()
    }
}

impl KubernetesConfig {
    pub(crate) fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        Self {
            oauth_token: non_empty_var(lookup, "KUBERNETES_OAUTH_TOKEN"),
            namespace: non_empty_var(lookup, "KUBERNETES_NAMESPACE"),
            master_url: non_empty_var(lookup, "KUBERNETES_MASTER_URL"),
        }
    }

    /// Whether a credential is configured
    pub fn has_credential(&self) -> bool {
        self.oauth_token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty())
    }

    /// Scope of the watch derived from the configured namespace
    pub fn scope(&self) -> WatchScope {
        WatchScope::from_namespace(self.namespace.as_deref())
    }
}
