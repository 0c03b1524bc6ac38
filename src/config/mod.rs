//! # Bridge Configuration
//!
//! Configuration loaded from environment variables (typically populated from a
//! ConfigMap or Secret via `envFrom` in the deployment).
//!
//! All settings have sensible defaults and can be overridden via environment
//! variables; the binary additionally lets command-line flags take precedence.

mod kubernetes;
mod poll;
mod server;

pub use kubernetes::KubernetesConfig;
pub use poll::PollConfig;
pub use server::ServerConfig;

/// Complete bridge configuration
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    pub kubernetes: KubernetesConfig,
    pub poll: PollConfig,
    pub server: ServerConfig,
}

impl BridgeConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            kubernetes: KubernetesConfig::from_lookup(&lookup),
            poll: PollConfig::from_lookup(&lookup),
            server: ServerConfig::from_lookup(&lookup),
        }
    }
}

/// Read a value or return the default when it is missing or does not parse
pub(crate) fn var_or_default<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read an optional string, treating blank values as unset
pub(crate) fn non_empty_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
