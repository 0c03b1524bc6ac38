//! # Command-Line Flags
//!
//! Flags for the `secret-watch-bridge` binary. Every flag is optional and, when
//! given, overrides the value loaded from the environment. The OAuth token is
//! only read from the environment so it never shows up in process listings.
//!
//! ## Usage
//!
//! ```bash
//! # Watch one namespace, poll every 250ms
//! KUBERNETES_OAUTH_TOKEN=... secret-watch-bridge --namespace payments --poll-delay-ms 250
//!
//! # Watch all namespaces against an explicit API server
//! KUBERNETES_OAUTH_TOKEN=... secret-watch-bridge --master-url https://10.0.0.1:6443
//! ```

use crate::config::BridgeConfig;
use clap::Parser;

/// Secret Watch Bridge
#[derive(Debug, Parser)]
#[command(name = "secret-watch-bridge")]
#[command(
    about = "Buffers Kubernetes Secret watch notifications and drains them on a fixed delay",
    long_about = None
)]
pub struct Cli {
    /// Namespace to watch (defaults to all namespaces)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Kubernetes API server URL (defaults to kubeconfig / in-cluster config)
    #[arg(long)]
    pub master_url: Option<String>,

    /// Delay before the first poll in milliseconds
    #[arg(long)]
    pub initial_delay_ms: Option<u64>,

    /// Delay between polls in milliseconds
    #[arg(long)]
    pub poll_delay_ms: Option<u64>,

    /// Number of polls to skip once a backoff threshold is reached (0 disables backoff)
    #[arg(long)]
    pub backoff_multiplier: Option<u32>,

    /// Port for the metrics and probe server
    #[arg(long)]
    pub metrics_port: Option<u16>,
}

impl Cli {
    /// Apply the flags given on the command line on top of `config`
    pub fn apply(self, config: &mut BridgeConfig) {
        if let Some(namespace) = self.namespace {
            config.kubernetes.namespace = Some(namespace).filter(|ns| !ns.trim().is_empty());
        }
        if let Some(master_url) = self.master_url {
            config.kubernetes.master_url = Some(master_url);
        }
        if let Some(initial_delay_ms) = self.initial_delay_ms {
            config.poll.initial_delay_ms = initial_delay_ms;
        }
        if let Some(delay_ms) = self.poll_delay_ms {
            config.poll.delay_ms = delay_ms;
        }
        if let Some(multiplier) = self.backoff_multiplier {
            config.poll.backoff_multiplier = multiplier;
        }
        if let Some(port) = self.metrics_port {
            config.server.metrics_port = port;
        }
    }
}
