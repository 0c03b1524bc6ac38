//! # Initialization
//!
//! Bridge initialization: rustls setup, tracing, metrics, probe server startup
//! and secrets consumer startup.

use crate::config::{BridgeConfig, ServerConfig};
use crate::constants;
use crate::consumer::SecretsConsumer;
use crate::observability;
use crate::processor::{LoggingProcessor, Processor};
use crate::server::{start_server, ServerState};
use crate::watch::KubeSecretSource;
use anyhow::{Context, Result};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Initialization result containing all necessary components for the bridge
#[derive(Debug)]
pub struct InitializationResult {
    /// Started secrets consumer
    pub consumer: Arc<SecretsConsumer<KubeSecretSource>>,
    /// Server state for health checks
    pub server_state: Arc<ServerState>,
}

/// Initialize the bridge runtime
///
/// This function handles:
/// - Tracing subscriber setup
/// - rustls crypto provider setup
/// - Metrics registration
/// - HTTP server startup
/// - Secrets consumer creation and start
///
/// # Errors
///
/// Returns an error if any of the steps above fails.
pub async fn initialize(config: &BridgeConfig) -> Result<InitializationResult> {
    init_tracing();

    // Configure rustls crypto provider before any Kubernetes client is created
    // Required for rustls 0.23+ when no default provider is set via features
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider already installed, keeping the existing one");
    }

    info!("Starting Secret Watch Bridge");
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );
    info!(?config, "Loaded configuration");

    observability::metrics::register_metrics()?;

    let server_state = Arc::new(ServerState::default());

    // Start HTTP server for metrics and probes
    let server_handle = {
        let state = Arc::clone(&server_state);
        let port = config.server.metrics_port;
        tokio::spawn(async move {
            if let Err(e) = start_server(port, state).await {
                error!("HTTP server error: {}", e);
            }
        })
    };
    wait_for_server_ready(&config.server, &server_state, &server_handle).await?;

    let source = KubeSecretSource::from_config(&config.kubernetes);
    let processor: Arc<dyn Processor> = Arc::new(LoggingProcessor);
    let consumer = Arc::new(SecretsConsumer::new(
        config.kubernetes.clone(),
        source,
        processor,
    ));

    consumer
        .start()
        .await
        .context("Failed to start secrets consumer")?;
    server_state.consumer_started.store(true, Ordering::Release);

    info!("Bridge initialized, starting poll loop...");

    Ok(InitializationResult {
        consumer,
        server_state,
    })
}

/// Install the fmt subscriber with an `EnvFilter`
fn init_tracing() {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| constants::DEFAULT_LOG_FILTER.into()),
        )
        .try_init()
    {
        // Already installed, e.g. by an embedding application
        warn!("Tracing subscriber init returned error (may already be initialized): {e}");
    }
}

/// Wait for the HTTP server to become ready
async fn wait_for_server_ready(
    server_config: &ServerConfig,
    server_state: &Arc<ServerState>,
    server_handle: &tokio::task::JoinHandle<()>,
) -> Result<()> {
    let startup_timeout = std::time::Duration::from_secs(server_config.startup_timeout_secs);
    let poll_interval = std::time::Duration::from_millis(server_config.poll_interval_ms);
    let start_time = std::time::Instant::now();

    loop {
        // Check if server task crashed
        if server_handle.is_finished() {
            return Err(anyhow::anyhow!("HTTP server failed to start"));
        }

        if server_state.is_ready.load(Ordering::Acquire) {
            info!("HTTP server is ready and accepting connections");
            break;
        }

        if start_time.elapsed() > startup_timeout {
            return Err(anyhow::anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }

        tokio::time::sleep(poll_interval).await;
    }

    Ok(())
}
