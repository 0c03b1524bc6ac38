//! # Secret Watch Bridge
//!
//! Watches Kubernetes Secrets and drains the buffered notifications into the
//! processing pipeline on a fixed delay.
//!
//! Configuration comes from environment variables (see `config`) with optional
//! command-line overrides. Watching only starts when `KUBERNETES_OAUTH_TOKEN` is
//! set; otherwise the bridge runs idle.

use anyhow::Result;
use clap::Parser;
use secret_watch_bridge::cli::Cli;
use secret_watch_bridge::config::BridgeConfig;
use secret_watch_bridge::runtime::{initialize, run_poll_loop};
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = BridgeConfig::from_env();
    Cli::parse().apply(&mut config);

    let init_result = initialize(&config).await?;
    let consumer = init_result.consumer;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poll_consumer = std::sync::Arc::clone(&consumer);
    let poll_config = config.poll.clone();
    let poll_loop = tokio::spawn(async move {
        run_poll_loop(poll_consumer.as_ref(), &poll_config, shutdown_rx).await;
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);
    if let Err(e) = poll_loop.await {
        error!("Poll loop task failed: {}", e);
    }

    init_result
        .server_state
        .consumer_started
        .store(false, std::sync::atomic::Ordering::Release);
    consumer.stop().await;

    Ok(())
}
