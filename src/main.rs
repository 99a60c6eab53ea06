//! guild-host development server.
//!
//! Runs one shard against the in-memory transport and serves the admin
//! API, so inbound events can be injected through `POST /api/v1/events`.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use guild_host::api;
use guild_host::app_state::AppState;
use guild_host::command::CommandCatalog;
use guild_host::config::HostServiceConfig;
use guild_host::persistence::DocumentStore;
use guild_host::shard::Shard;
use guild_host::transport::InMemoryTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = HostServiceConfig::from_env()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("loading configuration")?;
    tracing::info!(
        addr = %config.listen_addr,
        hosts_root = %config.hosts_root.display(),
        shard_id = %config.shard_id,
        "starting guild-host"
    );

    let shard = Shard::new(
        config.shard_id,
        Arc::new(InMemoryTransport::new()),
        DocumentStore::new(config.hosts_root.clone()),
        CommandCatalog::new(),
        config.host_settings(),
        config.host_queue_capacity,
    );

    let app = api::build_app(AppState {
        shard: Arc::clone(&shard),
    });

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for (tenant_id, err) in shard.save_all().await {
        tracing::error!(%tenant_id, error = %err, "config not saved on shutdown");
    }
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "ctrl-c handler unavailable");
    }
}
