// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use ethers::utils::to_checksum;
use liquidai_server::{
    agents::AgentRegistry,
    api,
    blockchain::{account_key::AccountKey, connector::ChainConnector, send_queue::SendQueue},
    config::Config,
    AppState,
};
use secrecy::ExposeSecret;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// --- HTTP Server Logic ---
async fn run_http_server(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("LiquidAI API listening on {}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "liquidai_server=debug,liquidai=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {:#}", e);
        e
    })?;

    // An unusable key is fatal at startup.
    let account = AccountKey::load(config.private_key.expose_secret()).map_err(|e| {
        error!("Failed to load signing key: {}", e);
        e
    })?;
    drop(config.private_key);
    info!(
        account = %to_checksum(&account.address(), None),
        network = %config.network_name,
        "Signing key loaded"
    );

    let connector = ChainConnector::connect(&config.rpc_url).await.map_err(|e| {
        error!("Failed to connect to RPC node: {}", e);
        e
    })?;

    if config.payments_enabled {
        warn!("Payments endpoint is enabled; POST /payments spends from the service account");
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    let state = AppState {
        network_name: Arc::from(config.network_name.as_str()),
        rpc_timeout: config.rpc_timeout,
        payments_enabled: config.payments_enabled,
        connector,
        account: Arc::new(account),
        send_queue: SendQueue::new(),
        agents: AgentRegistry::new(),
    };

    run_http_server(addr, state).await?;

    info!("LiquidAI API shut down");
    Ok(())
}
