//! StackFund payment link server.

use anyhow::{Context, Result};
use clap::Parser;
use stackfund_server::{router, AppState, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();

    let default_filter = if config.verbose {
        "stackfund_server=debug,stackfund_lib=debug"
    } else {
        "stackfund_server=info,stackfund_lib=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let service_config = config.load_service_config()?;
    let store = config.open_store()?;
    info!(
        storage = ?config.storage,
        data_dir = %config.data_dir().display(),
        max_id_attempts = service_config.max_id_attempts,
        "store ready"
    );

    let app = router(AppState::new(store, service_config));
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(addr = %config.bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
