// BlackBook Escrow - Main Entry Point
// Boots the genesis deployment and serves the escrow API

use blackbook_escrow::{build_router, AppConfig, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    let addr = config.bind_addr;
    info!(token = %config.token_symbol, stake = config.stake_amount, "starting BlackBook escrow");

    let state = AppState::new(config)?.shared();
    {
        let app = state.lock().map_err(|_| "state lock poisoned")?;
        for (name, address) in app.ledger.named_accounts() {
            info!(name = %name, address = %address, "account");
        }
    }

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install CTRL+C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
