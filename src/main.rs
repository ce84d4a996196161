//! HTTP server for the yard billing engine.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use yard_billing::api::{AppState, create_router};
use yard_billing::config::ConfigLoader;

const DEFAULT_CONFIG_DIR: &str = "./config/yard";
const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_LOG_FILTER: &str = "info";

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run().await {
        error!(error = %err, "Server exited with an error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir =
        std::env::var("YARD_BILLING_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let addr: SocketAddr = std::env::var("YARD_BILLING_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;

    let config = ConfigLoader::load(&config_dir)?;
    info!(
        yard = %config.yard().code,
        config_dir = %config_dir,
        rate_files = config.config().tax_rates().len(),
        "Configuration loaded"
    );

    let app = create_router(AppState::new(config));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
    }
}
