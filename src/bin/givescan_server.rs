//! HTTP server binary for the organization scan.
//!
//! Configuration comes from the environment (a `.env` file in the working
//! directory is honoured). Logs go to stderr, filtered by `RUST_LOG`.

use givescan::{ScanServer, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("givescan-server starting");

    let config = ServerConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
        anyhow::anyhow!("givescan-server config: {e}")
    })?;
    let server = ScanServer::start(config).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    server.shutdown().await;

    tracing::info!("givescan-server shut down cleanly");
    Ok(())
}
