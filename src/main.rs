//! Signed-URL verifying reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::request   (url / client header / botId / signed)
//!                         │
//!                         ▼
//!                     security::signature  (Ed25519 over botId || url)
//!                         │
//!                         ▼
//!                     upstream::fetcher    (GET target, forward client header)
//!                         │
//!                         ▼
//!                     stylesheet::inliner  (text/css only: data: URIs)
//!                         │
//!     Client Response     ▼
//!     ◀────────────── http::response  (relay + CSP / nosniff)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use signed_proxy::config::load_config;
use signed_proxy::observability::{logging, metrics};
use signed_proxy::{HttpServer, Shutdown, TrustedKey};

#[derive(Parser)]
#[command(name = "signed-proxy")]
#[command(about = "Signed-URL verifying reverse proxy with stylesheet inlining", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration (file optional, PUBLIC_KEY from the environment)
    let config = load_config(cli.config.as_deref())?;
    logging::init(&config.observability);

    tracing::info!("signed-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        origin = ?config.listener.origin,
        require_client_header = config.client_header.required,
        inlining = config.inliner.enabled,
        max_depth = config.inliner.max_depth,
        "Configuration loaded"
    );

    let public_key = config
        .trusted_key
        .public_key
        .as_deref()
        .ok_or("trusted key missing")?;
    let trusted_key = TrustedKey::from_spki_base64(public_key)?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, trusted_key)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
