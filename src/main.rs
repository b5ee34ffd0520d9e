//! BandGate - HTTP proxy for the LTA DataMall TrafficSpeedBands API.
//!
//! Binds a single-route HTTP server, attaches the `AccountKey` credential
//! to the one outbound GET per invocation, and relays the upstream JSON
//! verbatim - or a fixed fallback payload when the upstream fails.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use bandgate::config::ProxyConfig;
use bandgate::server::{self, AppState, ServerConfig};
use bandgate::upstream::{SpeedBandClient, UpstreamConfig};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Configuration for the BandGate server.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on (default: 8787, or BANDGATE_PORT env var)
    #[arg(short, long, env = "BANDGATE_PORT", default_value = "8787")]
    port: u16,

    /// Bind address (default: 127.0.0.1)
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let proxy_config = ProxyConfig::from_env();
    let upstream_config = UpstreamConfig::from_env();

    if proxy_config.account_key.is_none() {
        warn!("LTA_ACCOUNT_KEY is not set; the traffic endpoint will answer 500 until it is provided");
    }

    let client = SpeedBandClient::new(upstream_config.clone())?;
    let state = AppState {
        account_key: proxy_config.account_key,
        source: Arc::new(client),
    };

    info!(
        port = cli.port,
        bind = %cli.bind,
        endpoint = %upstream_config.endpoint,
        timeout_secs = upstream_config.timeout.as_secs(),
        "BandGate starting"
    );

    let shutdown = CancellationToken::new();

    let sigint_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
                sigint_token.cancel();
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGINT");
            }
        }
    });

    #[cfg(unix)]
    {
        let sigterm_token = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                    info!("Received SIGTERM, initiating graceful shutdown");
                    sigterm_token.cancel();
                }
                Err(e) => {
                    error!(error = %e, "Failed to listen for SIGTERM");
                }
            }
        });
    }

    server::run(
        ServerConfig {
            port: cli.port,
            bind_addr: cli.bind,
        },
        state,
        shutdown,
    )
    .await?;

    Ok(())
}
