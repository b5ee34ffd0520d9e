//! HTTP server surface: router, shared state, and lifecycle.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::logging;
use crate::proxy;
use crate::upstream::TrafficSource;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on (default: 8787)
    pub port: u16,
    /// Bind address (default: 127.0.0.1)
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8787,
            bind_addr: "127.0.0.1".to_string(),
        }
    }
}

impl ServerConfig {
    /// Get the full bind address string.
    pub fn bind_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Shared state for the proxy endpoints.
///
/// The account key is resolved once at startup and injected here instead of
/// being read from the process environment per request, so tests can
/// exercise the missing-credential branch deterministically.
#[derive(Clone)]
pub struct AppState {
    /// DataMall credential; `None` makes the traffic endpoint answer 500.
    pub account_key: Option<String>,
    /// Source of the speed band payload.
    pub source: Arc<dyn TrafficSource>,
}

/// Build the application router.
///
/// # Endpoints
///
/// - `GET /traffic` - the proxy entry point
/// - `GET /health` - liveness probe (always 200 while the server runs)
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/traffic", get(proxy::traffic_handler))
        .route("/health", get(health_handler))
        .layer(logging::trace_layer())
        .with_state(state)
}

/// Run the server until the shutdown token is cancelled.
///
/// # Errors
///
/// Returns an error if the listener fails to bind or the server fails
/// while serving.
pub async fn run(
    config: ServerConfig,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let bind_addr = config.bind_string();
    let listener = TcpListener::bind(&bind_addr).await?;

    info!(addr = %bind_addr, "BandGate listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            info!("Server shutting down");
        })
        .await?;

    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
