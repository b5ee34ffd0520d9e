//! Upstream DataMall client.
//!
//! One pooled `reqwest` client performs the single outbound GET to the
//! TrafficSpeedBands endpoint with the `AccountKey` credential attached.
//! Failures are classified into [`UpstreamError`] variants so the caller's
//! log line names the failure class.
//!
//! No automatic retry: a degraded response is served from the fallback
//! payload instead, and DataMall meters requests per account key.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, header};
use tracing::{debug, error, warn};

use crate::error::UpstreamError;

/// Production TrafficSpeedBands endpoint.
pub const DEFAULT_ENDPOINT: &str =
    "https://datamall2.mytransport.sg/ltaodataservice/TrafficSpeedBands";

/// Configuration for the upstream client.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Full URL of the TrafficSpeedBands endpoint
    pub endpoint: String,
    /// Request timeout (includes connection + response)
    pub timeout: Duration,
    /// Connection timeout (TCP + TLS handshake)
    pub connect_timeout: Duration,
    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,
    /// Idle connection timeout
    pub pool_idle_timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            pool_max_idle_per_host: 8,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl UpstreamConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// # Environment Variables
    ///
    /// - `BANDGATE_UPSTREAM` (default: production DataMall endpoint)
    /// - `BANDGATE_REQUEST_TIMEOUT_SECS` (default: 30)
    /// - `BANDGATE_UPSTREAM_CONNECT_TIMEOUT_SECS` (default: 5)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            endpoint: std::env::var("BANDGATE_UPSTREAM")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(default.endpoint),

            timeout: std::env::var("BANDGATE_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.timeout),

            connect_timeout: std::env::var("BANDGATE_UPSTREAM_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.connect_timeout),

            pool_max_idle_per_host: default.pool_max_idle_per_host,
            pool_idle_timeout: default.pool_idle_timeout,
        }
    }

    /// Create a new config with the specified endpoint.
    ///
    /// Uses default values for all other settings.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }
}

/// Source of the raw TrafficSpeedBands body (enables stubbing in tests).
#[async_trait::async_trait]
pub trait TrafficSource: Send + Sync {
    /// Fetch the current speed band payload with the given account key.
    async fn fetch(&self, account_key: &str) -> Result<Bytes, UpstreamError>;
}

/// Upstream DataMall client.
///
/// # Thread Safety
///
/// The client is `Clone` and can be shared across tasks. The underlying
/// reqwest client handles connection pooling internally.
#[derive(Clone)]
pub struct SpeedBandClient {
    client: Client,
    config: UpstreamConfig,
}

impl SpeedBandClient {
    /// Create a new upstream client.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Client`] if the client cannot be built.
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| UpstreamError::Client {
                reason: e.to_string(),
            })?;

        Ok(Self { client, config })
    }

    /// Perform the single GET against the TrafficSpeedBands endpoint.
    ///
    /// A 2xx body is checked for JSON well-formedness and returned as the
    /// original bytes - the payload is relayed verbatim, never
    /// re-serialized.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::Status`] - upstream answered non-2xx
    /// - [`UpstreamError::Timeout`] - request timed out
    /// - [`UpstreamError::Connection`] - failed to connect
    /// - [`UpstreamError::Parse`] - 2xx body is not valid JSON
    pub async fn fetch(&self, account_key: &str) -> Result<Bytes, UpstreamError> {
        debug!(endpoint = %self.config.endpoint, "Fetching speed bands from upstream");

        let response = self
            .client
            .get(&self.config.endpoint)
            .header("AccountKey", account_key)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Upstream returned error status");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.classify_error(e))?;

        if let Err(e) = serde_json::from_slice::<serde_json::Value>(&body) {
            error!(error = %e, "Upstream body is not valid JSON");
            return Err(UpstreamError::Parse {
                details: e.to_string(),
            });
        }

        debug!(bytes = body.len(), "Received upstream speed bands");
        Ok(body)
    }

    /// Classify a reqwest error into an [`UpstreamError`].
    fn classify_error(&self, error: reqwest::Error) -> UpstreamError {
        if error.is_timeout() {
            warn!(
                timeout_secs = self.config.timeout.as_secs(),
                "Upstream request timed out"
            );
            UpstreamError::Timeout {
                url: self.config.endpoint.clone(),
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else if error.is_connect() {
            warn!(url = %self.config.endpoint, "Failed to connect to upstream");
            UpstreamError::Connection {
                url: self.config.endpoint.clone(),
                reason: error.to_string(),
            }
        } else {
            error!(error = %error, "Upstream request failed");
            UpstreamError::Request {
                reason: error.to_string(),
            }
        }
    }
}

#[async_trait::async_trait]
impl TrafficSource for SpeedBandClient {
    async fn fetch(&self, account_key: &str) -> Result<Bytes, UpstreamError> {
        self.fetch(account_key).await
    }
}
