//! Error types for the upstream DataMall call.

use thiserror::Error;

/// Failures of the outbound speed band fetch.
///
/// Every variant is absorbed by the fallback branch of the proxy handler;
/// the variants exist so the log line on that branch names the actual
/// failure class instead of a generic "fetch failed".
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UpstreamError {
    /// Upstream answered with a non-2xx status.
    #[error("upstream error, status {status} {reason}")]
    Status {
        /// The HTTP status code from upstream
        status: u16,
        /// Canonical reason phrase for the status
        reason: String,
    },

    /// Could not connect to the upstream endpoint.
    #[error("cannot connect to {url}: {reason}")]
    Connection {
        /// The upstream URL that failed
        url: String,
        /// Reason for the connection failure
        reason: String,
    },

    /// Upstream did not respond in time.
    #[error("upstream {url} did not respond within {timeout_secs}s")]
    Timeout {
        /// The upstream URL that timed out
        url: String,
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// Any other request failure reported by the HTTP client.
    #[error("upstream request failed: {reason}")]
    Request {
        /// Description of the failure
        reason: String,
    },

    /// Upstream answered 2xx but the body is not valid JSON.
    #[error("upstream body is not valid JSON: {details}")]
    Parse {
        /// Description of the parse error
        details: String,
    },

    /// The HTTP client itself could not be built.
    #[error("failed to build upstream client: {reason}")]
    Client {
        /// Description of the build failure
        reason: String,
    },
}

/// Result type alias for upstream operations.
pub type UpstreamResult<T> = Result<T, UpstreamError>;
