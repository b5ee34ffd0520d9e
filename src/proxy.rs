//! Traffic proxy handler: outcome classification and HTTP mapping.
//!
//! Classification is computed first, as an explicit [`TrafficOutcome`],
//! and only then mapped to an HTTP response. This keeps the
//! availability-over-correctness decision (mask every upstream failure
//! behind a 200 fallback) in one adapter function instead of a catch-all.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Response, StatusCode, header};
use bytes::Bytes;
use serde_json::json;
use tracing::error;

use crate::error::UpstreamError;
use crate::fallback;
use crate::server::AppState;
use crate::upstream::TrafficSource;

/// Error message returned when the account key is not configured.
pub const MISSING_KEY_MESSAGE: &str = "Missing LTA_ACCOUNT_KEY in environment variables";

/// Terminal outcome of one proxy invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum TrafficOutcome {
    /// No account key configured. Surfaced to the caller as a 500; no
    /// fallback data is substituted for this case.
    MissingCredential,

    /// Upstream answered with a well-formed JSON body, relayed verbatim.
    Live(Bytes),

    /// The upstream call failed; the fixed fallback payload is served
    /// with status 200 and the failure is only visible in the log.
    Fallback(UpstreamError),
}

/// Classify one invocation.
///
/// The credential check comes first and short-circuits: a missing key is a
/// configuration failure, not an upstream failure, and must not degrade
/// into the fallback payload.
pub async fn resolve(account_key: Option<&str>, source: &dyn TrafficSource) -> TrafficOutcome {
    let Some(key) = account_key else {
        return TrafficOutcome::MissingCredential;
    };

    match source.fetch(key).await {
        Ok(body) => TrafficOutcome::Live(body),
        Err(err) => TrafficOutcome::Fallback(err),
    }
}

/// Map an outcome to the caller-facing HTTP response.
///
/// Every branch carries `Access-Control-Allow-Origin: *` - the service
/// fronts browser clients on other origins.
pub fn into_response(outcome: TrafficOutcome) -> Response<Body> {
    match outcome {
        TrafficOutcome::MissingCredential => json_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            Bytes::from(json!({ "error": MISSING_KEY_MESSAGE }).to_string()),
        ),
        TrafficOutcome::Live(body) => json_response(StatusCode::OK, body),
        TrafficOutcome::Fallback(err) => {
            error!(error = %err, "Error fetching traffic data, serving fallback payload");
            json_response(StatusCode::OK, fallback::body())
        }
    }
}

/// Axum handler for the traffic endpoint. The inbound request carries no
/// parameters; it only triggers the invocation.
pub async fn traffic_handler(State(state): State<AppState>) -> Response<Body> {
    let outcome = resolve(state.account_key.as_deref(), state.source.as_ref()).await;
    into_response(outcome)
}

fn json_response(status: StatusCode, body: Bytes) -> Response<Body> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .body(Body::from(body))
        .unwrap_or_else(|_| {
            let mut resp = Response::new(Body::from("500 Internal Server Error"));
            *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            resp
        })
}
