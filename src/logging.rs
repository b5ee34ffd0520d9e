//! Tower layer for structured request/response logging.
//!
//! Uses `tower_http::trace::TraceLayer` with custom callbacks. The
//! `AccountKey` credential header is redacted from debug-level header
//! dumps.

use std::fmt;

use http::HeaderMap;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Headers that are redacted from logs.
const SENSITIVE_HEADERS: &[&str] = &["accountkey", "authorization", "cookie", "x-api-key"];

/// Create the logging/tracing layer.
pub fn trace_layer() -> TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
    RequestMakeSpan,
    OnRequestLogger,
    OnResponseLogger,
    tower_http::trace::DefaultOnBodyChunk,
    tower_http::trace::DefaultOnEos,
    OnFailureLogger,
> {
    TraceLayer::new_for_http()
        .make_span_with(RequestMakeSpan)
        .on_request(OnRequestLogger)
        .on_response(OnResponseLogger)
        .on_failure(OnFailureLogger)
}

/// Span creator carrying method and path for every request.
#[derive(Clone, Debug)]
pub struct RequestMakeSpan;

impl<B> tower_http::trace::MakeSpan<B> for RequestMakeSpan {
    fn make_span(&mut self, request: &http::Request<B>) -> tracing::Span {
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
        )
    }
}

/// On-request callback logging the inbound invocation.
#[derive(Clone, Debug)]
pub struct OnRequestLogger;

impl<B> tower_http::trace::OnRequest<B> for OnRequestLogger {
    fn on_request(&mut self, request: &http::Request<B>, _span: &tracing::Span) {
        info!(
            method = %request.method(),
            uri = %request.uri(),
            direction = "inbound",
            "Request received"
        );

        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(
                headers = ?sanitize_headers(request.headers()),
                "Request details"
            );
        }
    }
}

/// On-response callback logging status and latency.
#[derive(Clone, Debug)]
pub struct OnResponseLogger;

impl<B> tower_http::trace::OnResponse<B> for OnResponseLogger {
    fn on_response(
        self,
        response: &http::Response<B>,
        latency: std::time::Duration,
        _span: &tracing::Span,
    ) {
        info!(
            status = %response.status().as_u16(),
            latency_ms = latency.as_millis(),
            direction = "outbound",
            "Response sent"
        );
    }
}

/// On-failure callback for service-level errors.
#[derive(Clone, Debug)]
pub struct OnFailureLogger;

impl tower_http::trace::OnFailure<tower_http::classify::ServerErrorsFailureClass>
    for OnFailureLogger
{
    fn on_failure(
        &mut self,
        failure: tower_http::classify::ServerErrorsFailureClass,
        latency: std::time::Duration,
        _span: &tracing::Span,
    ) {
        warn!(
            classification = %failure,
            latency_ms = latency.as_millis(),
            direction = "error",
            "Request failed"
        );
    }
}

/// Zero-allocation wrapper for sanitized headers.
struct SanitizedHeaders<'a>(&'a HeaderMap);

impl<'a> fmt::Debug for SanitizedHeaders<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();

        for (name, value) in self.0.iter() {
            let name_str = name.as_str();

            // Header names are case-insensitive (RFC 7230 Section 3.2).
            let is_sensitive = SENSITIVE_HEADERS
                .iter()
                .any(|&sensitive| name_str.eq_ignore_ascii_case(sensitive));

            if is_sensitive {
                map.entry(&name_str, &"[REDACTED]");
            } else {
                match value.to_str() {
                    Ok(val_str) => {
                        map.entry(&name_str, &val_str);
                    }
                    Err(_) => {
                        map.entry(&name_str, &format!("<binary: {} bytes>", value.len()));
                    }
                }
            }
        }

        map.finish()
    }
}

#[inline]
fn sanitize_headers(headers: &HeaderMap) -> SanitizedHeaders<'_> {
    SanitizedHeaders(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_credential_header_is_redacted() {
        let mut headers = HeaderMap::new();
        headers.insert("AccountKey", HeaderValue::from_static("secret-credential"));
        headers.insert("accept", HeaderValue::from_static("application/json"));

        let rendered = format!("{:?}", sanitize_headers(&headers));
        assert!(!rendered.contains("secret-credential"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(rendered.contains("application/json"));
    }

    #[test]
    fn test_binary_header_values_do_not_panic() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-raw",
            HeaderValue::from_bytes(&[0xfe, 0xff]).expect("opaque value"),
        );

        let rendered = format!("{:?}", sanitize_headers(&headers));
        assert!(rendered.contains("binary"));
    }
}
