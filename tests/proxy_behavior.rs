//! End-to-end behavior of the traffic proxy: real router, real upstream
//! client, mock DataMall.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use tower::ServiceExt;
use wiremock::matchers::{header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bandgate::server::{AppState, router};
use bandgate::upstream::{SpeedBandClient, UpstreamConfig};

const SPEED_BANDS_PATH: &str = "/ltaodataservice/TrafficSpeedBands";

/// Build the application router with a real client pointed at `endpoint`.
fn proxy_for(endpoint: String, account_key: Option<&str>) -> Router {
    let client = SpeedBandClient::new(UpstreamConfig::with_endpoint(endpoint))
        .expect("build upstream client");

    router(AppState {
        account_key: account_key.map(str::to_string),
        source: Arc::new(client),
    })
}

async fn invoke(router: Router) -> (StatusCode, http::HeaderMap, Bytes) {
    let request = Request::builder()
        .method("GET")
        .uri("/traffic")
        .body(Body::empty())
        .expect("build request");

    let response = router.oneshot(request).await.expect("route request");
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();

    (status, headers, body)
}

fn assert_cors(headers: &http::HeaderMap) {
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .expect("CORS header present"),
        "*"
    );
}

#[tokio::test]
async fn missing_credential_returns_500_with_exact_error_body() {
    // No upstream needed: the credential check short-circuits.
    let proxy = proxy_for("http://127.0.0.1:9/unreachable".to_string(), None);

    let (status, headers, body) = invoke(proxy).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&headers);
    assert_eq!(
        &body[..],
        br#"{"error":"Missing LTA_ACCOUNT_KEY in environment variables"}"#
    );
}

#[tokio::test]
async fn live_upstream_body_is_relayed_verbatim() {
    // Distinctive whitespace proves the body is not re-serialized.
    let raw = "{\"value\": [ {\"LinkID\":\"X\",\"RoadName\":\"Test Road\",\"StartLat\":1.0,\"StartLon\":103.0,\"EndLat\":1.1,\"EndLon\":103.1,\"SpeedBand\":2,\"MinimumSpeed\":11,\"MaximumSpeed\":20} ] }";

    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SPEED_BANDS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(raw))
        .mount(&mock)
        .await;

    let proxy = proxy_for(format!("{}{}", mock.uri(), SPEED_BANDS_PATH), Some("key"));
    let (status, headers, body) = invoke(proxy).await;

    assert_eq!(status, StatusCode::OK);
    assert_cors(&headers);
    assert_eq!(
        headers
            .get(header::CONTENT_TYPE)
            .expect("content type present"),
        "application/json"
    );
    assert_eq!(&body[..], raw.as_bytes());
}

#[tokio::test]
async fn credential_and_accept_headers_are_attached_upstream() {
    let mock = MockServer::start().await;
    // The mock only matches when both headers arrive; otherwise the proxy
    // would see a 404 and serve the fallback instead of the live body.
    Mock::given(method("GET"))
        .and(path(SPEED_BANDS_PATH))
        .and(header_matcher("AccountKey", "datamall-key"))
        .and(header_matcher("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"value":[]}"#))
        .expect(1)
        .mount(&mock)
        .await;

    let proxy = proxy_for(
        format!("{}{}", mock.uri(), SPEED_BANDS_PATH),
        Some("datamall-key"),
    );
    let (status, _headers, body) = invoke(proxy).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], br#"{"value":[]}"#);
}

#[tokio::test]
async fn upstream_error_status_serves_fallback_with_200() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock)
        .await;

    let proxy = proxy_for(format!("{}{}", mock.uri(), SPEED_BANDS_PATH), Some("key"));
    let (status, headers, body) = invoke(proxy).await;

    assert_eq!(status, StatusCode::OK);
    assert_cors(&headers);

    let parsed: serde_json::Value = serde_json::from_slice(&body).expect("fallback is JSON");
    let records = parsed["value"].as_array().expect("value array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["LinkID"], "MOCK1");
    assert_eq!(records[1]["LinkID"], "MOCK2");
}

#[tokio::test]
async fn unreachable_upstream_serves_fallback_with_200() {
    // Bind a port, then drop the listener so the connection is refused.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    let port = listener.local_addr().expect("probe addr").port();
    drop(listener);

    let proxy = proxy_for(format!("http://127.0.0.1:{port}/bands"), Some("key"));
    let (status, headers, body) = invoke(proxy).await;

    assert_eq!(status, StatusCode::OK);
    assert_cors(&headers);
    assert_eq!(body, bandgate::fallback::body());
}

#[tokio::test]
async fn non_json_upstream_body_serves_fallback_with_200() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock)
        .await;

    let proxy = proxy_for(format!("{}{}", mock.uri(), SPEED_BANDS_PATH), Some("key"));
    let (status, _headers, body) = invoke(proxy).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, bandgate::fallback::body());
}

#[tokio::test]
async fn fallback_body_is_byte_identical_across_failing_invocations() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock)
        .await;

    let endpoint = format!("{}{}", mock.uri(), SPEED_BANDS_PATH);

    let (_, _, first) = invoke(proxy_for(endpoint.clone(), Some("key"))).await;
    let (_, _, second) = invoke(proxy_for(endpoint, Some("key"))).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn every_branch_carries_cors_header() {
    // Missing credential branch.
    let (_, headers, _) = invoke(proxy_for("http://127.0.0.1:9/".to_string(), None)).await;
    assert_cors(&headers);

    // Live branch.
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"value":[]}"#))
        .mount(&mock)
        .await;
    let (_, headers, _) = invoke(proxy_for(format!("{}/", mock.uri()), Some("key"))).await;
    assert_cors(&headers);

    // Fallback branch.
    let failing = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&failing)
        .await;
    let (_, headers, _) = invoke(proxy_for(format!("{}/", failing.uri()), Some("key"))).await;
    assert_cors(&headers);
}
