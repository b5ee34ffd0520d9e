//! Standalone mock DataMall upstream for local development.
//!
//! Serves a plausible TrafficSpeedBands payload so BandGate can be run
//! without a DataMall account key quota:
//!
//! ```text
//! cargo run --bin mock_lta &
//! BANDGATE_UPSTREAM=http://127.0.0.1:3100/ltaodataservice/TrafficSpeedBands \
//!     LTA_ACCOUNT_KEY=local cargo run
//! ```
//!
//! `?status=503` on the request forces an error status, for rehearsing the
//! fallback path.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .route("/ltaodataservice/TrafficSpeedBands", get(speed_bands))
        .route("/health", get(health_check));

    let addr = SocketAddr::from(([127, 0, 0, 1], 3100));
    tracing::info!("Mock DataMall listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve a static speed band payload, or the status forced via `?status=`.
async fn speed_bands(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    if let Some(forced) = params
        .get("status")
        .and_then(|v| v.parse::<u16>().ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
    {
        tracing::info!(status = %forced, "Forcing error status");
        return forced.into_response();
    }

    Json(json!({
        "odata.metadata": "http://datamall2.mytransport.sg/ltaodataservice/$metadata#TrafficSpeedBands",
        "value": [
            {
                "LinkID": "103000000",
                "RoadName": "Nicoll Highway",
                "StartLat": 1.2929,
                "StartLon": 103.8616,
                "EndLat": 1.2936,
                "EndLon": 103.8629,
                "SpeedBand": 4,
                "MinimumSpeed": 31,
                "MaximumSpeed": 40
            },
            {
                "LinkID": "103000001",
                "RoadName": "Victoria Street",
                "StartLat": 1.2966,
                "StartLon": 103.8525,
                "EndLat": 1.2973,
                "EndLon": 103.8538,
                "SpeedBand": 2,
                "MinimumSpeed": 11,
                "MaximumSpeed": 20
            }
        ]
    }))
    .into_response()
}

/// Health check endpoint for readiness probes.
async fn health_check() -> &'static str {
    "OK"
}
