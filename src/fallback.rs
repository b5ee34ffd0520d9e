//! Fixed fallback payload served when the upstream call fails.
//!
//! The two records are literal constants. The body is serialized exactly
//! once into a process-wide static, so repeated degraded responses are
//! byte-identical.

use std::sync::LazyLock;

use bytes::Bytes;

use crate::model::{TrafficRecord, TrafficResponse};

static FALLBACK_BODY: LazyLock<Bytes> = LazyLock::new(|| {
    let body = serde_json::to_vec(&payload()).expect("static fallback payload serializes");
    Bytes::from(body)
});

/// The typed fallback payload: two illustrative segments around the
/// Woodlands checkpoint.
pub fn payload() -> TrafficResponse {
    TrafficResponse {
        value: vec![
            TrafficRecord {
                link_id: "MOCK1".to_string(),
                road_name: "Woodlands Causeway".to_string(),
                start_lat: 1.445,
                start_lon: 103.768,
                end_lat: 1.446,
                end_lon: 103.769,
                speed_band: 3,
                minimum_speed: 21,
                maximum_speed: 30,
            },
            TrafficRecord {
                link_id: "MOCK2".to_string(),
                road_name: "Woodlands Checkpoint Exit".to_string(),
                start_lat: 1.444,
                start_lon: 103.767,
                end_lat: 1.445,
                end_lon: 103.768,
                speed_band: 5,
                minimum_speed: 41,
                maximum_speed: 50,
            },
        ],
    }
}

/// The serialized fallback body. Cloning `Bytes` is a refcount bump, so
/// every caller shares the same underlying buffer.
pub fn body() -> Bytes {
    FALLBACK_BODY.clone()
}
