//! Wire shapes for the TrafficSpeedBands payload.
//!
//! Field names follow the DataMall JSON exactly (`LinkID`, `RoadName`, ...).
//! On the live path these types are not used at all - the upstream body is
//! relayed as raw bytes - but the fallback payload is built from them, and
//! library consumers can deserialize a response into them.

use serde::{Deserialize, Serialize};

/// One road segment with its current speed band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrafficRecord {
    /// Segment identifier assigned by LTA.
    #[serde(rename = "LinkID")]
    pub link_id: String,

    /// Human-readable road name.
    pub road_name: String,

    /// Segment start coordinate.
    pub start_lat: f64,
    pub start_lon: f64,

    /// Segment end coordinate.
    pub end_lat: f64,
    pub end_lon: f64,

    /// Discretized speed category (1 = slowest).
    pub speed_band: u8,

    /// Band lower bound in km/h.
    pub minimum_speed: u32,

    /// Band upper bound in km/h.
    pub maximum_speed: u32,
}

/// Container shape of a TrafficSpeedBands response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficResponse {
    /// Ordered sequence of road segments.
    pub value: Vec<TrafficRecord>,
}
