//! BandGate - HTTP proxy for the LTA DataMall TrafficSpeedBands API.
//!
//! BandGate sits between a browser client and the LTA DataMall, attaching the
//! `AccountKey` credential to the single outbound GET and relaying the JSON
//! body back verbatim with a wildcard CORS header.
//!
//! # Degraded Mode
//!
//! When the upstream call fails (non-2xx status, connection failure, timeout,
//! or a body that is not valid JSON), the failure is logged and masked behind
//! a fixed fallback payload served with status 200. Callers always receive
//! parseable traffic data; only the `MOCK1`/`MOCK2` link ids reveal degraded
//! mode. The one failure that is surfaced as an error is a missing
//! `LTA_ACCOUNT_KEY`, which answers 500.

pub mod config;
pub mod error;
pub mod fallback;
pub mod logging;
pub mod model;
pub mod proxy;
pub mod server;
pub mod upstream;
