//! StationFlow gateway library entry.
//!
//! Wires the rate limiter, stores, approval engine, broadcast hub and the
//! HTTP/SSE surface into one service. Consumed by the binary (`main.rs`) and
//! by integration tests.

pub mod api;
pub mod app_state;
pub mod approval;
pub mod config;
pub mod context;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod realtime;
pub mod router;
pub mod services;
pub mod store;
pub mod transport;
