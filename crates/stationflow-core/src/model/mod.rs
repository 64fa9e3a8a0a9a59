//! Domain model: stations, their status rule, and update requests.

pub mod request;
pub mod station;

pub use request::{Decision, RequestId, RequestStatus, UpdateRequest};
pub use station::{derive_status, Location, Station, StationStatus, TransportType};
