//! Top-level facade crate for StationFlow.
//!
//! Re-exports the domain core and the gateway library so users can depend on a single crate.

pub mod core {
    pub use stationflow_core::*;
}

pub mod gateway {
    pub use stationflow_gateway::*;
}
