//! Station catalog operations outside the approval workflow.

pub mod stations;

pub use stations::{NewStation, StationCatalog};
