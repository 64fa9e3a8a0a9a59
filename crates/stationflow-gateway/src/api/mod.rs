//! JSON HTTP API: stations and the update-request workflow.

pub mod error;
pub mod extract;
pub mod requests;
pub mod stations;

pub use error::ApiError;
pub use extract::{ApiJson, ApiPath};
