//! StationFlow core: transport-agnostic domain model, status derivation,
//! clock abstraction, and the error surface shared by the gateway and tests.
//!
//! This crate intentionally carries no transport or runtime dependencies so
//! the domain rules can be reused and tested in isolation.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! All fallible paths must surface as `StationFlowError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod clock;
pub mod error;
pub mod model;

/// Shared result type.
pub use error::{Result, StationFlowError};
