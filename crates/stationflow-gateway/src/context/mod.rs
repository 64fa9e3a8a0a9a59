//! Caller context shared across HTTP handlers.
//!
//! Identity is resolved upstream (session/JWT layer) and arrives as trusted
//! headers; this module only reads it.

pub mod identity;

pub use identity::Identity;
