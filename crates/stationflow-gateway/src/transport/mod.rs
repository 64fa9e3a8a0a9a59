//! Transport layer (server-sent events).
//!
//! Exposes the notification stream handler and the heartbeat driver that
//! keeps idle streams alive and reaps dead ones.

pub mod heartbeat;
pub mod sse;
