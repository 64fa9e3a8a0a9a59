//! Realtime runtime (egress) for StationFlow.
//!
//! Broadcast hub plus the prepared event type it fans out.

pub mod hub;
pub mod types;

pub use hub::{BroadcastHub, FanoutReport, SubscriberId, Subscription};
pub use types::{EventKind, HubEvent};
