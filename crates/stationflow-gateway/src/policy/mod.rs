//! Policy layer (submission throttling).
//!
//! Gates mutating calls before they reach the approval engine.

pub mod rate_limit;

pub use rate_limit::RateLimiter;
