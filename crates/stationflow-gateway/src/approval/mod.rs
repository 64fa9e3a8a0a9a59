//! Approval workflow: submission validation, admin decisions, broadcast.

pub mod engine;

pub use engine::{ApprovalEngine, DecisionOutcome};
