//! Update request lifecycle.
//!
//! `Pending -> Approved` or `Pending -> Rejected`, exactly once. Terminal
//! states are never re-opened.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    /// Only `Pending` may move, and only to a terminal state.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        self == RequestStatus::Pending && next.is_terminal()
    }
}

/// Admin verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target_status(self) -> RequestStatus {
        match self {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub id: RequestId,
    pub station_id: String,
    pub requester_id: String,
    pub requested_available: u32,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl UpdateRequest {
    pub fn pending(
        station_id: impl Into<String>,
        requester_id: impl Into<String>,
        requested_available: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RequestId::new(),
            station_id: station_id.into(),
            requester_id: requester_id.into(),
            requested_available,
            status: RequestStatus::Pending,
            created_at,
        }
    }
}
