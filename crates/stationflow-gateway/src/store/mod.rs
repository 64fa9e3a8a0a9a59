//! Storage seams for stations and update requests.
//!
//! The approval engine only talks to these traits. In-memory implementations
//! back the binary and the tests; a database-backed store plugs in behind the
//! same traits.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stationflow_core::error::Result;
use stationflow_core::model::{RequestId, RequestStatus, Station, TransportType, UpdateRequest};

pub use memory::{InMemoryRequestStore, InMemoryStationStore};

/// Station persistence (owned outside the workflow core).
#[async_trait]
pub trait StationStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Station>>;
    async fn save(&self, station: Station) -> Result<Station>;
    /// Returns false when nothing was stored under `id`.
    async fn delete(&self, id: &str) -> Result<bool>;
    async fn list(&self) -> Result<Vec<Station>>;
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Station>>;
    async fn find_by_type(&self, station_type: TransportType) -> Result<Vec<Station>>;
}

/// Daily cap enforced atomically with an insert.
#[derive(Debug, Clone, Copy)]
pub struct QuotaCheck {
    /// Count requests created at or after this instant.
    pub since: DateTime<Utc>,
    pub limit: u32,
}

/// Update request log.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Persist a new request. With a quota, fails `QuotaExceeded` when the
    /// requester already has `limit` requests since `since`; the count and
    /// the insert happen as one step.
    async fn insert(&self, req: UpdateRequest, quota: Option<QuotaCheck>) -> Result<UpdateRequest>;

    async fn get(&self, id: RequestId) -> Result<Option<UpdateRequest>>;

    /// Newest first.
    async fn list_by_status(&self, status: RequestStatus) -> Result<Vec<UpdateRequest>>;

    /// Newest first.
    async fn list_for_requester(&self, requester_id: &str) -> Result<Vec<UpdateRequest>>;

    /// Compare-and-set out of `Pending`. Fails `NotFound` for unknown ids and
    /// `AlreadyDecided` when the request is no longer pending.
    async fn transition(&self, id: RequestId, next: RequestStatus) -> Result<UpdateRequest>;
}
