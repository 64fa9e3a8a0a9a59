use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use stationflow_core::error::{Result, StationFlowError};
use stationflow_core::model::{RequestId, RequestStatus, Station, TransportType, UpdateRequest};

use super::{QuotaCheck, RequestStore, StationStore};

#[derive(Default)]
pub struct InMemoryStationStore {
    stations: DashMap<String, Station>,
}

impl InMemoryStationStore {
    pub fn new() -> Self {
        Self {
            stations: DashMap::new(),
        }
    }

    fn collect(&self, pred: impl Fn(&Station) -> bool) -> Vec<Station> {
        let mut out: Vec<Station> = self
            .stations
            .iter()
            .filter(|r| pred(r.value()))
            .map(|r| r.value().clone())
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }
}

#[async_trait]
impl StationStore for InMemoryStationStore {
    async fn get(&self, id: &str) -> Result<Option<Station>> {
        Ok(self.stations.get(id).map(|r| r.value().clone()))
    }

    async fn save(&self, station: Station) -> Result<Station> {
        self.stations.insert(station.id.clone(), station.clone());
        Ok(station)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.stations.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<Station>> {
        Ok(self.collect(|_| true))
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Station>> {
        Ok(self.collect(|s| s.owner_id.as_deref() == Some(owner_id)))
    }

    async fn find_by_type(&self, station_type: TransportType) -> Result<Vec<Station>> {
        Ok(self.collect(|s| s.station_type == station_type))
    }
}

#[derive(Clone)]
struct Entry {
    req: UpdateRequest,
    // Tie-breaker for identical timestamps.
    seq: u64,
}

#[derive(Default)]
struct Table {
    rows: HashMap<RequestId, Entry>,
    next_seq: u64,
}

impl Table {
    fn count_since(&self, requester_id: &str, since: DateTime<Utc>) -> u32 {
        let n = self
            .rows
            .values()
            .filter(|e| e.req.requester_id == requester_id && e.req.created_at >= since)
            .count();
        u32::try_from(n).unwrap_or(u32::MAX)
    }

    fn newest_first(&self, pred: impl Fn(&UpdateRequest) -> bool) -> Vec<UpdateRequest> {
        let mut hits: Vec<&Entry> = self.rows.values().filter(|e| pred(&e.req)).collect();
        hits.sort_by(|a, b| (b.req.created_at, b.seq).cmp(&(a.req.created_at, a.seq)));
        hits.into_iter().map(|e| e.req.clone()).collect()
    }
}

/// Request log held in process memory. One lock guards the whole table so
/// quota checks and status transitions are atomic.
#[derive(Default)]
pub struct InMemoryRequestStore {
    table: RwLock<Table>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Table) -> T) -> Result<T> {
        let g = self
            .table
            .read()
            .map_err(|_| StationFlowError::Internal("request table lock poisoned".into()))?;
        Ok(f(&g))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Table) -> Result<T>) -> Result<T> {
        let mut g = self
            .table
            .write()
            .map_err(|_| StationFlowError::Internal("request table lock poisoned".into()))?;
        f(&mut g)
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn insert(&self, req: UpdateRequest, quota: Option<QuotaCheck>) -> Result<UpdateRequest> {
        self.write(|t| {
            if let Some(q) = quota {
                if t.count_since(&req.requester_id, q.since) >= q.limit {
                    return Err(StationFlowError::QuotaExceeded { limit: q.limit });
                }
            }
            let seq = t.next_seq;
            t.next_seq += 1;
            t.rows.insert(req.id, Entry { req: req.clone(), seq });
            Ok(req)
        })
    }

    async fn get(&self, id: RequestId) -> Result<Option<UpdateRequest>> {
        self.read(|t| t.rows.get(&id).map(|e| e.req.clone()))
    }

    async fn list_by_status(&self, status: RequestStatus) -> Result<Vec<UpdateRequest>> {
        self.read(|t| t.newest_first(|r| r.status == status))
    }

    async fn list_for_requester(&self, requester_id: &str) -> Result<Vec<UpdateRequest>> {
        self.read(|t| t.newest_first(|r| r.requester_id == requester_id))
    }

    async fn transition(&self, id: RequestId, next: RequestStatus) -> Result<UpdateRequest> {
        self.write(|t| {
            let entry = t
                .rows
                .get_mut(&id)
                .ok_or_else(|| StationFlowError::NotFound(format!("request {id}")))?;
            if !entry.req.status.can_transition_to(next) {
                return Err(StationFlowError::AlreadyDecided);
            }
            entry.req.status = next;
            Ok(entry.req.clone())
        })
    }
}
