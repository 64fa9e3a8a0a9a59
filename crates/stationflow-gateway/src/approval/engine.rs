use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;

use stationflow_core::clock::{start_of_local_day, Clock};
use stationflow_core::error::{Result, StationFlowError};
use stationflow_core::model::{Decision, RequestId, RequestStatus, Station, UpdateRequest};

use crate::realtime::{BroadcastHub, FanoutReport};
use crate::store::{QuotaCheck, RequestStore, StationStore};

/// Result of a successful decision.
#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    pub request: UpdateRequest,
    /// Station as persisted (approve only).
    pub station: Option<Station>,
    /// Fan-out of the station snapshot (approve only).
    pub fanout: Option<FanoutReport>,
}

/// Validates proposals, queues them as pending, and applies admin decisions.
///
/// Decisions on the same request are serialized by a per-request lock and the
/// store's compare-and-set, so a request is applied at most once. The lock
/// entry is dropped once the request leaves `Pending`.
pub struct ApprovalEngine {
    stations: Arc<dyn StationStore>,
    requests: Arc<dyn RequestStore>,
    hub: Arc<BroadcastHub>,
    clock: Arc<dyn Clock>,
    daily_quota: u32,
    decision_locks: DashMap<RequestId, Arc<Mutex<()>>>,
}

impl ApprovalEngine {
    pub fn new(
        stations: Arc<dyn StationStore>,
        requests: Arc<dyn RequestStore>,
        hub: Arc<BroadcastHub>,
        clock: Arc<dyn Clock>,
        daily_quota: u32,
    ) -> Self {
        Self {
            stations,
            requests,
            hub,
            clock,
            daily_quota,
            decision_locks: DashMap::new(),
        }
    }

    /// Queue a proposal as `Pending`.
    ///
    /// Capacity is checked against the station as it is now and never
    /// re-checked at decision time. Non-admins are capped per local calendar
    /// day; every created request counts, whatever its later outcome.
    pub async fn submit(
        &self,
        station_id: &str,
        requester_id: &str,
        requested_available: u32,
        is_admin: bool,
    ) -> Result<UpdateRequest> {
        let station = self
            .stations
            .get(station_id)
            .await?
            .ok_or_else(|| StationFlowError::NotFound(format!("station {station_id}")))?;

        if requested_available > station.capacity {
            return Err(StationFlowError::CapacityExceeded {
                requested: requested_available,
                capacity: station.capacity,
            });
        }

        let now = self.clock.now();
        let quota = (!is_admin).then(|| QuotaCheck {
            since: start_of_local_day(now),
            limit: self.daily_quota,
        });

        let req = UpdateRequest::pending(
            station_id,
            requester_id,
            requested_available,
            now.with_timezone(&Utc),
        );
        let req = self.requests.insert(req, quota).await?;

        tracing::info!(
            request_id = %req.id,
            station_id = %req.station_id,
            requester = %req.requester_id,
            requested = req.requested_available,
            "update request queued"
        );
        Ok(req)
    }

    pub async fn list_pending(&self) -> Result<Vec<UpdateRequest>> {
        self.requests.list_by_status(RequestStatus::Pending).await
    }

    pub async fn list_for_requester(&self, requester_id: &str) -> Result<Vec<UpdateRequest>> {
        self.requests.list_for_requester(requester_id).await
    }

    pub async fn decide(&self, id: RequestId, decision: Decision) -> Result<DecisionOutcome> {
        let lock = self
            .decision_locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock().await;

        let (result, pending) = self.decide_locked(id, decision).await;

        // Keep the lock while the request can still be decided.
        drop(guard);
        if !pending {
            self.decision_locks.remove(&id);
        }

        result
    }

    /// Returns the outcome and whether the request is still pending afterwards.
    async fn decide_locked(
        &self,
        id: RequestId,
        decision: Decision,
    ) -> (Result<DecisionOutcome>, bool) {
        let req = match self.requests.get(id).await {
            Ok(Some(r)) => r,
            Ok(None) => return (Err(StationFlowError::NotFound(format!("request {id}"))), false),
            Err(e) => return (Err(e), true),
        };

        if req.status.is_terminal() {
            return (Err(StationFlowError::AlreadyDecided), false);
        }

        let result = match decision {
            Decision::Reject => self.reject(id).await,
            Decision::Approve => self.approve(req).await,
        };
        let pending = result.is_err();
        (result, pending)
    }

    async fn reject(&self, id: RequestId) -> Result<DecisionOutcome> {
        let request = self.requests.transition(id, RequestStatus::Rejected).await?;
        tracing::info!(request_id = %id, station_id = %request.station_id, "update request rejected");
        Ok(DecisionOutcome {
            request,
            station: None,
            fanout: None,
        })
    }

    async fn approve(&self, req: UpdateRequest) -> Result<DecisionOutcome> {
        let mut station = self
            .stations
            .get(&req.station_id)
            .await?
            .ok_or_else(|| StationFlowError::NotFound(format!("station {}", req.station_id)))?;

        station.apply_availability(req.requested_available, self.clock.now().with_timezone(&Utc));

        // The request stays pending unless the station write lands.
        let station = self.stations.save(station).await.map_err(|e| {
            tracing::warn!(request_id = %req.id, station_id = %req.station_id, error = %e, "station save failed; request left pending");
            match e {
                StationFlowError::UpstreamPersistence(m) => StationFlowError::UpstreamPersistence(m),
                other => StationFlowError::UpstreamPersistence(other.to_string()),
            }
        })?;

        let request = self
            .requests
            .transition(req.id, RequestStatus::Approved)
            .await
            .map_err(|e| {
                tracing::warn!(request_id = %req.id, station_id = %station.id, error = %e, "station saved but request transition failed; request left pending");
                e
            })?;

        let fanout = match self.hub.publish(&station) {
            Ok(r) => Some(r),
            Err(e) => {
                tracing::warn!(station_id = %station.id, error = %e, "station broadcast skipped");
                None
            }
        };

        tracing::info!(
            request_id = %request.id,
            station_id = %station.id,
            available = station.available,
            status = ?station.status,
            "update request approved"
        );

        Ok(DecisionOutcome {
            request,
            station: Some(station),
            fanout,
        })
    }
}
