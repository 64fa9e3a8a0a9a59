//! Update-request endpoints: submit, review queues, admin decisions.

use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stationflow_core::error::StationFlowError;
use stationflow_core::model::{Decision, RequestId, RequestStatus, Station, UpdateRequest};

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, ApiPath};
use crate::app_state::AppState;
use crate::approval::DecisionOutcome;
use crate::context::Identity;
use crate::realtime::EventKind;

const UNKNOWN_STATION: &str = "Unknown Station";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitBody {
    /// Signed so that negative input is reported as a domain error.
    pub available: i64,
}

/// Request as shown to reviewers and requesters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub id: RequestId,
    pub station_id: String,
    pub station_name: String,
    pub requester_id: String,
    pub requested_available: u32,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl RequestView {
    fn new(req: UpdateRequest, station_name: Option<String>) -> Self {
        Self {
            id: req.id,
            station_id: req.station_id,
            station_name: station_name.unwrap_or_else(|| UNKNOWN_STATION.to_string()),
            requester_id: req.requester_id,
            requested_available: req.requested_available,
            status: req.status,
            created_at: req.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DecisionView {
    pub request: RequestView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station: Option<Station>,
}

fn outcome_label(e: &StationFlowError) -> &'static str {
    match e {
        StationFlowError::RateLimited => "rate_limited",
        StationFlowError::CapacityExceeded { .. } => "capacity_exceeded",
        StationFlowError::QuotaExceeded { .. } => "quota_exceeded",
        StationFlowError::NotFound(_) => "not_found",
        StationFlowError::AlreadyDecided => "already_decided",
        StationFlowError::UpstreamPersistence(_) => "upstream",
        _ => "error",
    }
}

async fn view(app: &AppState, req: UpdateRequest) -> ApiResult<RequestView> {
    let name = app.catalog().name_of(&req.station_id).await?;
    Ok(RequestView::new(req, name))
}

async fn views(app: &AppState, reqs: Vec<UpdateRequest>) -> ApiResult<Vec<RequestView>> {
    let mut out = Vec::with_capacity(reqs.len());
    for r in reqs {
        out.push(view(app, r).await?);
    }
    Ok(out)
}

/// `POST /api/stations/:id/request-update`
pub async fn request_update(
    State(app): State<AppState>,
    who: Identity,
    ApiPath(station_id): ApiPath<String>,
    ApiJson(body): ApiJson<SubmitBody>,
) -> ApiResult<(StatusCode, Json<RequestView>)> {
    let m = &app.metrics().submissions;

    if !app.limiter().allow(&who.throttle_key()) {
        tracing::warn!(requester = %who.user_id, station_id = %station_id, "submission throttled");
        m.inc(&[("outcome", "rate_limited")]);
        return Err(StationFlowError::RateLimited.into());
    }

    let requested = u32::try_from(body.available).map_err(|_| {
        m.inc(&[("outcome", "error")]);
        ApiError(StationFlowError::BadRequest(
            "available must be a non-negative integer".into(),
        ))
    })?;

    let res = app
        .engine()
        .submit(&station_id, &who.user_id, requested, who.is_admin())
        .await;

    match res {
        Ok(req) => {
            m.inc(&[("outcome", "accepted")]);
            Ok((StatusCode::CREATED, Json(view(&app, req).await?)))
        }
        Err(e) => {
            m.inc(&[("outcome", outcome_label(&e))]);
            Err(e.into())
        }
    }
}

/// `GET /api/stations/requests` (admin)
pub async fn pending_requests(
    State(app): State<AppState>,
    who: Identity,
) -> ApiResult<Json<Vec<RequestView>>> {
    who.require_admin()?;
    let reqs = app.engine().list_pending().await?;
    Ok(Json(views(&app, reqs).await?))
}

/// `GET /api/stations/my-requests`
pub async fn my_requests(
    State(app): State<AppState>,
    who: Identity,
) -> ApiResult<Json<Vec<RequestView>>> {
    let reqs = app.engine().list_for_requester(&who.user_id).await?;
    Ok(Json(views(&app, reqs).await?))
}

/// `POST /api/stations/requests/:id/approve` (admin)
pub async fn approve_request(
    State(app): State<AppState>,
    who: Identity,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DecisionView>> {
    decide(app, who, RequestId(id), Decision::Approve).await
}

/// `POST /api/stations/requests/:id/reject` (admin)
pub async fn reject_request(
    State(app): State<AppState>,
    who: Identity,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DecisionView>> {
    decide(app, who, RequestId(id), Decision::Reject).await
}

async fn decide(
    app: AppState,
    who: Identity,
    id: RequestId,
    decision: Decision,
) -> ApiResult<Json<DecisionView>> {
    who.require_admin()?;

    let started = Instant::now();
    let res = app.engine().decide(id, decision).await;
    let m = app.metrics();
    m.decide_duration
        .observe(&[("decision", decision.as_str())], started.elapsed());

    let DecisionOutcome {
        request,
        station,
        fanout,
    } = match res {
        Ok(o) => o,
        Err(e) => {
            m.decisions
                .inc(&[("decision", decision.as_str()), ("outcome", outcome_label(&e))]);
            return Err(e.into());
        }
    };

    m.decisions
        .inc(&[("decision", decision.as_str()), ("outcome", "applied")]);
    if let Some(r) = fanout {
        let kind = EventKind::StationUpdate.as_str();
        m.hub_deliveries.add(&[("kind", kind)], r.delivered as u64);
        m.hub_pruned.add(&[("kind", kind)], r.pruned as u64);
    }

    tracing::debug!(request_id = %id, admin = %who.user_id, decision = decision.as_str(), "decision recorded");

    let name = station.as_ref().map(|s| s.name.clone());
    let request = match name {
        Some(n) => RequestView::new(request, Some(n)),
        None => view(&app, request).await?,
    };
    Ok(Json(DecisionView { request, station }))
}
