//! Axum router wiring.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{api, app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/stations",
            get(api::stations::list_stations).post(api::stations::create_station),
        )
        .route("/api/stations/requests", get(api::requests::pending_requests))
        .route("/api/stations/my-requests", get(api::requests::my_requests))
        .route(
            "/api/stations/requests/:id/approve",
            post(api::requests::approve_request),
        )
        .route(
            "/api/stations/requests/:id/reject",
            post(api::requests::reject_request),
        )
        .route(
            "/api/stations/:id",
            get(api::stations::get_station).delete(api::stations::delete_station),
        )
        .route(
            "/api/stations/:id/request-update",
            post(api::requests::request_update),
        )
        .route("/api/notifications/subscribe", get(transport::sse::subscribe))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
