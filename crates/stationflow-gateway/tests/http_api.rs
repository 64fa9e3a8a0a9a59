//! End-to-end HTTP tests driving the router in-process.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{FixedOffset, TimeZone};
use serde_json::{json, Value};
use tower::ServiceExt;

use stationflow_core::clock::ManualClock;
use stationflow_gateway::{
    app_state::AppState,
    config,
    router::build_router,
    store::{InMemoryRequestStore, InMemoryStationStore},
    transport::heartbeat,
};

const CONFIG: &str = r#"
version: 1
limits:
  submit_max: 3
  submit_window_secs: 3600
  daily_quota: 5
stations:
  - { id: "s1", name: "Moda Dock", type: bike, lat: 40.98, lng: 29.03, capacity: 10, available: 3 }
  - { id: "m1", name: "Kadikoy", type: metro, lat: 40.99, lng: 29.02, capacity: 100, available: 0 }
"#;

async fn app() -> (AppState, Router) {
    let cfg = config::load_from_str(CONFIG).unwrap();
    let tz = FixedOffset::east_opt(3 * 3600).unwrap();
    let clock = Arc::new(ManualClock::new(tz.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()));
    let state = AppState::with_parts(
        cfg,
        clock,
        Arc::new(InMemoryStationStore::new()),
        Arc::new(InMemoryRequestStore::new()),
    )
    .unwrap();
    state.bootstrap().await.unwrap();
    let router = build_router(state.clone());
    (state, router)
}

fn req(method: Method, uri: &str, user: Option<(&str, &str)>, body: Option<Value>) -> Request<Body> {
    let mut b = Request::builder().method(method).uri(uri);
    if let Some((id, roles)) = user {
        b = b.header("x-user-id", id).header("x-user-roles", roles);
    }
    match body {
        Some(v) => b
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => b.body(Body::empty()).unwrap(),
    }
}

async fn call(router: &Router, r: Request<Body>) -> (StatusCode, Value) {
    let resp = router.clone().oneshot(r).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let v = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, v)
}

const USER: Option<(&str, &str)> = Some(("u1", "ROLE_USER"));
const ADMIN: Option<(&str, &str)> = Some(("root", "ROLE_USER,ROLE_ADMIN"));

#[tokio::test]
async fn seeded_stations_have_derived_status() {
    let (_, router) = app().await;
    let (status, body) = call(&router, req(Method::GET, "/api/stations/m1", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "full");

    let (_, body) = call(&router, req(Method::GET, "/api/stations", None, None)).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = call(&router, req(Method::GET, "/api/stations/zzz", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn submit_requires_identity_and_valid_input() {
    let (_, router) = app().await;
    let uri = "/api/stations/s1/request-update";

    let (status, body) = call(&router, req(Method::POST, uri, None, Some(json!({ "available": 4 })))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AUTH_FAILED");

    let (status, body) = call(&router, req(Method::POST, uri, USER, Some(json!({ "available": -1 })))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");

    let (status, body) = call(&router, req(Method::POST, uri, USER, Some(json!({ "available": 11 })))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "CAPACITY_EXCEEDED");
}

#[tokio::test]
async fn submission_throttle_returns_429() {
    let (_, router) = app().await;
    let uri = "/api/stations/s1/request-update";

    for _ in 0..3 {
        let (status, _) = call(&router, req(Method::POST, uri, USER, Some(json!({ "available": 4 })))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, body) = call(&router, req(Method::POST, uri, USER, Some(json!({ "available": 4 })))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "RATE_LIMITED");
    assert_eq!(body["retryable"], true);

    // Other callers have their own bucket.
    let (status, _) = call(&router, req(Method::POST, uri, Some(("u2", "ROLE_USER")), Some(json!({ "available": 4 })))).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn full_review_cycle() {
    let (state, router) = app().await;
    let hub = state.hub();
    let mut viewer = hub.subscribe();

    let (status, created) = call(
        &router,
        req(Method::POST, "/api/stations/s1/request-update", USER, Some(json!({ "available": 10 }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "PENDING");
    assert_eq!(created["stationName"], "Moda Dock");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = call(&router, req(Method::GET, "/api/stations/requests", USER, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, pending) = call(&router, req(Method::GET, "/api/stations/requests", ADMIN, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let approve = format!("/api/stations/requests/{id}/approve");
    let (status, _) = call(&router, req(Method::POST, &approve, USER, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, decided) = call(&router, req(Method::POST, &approve, ADMIN, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decided["request"]["status"], "APPROVED");
    assert_eq!(decided["station"]["available"], 10);
    assert_eq!(decided["station"]["status"], "active");

    let ev = viewer.recv().await.unwrap();
    assert_eq!(ev.kind.as_str(), "station-update");

    let (status, body) = call(&router, req(Method::POST, &approve, ADMIN, None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ALREADY_DECIDED");

    let reject = format!("/api/stations/requests/{id}/reject");
    let (status, _) = call(&router, req(Method::POST, &reject, ADMIN, None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(viewer.try_recv().is_none());

    let (_, mine) = call(&router, req(Method::GET, "/api/stations/my-requests", USER, None)).await;
    assert_eq!(mine[0]["status"], "APPROVED");

    let (_, metrics) = {
        let resp = router.clone().oneshot(req(Method::GET, "/metrics", None, None)).await.unwrap();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        ((), String::from_utf8(bytes.to_vec()).unwrap())
    };
    assert!(metrics.contains("stationflow_submissions_total{outcome=\"accepted\"} 1"));
    assert!(metrics.contains("outcome=\"applied\""));
    assert!(metrics.contains("stationflow_hub_subscribers 1"));
}

#[tokio::test]
async fn unknown_request_id_is_404_and_malformed_id_is_400() {
    let (_, router) = app().await;
    let uri = format!("/api/stations/requests/{}/approve", uuid::Uuid::new_v4());
    let (status, body) = call(&router, req(Method::POST, &uri, ADMIN, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let (status, body) = call(&router, req(Method::POST, "/api/stations/requests/not-a-uuid/approve", ADMIN, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn malformed_bodies_use_json_error_shape() {
    let (state, router) = app().await;
    let uri = "/api/stations/s1/request-update";

    let (status, body) = call(&router, req(Method::POST, uri, USER, Some(json!({ "available": "ten" })))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
    assert_eq!(body["retryable"], false);

    let raw = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("x-user-id", "u1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = call(&router, raw).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");

    let (status, body) = call(&router, req(Method::POST, "/api/stations", USER, Some(json!({ "name": "x", "colour": "red" })))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");

    // Nothing reached the engine.
    assert!(state.engine().list_for_requester("u1").await.unwrap().is_empty());
}

#[tokio::test]
async fn custom_station_creation_and_admin_delete() {
    let (_, router) = app().await;
    let body = json!({
        "name": "My Dock",
        "type": "scooter",
        "location": { "lat": 41.0, "lng": 29.0 },
        "capacity": 8,
        "available": 0
    });
    let (status, created) = call(&router, req(Method::POST, "/api/stations", USER, Some(body))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "empty");
    assert_eq!(created["isCustom"], true);
    assert_eq!(created["ownerId"], "u1");

    let uri = format!("/api/stations/{}", created["id"].as_str().unwrap());
    let (status, _) = call(&router, req(Method::DELETE, &uri, USER, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&router, req(Method::DELETE, &uri, ADMIN, None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&router, req(Method::GET, &uri, None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sse_stream_registers_and_unregisters() {
    let (state, router) = app().await;
    let resp = router
        .clone()
        .oneshot(req(Method::GET, "/api/notifications/subscribe", None, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(ct.starts_with("text/event-stream"));
    assert_eq!(state.hub().subscriber_count(), 1);

    heartbeat::run_once(&state);
    assert_eq!(
        state.metrics().hub_deliveries.get(&[("kind", "heartbeat")]),
        1
    );

    drop(resp);
    assert_eq!(state.hub().subscriber_count(), 0);
}

#[tokio::test]
async fn ops_endpoints() {
    let (state, router) = app().await;
    let (status, _) = call(&router, req(Method::GET, "/healthz", None, None)).await;
    assert_eq!(status, StatusCode::OK);

    let resp = router.clone().oneshot(req(Method::GET, "/readyz", None, None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    state.set_draining();
    let resp = router.clone().oneshot(req(Method::GET, "/readyz", None, None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
