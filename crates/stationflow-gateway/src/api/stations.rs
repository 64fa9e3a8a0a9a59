//! Station catalog endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use stationflow_core::model::Station;

use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, ApiPath};
use crate::app_state::AppState;
use crate::context::Identity;
use crate::services::NewStation;

pub async fn list_stations(State(app): State<AppState>) -> ApiResult<Json<Vec<Station>>> {
    Ok(Json(app.catalog().list().await?))
}

pub async fn get_station(
    State(app): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Station>> {
    Ok(Json(app.catalog().get(&id).await?))
}

pub async fn create_station(
    State(app): State<AppState>,
    who: Identity,
    ApiJson(body): ApiJson<NewStation>,
) -> ApiResult<(StatusCode, Json<Station>)> {
    let station = app.catalog().create(body, &who.user_id).await?;
    Ok((StatusCode::CREATED, Json(station)))
}

pub async fn delete_station(
    State(app): State<AppState>,
    who: Identity,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Value>> {
    who.require_admin()?;
    app.catalog().delete(&id).await?;
    Ok(Json(json!({ "message": "station deleted" })))
}
