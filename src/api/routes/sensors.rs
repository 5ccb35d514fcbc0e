//! Sensor Routes
//!
//! Read-only views over the current snapshot. Values are projected on every
//! request.
//!
//! - GET /api/v1/sensors - All sensors
//! - GET /api/v1/sensors/:key - One sensor
//! - GET /api/v1/device - Account the sensors belong to

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::SensorsResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::sensors::{self, DeviceInfo, SensorKey, SensorState};

/// GET /api/v1/sensors
pub async fn list_sensors(State(state): State<Arc<AppState>>) -> Json<SensorsResponse> {
    let snapshot = state.coordinator.current().await;
    let status = state.coordinator.status().await;

    Json(SensorsResponse {
        fetched_at: snapshot.as_ref().map(|s| s.fetched_at.to_rfc3339()),
        stale: status.is_stale(),
        sensors: sensors::evaluate_all(snapshot.as_deref()),
    })
}

/// GET /api/v1/sensors/:key
pub async fn get_sensor(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<Json<SensorState>> {
    let key: SensorKey = key.parse().map_err(|e| ApiError::NotFound(format!("{}", e)))?;
    let snapshot = state.coordinator.current().await;

    Ok(Json(sensors::evaluate(key, snapshot.as_deref())))
}

/// GET /api/v1/device
pub async fn get_device(State(state): State<Arc<AppState>>) -> ApiResult<Json<DeviceInfo>> {
    let snapshot = state
        .coordinator
        .current()
        .await
        .ok_or_else(|| ApiError::ServiceUnavailable("No WakaTime data yet".to_string()))?;

    DeviceInfo::from_snapshot(&snapshot)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User profile missing from snapshot".to_string()))
}
