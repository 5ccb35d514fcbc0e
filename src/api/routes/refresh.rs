//! Refresh Routes
//!
//! Endpoints for driving the refresh coordinator.
//!
//! - POST /api/v1/refresh - Trigger a refresh now
//! - GET /api/v1/refresh/status - Get coordinator status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::RefreshResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::coordinator::{RefreshError, RefreshStatus};

/// POST /api/v1/refresh
///
/// Run one refresh cycle. A failed cycle is reported in the body; the
/// previous snapshot stays current.
pub async fn trigger_refresh(
    State(state): State<Arc<AppState>>,
) -> ApiResult<(StatusCode, Json<RefreshResponse>)> {
    match state.coordinator.refresh().await {
        Ok(snapshot) => {
            tracing::info!("Manual refresh completed");

            Ok((
                StatusCode::OK,
                Json(RefreshResponse {
                    status: "success".to_string(),
                    fetched_at: Some(snapshot.fetched_at.to_rfc3339()),
                    error: None,
                }),
            ))
        }
        Err(RefreshError::ShutDown) => Err(ApiError::ServiceUnavailable(
            "Coordinator is shutting down".to_string(),
        )),
        Err(e) => {
            tracing::error!(error = %e, "Manual refresh failed");

            Ok((
                StatusCode::OK,
                Json(RefreshResponse {
                    status: "failed".to_string(),
                    fetched_at: None,
                    error: Some(e.to_string()),
                }),
            ))
        }
    }
}

/// GET /api/v1/refresh/status
pub async fn get_refresh_status(State(state): State<Arc<AppState>>) -> Json<RefreshStatus> {
    Json(state.coordinator.status().await)
}
