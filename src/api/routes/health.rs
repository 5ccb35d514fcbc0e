//! Health Routes
//!
//! Health check endpoints for monitoring and container probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (a snapshot is available)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 once a snapshot has been published, 503 before that or
/// after teardown.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    match state.coordinator.current().await {
        Some(_) => StatusCode::OK,
        None => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// GET /health
///
/// Full health status. A stale but present snapshot is "degraded".
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let has_snapshot = state.coordinator.current().await.is_some();
    let status = state.coordinator.status().await;
    let stale = status.is_stale();

    let overall_status = match (has_snapshot, stale) {
        (true, false) => "healthy",
        (true, true) => "degraded",
        (false, _) => "unhealthy",
    };

    Json(HealthResponse {
        status: overall_status.to_string(),
        stale,
        last_success: status.last_success.map(|t| t.to_rfc3339()),
        consecutive_failures: status.consecutive_failures,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }
}
