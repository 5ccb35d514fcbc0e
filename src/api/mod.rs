//! WakaTime Sensors REST API
//!
//! HTTP surface over the refresh coordinator, built with Axum.
//!
//! # Endpoints
//!
//! ## Sensors
//! - `GET /api/v1/sensors` - All sensors with their current values
//! - `GET /api/v1/sensors/:key` - One sensor
//! - `GET /api/v1/device` - Account the sensors belong to
//!
//! ## Refresh
//! - `POST /api/v1/refresh` - Trigger a refresh cycle
//! - `GET /api/v1/refresh/status` - Get coordinator status
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use wakatime_sensors::api::{serve, AppState};
//! use wakatime_sensors::client::WakatimeClient;
//! use wakatime_sensors::config::Config;
//! use wakatime_sensors::coordinator::RefreshCoordinator;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_default();
//!     let client = WakatimeClient::hosted(&config.wakatime.api_key, reqwest::Client::new());
//!     let coordinator = Arc::new(RefreshCoordinator::new(
//!         Arc::new(client),
//!         config.coordinator.refresh_config(),
//!     ));
//!
//!     coordinator.first_refresh().await?;
//!     coordinator.start().await;
//!
//!     let state = AppState::new(Arc::clone(&coordinator), config.api.clone());
//!     serve(state, &config.api).await?;
//!     coordinator.shutdown().await;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Sensor routes
        .route("/sensors", get(routes::sensors::list_sensors))
        .route("/sensors/:key", get(routes::sensors::get_sensor))
        .route("/device", get(routes::sensors::get_device))
        // Refresh routes
        .route("/refresh", post(routes::refresh::trigger_refresh))
        .route("/refresh/status", get(routes::refresh::get_refresh_status));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server and run until a shutdown signal arrives
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("WakaTime sensors API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("WakaTime sensors API shut down gracefully");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
