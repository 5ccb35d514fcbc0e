//! # WakaTime Sensors
//!
//! Polls the WakaTime API (or a compatible self-hosted server) on a fixed
//! period and exposes nine derived coding-activity views over HTTP.
//!
//! ## Modules
//!
//! - [`client`]: Authenticated API client with compatibility URL rewriting
//! - [`coordinator`]: Periodic refresh with atomic snapshot publication
//! - [`sensors`]: Pure projections from a snapshot to sensor values
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//! - [`logging`]: Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wakatime_sensors::client::WakatimeClient;
//! use wakatime_sensors::coordinator::{RefreshConfig, RefreshCoordinator};
//! use wakatime_sensors::sensors;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WakatimeClient::hosted("waka_xxx", reqwest::Client::new());
//!     let coordinator = Arc::new(RefreshCoordinator::new(
//!         Arc::new(client),
//!         RefreshConfig::default(),
//!     ));
//!
//!     let snapshot = coordinator.first_refresh().await?;
//!     for sensor in sensors::evaluate_all(Some(&*snapshot)) {
//!         println!("{}: {:?}", sensor.unique_id, sensor.value);
//!     }
//!
//!     coordinator.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod logging;
pub mod sensors;

// Re-export top-level types for convenience
pub use client::{AccountInfo, ClientError, TimeTrackingApi, WakatimeClient};

pub use coordinator::{
    RefreshConfig, RefreshCoordinator, RefreshError, RefreshEvent, RefreshStatus, Snapshot,
    SnapshotKey,
};

pub use sensors::{DeviceInfo, SensorKey, SensorState, SensorValue};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig};
