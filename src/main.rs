//! WakaTime Sensors Daemon
//!
//! Polls WakaTime on a fixed period and serves the derived sensors over HTTP.
//!
//! # Configuration
//!
//! Read from the first of:
//! - `$XDG_CONFIG_HOME/wakatime-sensors/config.toml`
//! - `/etc/wakatime-sensors/config.toml`
//! - `./config.toml`
//!
//! `WAKATIME_*` environment variables override file values; see
//! `wakatime-cli config` for the full list. `RUST_LOG` overrides the log
//! level.

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

use wakatime_sensors::api::{serve, AppState};
use wakatime_sensors::client::WakatimeClient;
use wakatime_sensors::config::Config;
use wakatime_sensors::coordinator::{RefreshCoordinator, RefreshEvent};
use wakatime_sensors::{logging, sensors};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();

    logging::init(&config.logging).context("Failed to initialize logging")?;

    tracing::info!("Starting WakaTime sensors v{}", env!("CARGO_PKG_VERSION"));

    config.validate()?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.coordinator.timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;
    let client = WakatimeClient::new(&config.wakatime.api_key, http, &config.wakatime.base_url);

    if client.is_compat() {
        tracing::info!("Using compatible API at {}", client.base_url());
    }

    let coordinator = Arc::new(RefreshCoordinator::new(
        Arc::new(client),
        config.coordinator.refresh_config(),
    ));

    // Setup fails if the first cycle does
    let snapshot = coordinator
        .first_refresh()
        .await
        .context("Initial WakaTime refresh failed")?;

    match snapshot.account() {
        Some(account) => tracing::info!(
            account = %account.email,
            id = %account.id,
            "Connected to WakaTime account"
        ),
        None => tracing::warn!("WakaTime profile carries no email; the API key may be invalid"),
    }

    coordinator.start().await;

    let listener = tokio::spawn(log_refresh_events(Arc::clone(&coordinator)));

    let state = AppState::new(Arc::clone(&coordinator), config.api.clone());
    let served = serve(state, &config.api).await;

    coordinator.shutdown().await;
    listener.abort();

    served?;

    tracing::info!("WakaTime sensors shutdown complete");
    Ok(())
}

/// Log every published view, and warn on failed cycles
async fn log_refresh_events(coordinator: Arc<RefreshCoordinator>) {
    let mut events = coordinator.subscribe();

    loop {
        match events.recv().await {
            Ok(RefreshEvent::Published(snapshot)) => {
                for sensor in sensors::evaluate_all(Some(&*snapshot)) {
                    let value = sensor
                        .value
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "unavailable".to_string());
                    tracing::debug!(sensor = %sensor.unique_id, %value, "Sensor updated");
                }
            }
            Ok(RefreshEvent::Failed { error, at }) => {
                tracing::warn!(error = %error, at = %at, "Sensors are stale");
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Refresh event listener lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
