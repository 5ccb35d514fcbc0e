//! Refresh Coordinator
//!
//! Drives periodic snapshot production and fans each outcome out to
//! subscribers. A cycle fetches all five payloads one after another under a
//! single shared deadline; either every payload lands in a new snapshot or
//! the previous snapshot stays current.

use super::snapshot::Snapshot;
use crate::client::{ClientError, TimeTrackingApi};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Configuration for refresh behavior
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Time between scheduled refreshes
    pub update_interval: Duration,
    /// Deadline covering all five fetches of one cycle
    pub timeout: Duration,
    /// Capacity of the subscriber channel
    pub event_capacity: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_secs(30 * 60),
            timeout: Duration::from_secs(10),
            event_capacity: 16,
        }
    }
}

/// Outcome of one refresh cycle, as seen by subscribers
#[derive(Debug, Clone)]
pub enum RefreshEvent {
    /// A complete snapshot replaced the previous one
    Published(Arc<Snapshot>),
    /// The cycle failed; the previous snapshot is still current
    Failed {
        error: RefreshError,
        at: DateTime<Utc>,
    },
}

/// Why a refresh cycle failed
#[derive(Debug, Clone, thiserror::Error)]
pub enum RefreshError {
    #[error("Timed out after {0:?} fetching WakaTime data")]
    Timeout(Duration),

    #[error("Error communicating with API: {0}")]
    Client(#[source] Arc<ClientError>),

    #[error("Coordinator has been shut down")]
    ShutDown,
}

impl From<ClientError> for RefreshError {
    fn from(err: ClientError) -> Self {
        RefreshError::Client(Arc::new(err))
    }
}

/// Where the coordinator is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPhase {
    Idle,
    Refreshing,
}

/// Result of the most recent finished cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOutcome {
    Published,
    Failed,
}

/// Current state of the coordinator
#[derive(Debug, Clone, Serialize)]
pub struct RefreshStatus {
    pub phase: RefreshPhase,
    pub last_outcome: Option<RefreshOutcome>,
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub last_duration_ms: Option<u64>,
    pub consecutive_failures: u32,
    pub cycles: u64,
}

impl Default for RefreshStatus {
    fn default() -> Self {
        Self {
            phase: RefreshPhase::Idle,
            last_outcome: None,
            last_attempt: None,
            last_success: None,
            last_error: None,
            last_duration_ms: None,
            consecutive_failures: 0,
            cycles: 0,
        }
    }
}

impl RefreshStatus {
    /// True until a cycle has published, and after any failed cycle
    pub fn is_stale(&self) -> bool {
        self.last_outcome != Some(RefreshOutcome::Published)
    }
}

/// Polls the API on a fixed period and publishes snapshots
pub struct RefreshCoordinator {
    client: Arc<dyn TimeTrackingApi>,
    config: RefreshConfig,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    status: RwLock<RefreshStatus>,
    events: broadcast::Sender<RefreshEvent>,
    /// Held for the duration of a cycle so cycles never interleave
    cycle: Mutex<()>,
    task: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl RefreshCoordinator {
    /// Create a new coordinator around an API client
    pub fn new(client: Arc<dyn TimeTrackingApi>, config: RefreshConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            client,
            config,
            snapshot: RwLock::new(None),
            status: RwLock::new(RefreshStatus::default()),
            events,
            cycle: Mutex::new(()),
            task: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Get the current configuration
    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Subscribe to refresh outcomes
    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.events.subscribe()
    }

    /// The last complete snapshot, if any
    pub async fn current(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().await.clone()
    }

    /// Get current refresh status
    pub async fn status(&self) -> RefreshStatus {
        self.status.read().await.clone()
    }

    /// Run the startup refresh.
    ///
    /// Failure here means setup failed; the error is handed back to the
    /// caller instead of being retried.
    pub async fn first_refresh(&self) -> Result<Arc<Snapshot>, RefreshError> {
        self.refresh().await.map_err(|e| {
            tracing::error!(error = %e, "Initial WakaTime refresh failed");
            e
        })
    }

    /// Run one refresh cycle
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, RefreshError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(RefreshError::ShutDown);
        }

        let _cycle = self.cycle.lock().await;
        let start = Instant::now();

        {
            let mut status = self.status.write().await;
            status.phase = RefreshPhase::Refreshing;
            status.last_attempt = Some(Utc::now());
        }

        let result = match self.fetch_snapshot().await {
            Ok(snapshot) => self.publish(snapshot).await,
            Err(e) => Err(e),
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(snapshot) => {
                {
                    let mut status = self.status.write().await;
                    status.phase = RefreshPhase::Idle;
                    status.last_outcome = Some(RefreshOutcome::Published);
                    status.last_success = Some(snapshot.fetched_at);
                    status.last_error = None;
                    status.last_duration_ms = Some(duration_ms);
                    status.consecutive_failures = 0;
                    status.cycles += 1;
                }

                let empty = snapshot.empty_payloads();
                if !empty.is_empty() {
                    tracing::warn!(empty = ?empty, "WakaTime refresh completed with empty payloads");
                }
                tracing::info!(duration_ms, "WakaTime refresh completed");

                let _ = self.events.send(RefreshEvent::Published(Arc::clone(&snapshot)));
                Ok(snapshot)
            }
            Err(RefreshError::ShutDown) => {
                // Teardown is not a failed cycle
                self.status.write().await.phase = RefreshPhase::Idle;
                tracing::debug!(duration_ms, "WakaTime refresh dropped by shutdown");
                Err(RefreshError::ShutDown)
            }
            Err(e) => {
                {
                    let mut status = self.status.write().await;
                    status.phase = RefreshPhase::Idle;
                    status.last_outcome = Some(RefreshOutcome::Failed);
                    status.last_error = Some(e.to_string());
                    status.last_duration_ms = Some(duration_ms);
                    status.consecutive_failures += 1;
                    status.cycles += 1;
                }

                tracing::warn!(error = %e, duration_ms, "WakaTime refresh failed");

                let _ = self.events.send(RefreshEvent::Failed {
                    error: e.clone(),
                    at: Utc::now(),
                });
                Err(e)
            }
        }
    }

    /// Swap in a new snapshot unless the coordinator was shut down.
    ///
    /// `closed` is checked under the write guard, so a completed
    /// [`shutdown`](Self::shutdown) can never be followed by a store.
    async fn publish(&self, snapshot: Snapshot) -> Result<Arc<Snapshot>, RefreshError> {
        let mut current = self.snapshot.write().await;
        if self.closed.load(Ordering::SeqCst) {
            return Err(RefreshError::ShutDown);
        }

        let snapshot = Arc::new(snapshot);
        *current = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Fetch all five payloads under one deadline
    async fn fetch_snapshot(&self) -> Result<Snapshot, RefreshError> {
        let client = &self.client;

        let batch = async {
            let summary = client.summary().await?;
            let stats = client.stats().await?;
            let user_info = client.user_info().await?;
            let last_7_days = client.last_7_days().await?;
            let all_time = client.all_time_since_today().await?;

            Ok::<_, ClientError>(Snapshot {
                summary,
                stats,
                user_info,
                last_7_days,
                all_time,
                fetched_at: Utc::now(),
            })
        };

        match tokio::time::timeout(self.config.timeout, batch).await {
            Ok(result) => result.map_err(RefreshError::from),
            Err(_) => Err(RefreshError::Timeout(self.config.timeout)),
        }
    }

    /// Start the periodic refresh task.
    ///
    /// The first tick fires one interval from now; call
    /// [`first_refresh`](Self::first_refresh) beforehand for the startup
    /// cycle.
    pub async fn start(self: &Arc<Self>) {
        tracing::info!(
            interval_secs = self.config.update_interval.as_secs(),
            "Starting WakaTime periodic refresh"
        );

        let coordinator = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(coordinator.config.update_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // Skip the first immediate tick
            ticker.tick().await;

            loop {
                ticker.tick().await;

                tracing::debug!("Running scheduled WakaTime refresh");
                if let Err(e) = coordinator.refresh().await {
                    if matches!(e, RefreshError::ShutDown) {
                        break;
                    }
                    tracing::error!(error = %e, "Scheduled WakaTime refresh failed, keeping last snapshot");
                }
            }
        });

        if let Some(previous) = self.task.lock().await.replace(handle) {
            previous.abort();
        }
    }

    /// Tear down: stop the timer, cancel any in-flight scheduled cycle and
    /// discard the current snapshot
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);

        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
        }

        self.snapshot.write().await.take();
        self.status.write().await.phase = RefreshPhase::Idle;

        tracing::info!("WakaTime coordinator shut down");
    }

    /// Whether [`shutdown`](Self::shutdown) has been called
    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
