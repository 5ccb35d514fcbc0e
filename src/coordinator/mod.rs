//! Refresh Coordination
//!
//! Owns the polling loop between the WakaTime API and the sensor views.
//!
//! ## Architecture
//!
//! - **Snapshot**: immutable bundle of the five raw payloads
//! - **RefreshCoordinator**: runs refresh cycles and publishes outcomes
//!
//! ## Data Flow
//!
//! 1. The timer (or a startup/manual request) starts a cycle
//! 2. The coordinator fetches all payloads under one deadline
//! 3. A complete snapshot replaces the previous one in a single swap
//! 4. Subscribers receive `Published` or `Failed`

mod refresh;
mod snapshot;

pub use refresh::{
    RefreshConfig, RefreshCoordinator, RefreshError, RefreshEvent, RefreshOutcome, RefreshPhase,
    RefreshStatus,
};
pub use snapshot::{Snapshot, SnapshotKey};
