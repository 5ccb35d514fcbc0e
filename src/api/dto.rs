//! Data Transfer Objects
//!
//! Response types for the API endpoints.

use crate::sensors::SensorState;
use serde::Serialize;

// ============================================
// SENSOR DTOs
// ============================================

/// All sensors evaluated against the current snapshot
#[derive(Debug, Serialize)]
pub struct SensorsResponse {
    /// When the current snapshot was fetched (RFC 3339)
    pub fetched_at: Option<String>,
    /// Whether the last refresh failed or none has succeeded yet
    pub stale: bool,
    pub sensors: Vec<SensorState>,
}

// ============================================
// REFRESH DTOs
// ============================================

/// Result of a manually triggered refresh
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// "success" or "failed"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy", "degraded" or "unhealthy"
    pub status: String,
    pub stale: bool,
    pub last_success: Option<String>,
    pub consecutive_failures: u32,
    pub uptime_seconds: u64,
    pub version: String,
}
