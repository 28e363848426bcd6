//! Heartbeat endpoint handler.
//!
//! Returns server status information: uptime, process memory and the colour
//! map registry size.

use axum::{extract::State, Json};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

use crate::colourmaps::presets;
use crate::state::AppState;

/// Server ID, unique per process
static SERVER_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Server start time
static START_TIME: Lazy<SystemTime> = Lazy::new(SystemTime::now);

/// Heartbeat response structure
#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    /// Server ID (unique per instance)
    pub server_id: String,
    /// Current timestamp (RFC 3339, millisecond precision)
    pub timestamp: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Process memory usage in bytes
    pub memory_usage_bytes: Option<u64>,
    /// Number of registered colour maps
    pub colourmap_count: usize,
    /// Number of built-in presets
    pub preset_count: usize,
    /// Sample table size used for new maps
    pub samples: usize,
    /// Server status
    pub status: String,
}

/// Record the start time; called once when the server starts
pub fn mark_started() {
    Lazy::force(&START_TIME);
}

/// Handle GET /heartbeat requests
pub async fn heartbeat_handler(State(state): State<Arc<AppState>>) -> Json<HeartbeatResponse> {
    let now = SystemTime::now();
    let timestamp = chrono::DateTime::<chrono::Utc>::from(now)
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let uptime = now.duration_since(*START_TIME).unwrap_or(Duration::ZERO);

    Json(HeartbeatResponse {
        server_id: SERVER_ID.clone(),
        timestamp,
        uptime_seconds: uptime.as_secs(),
        memory_usage_bytes: get_memory_usage(),
        colourmap_count: state.colourmap_count(),
        preset_count: presets::names().len(),
        samples: state.config.palette.samples,
        status: "healthy".to_string(),
    })
}

/// Get current process memory usage (Linux only)
fn get_memory_usage() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        // RSS is the second field of /proc/self/statm, in pages
        let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
        let pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
        Some(pages * 4096)
    }

    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}
