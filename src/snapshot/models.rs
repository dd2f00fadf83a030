//! Snapshot model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::Verdict;

/// The full output of one monitoring run. Written as a whole each run;
/// history is carried forward by merging, not by keeping old snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Tehran-local Jalali timestamp, `YYYY/MM/DD HH:MM`.
    pub last_updated: String,
    /// Machine-readable instant of the same run.
    pub generated_at: DateTime<Utc>,
    /// Fleet-wide health score in [0, 100].
    pub fleet_score: f64,
    pub services: Vec<ServiceReport>,
    /// Rolling fleet-score series, oldest first.
    pub global_history: Vec<GlobalPoint>,
}

/// Per-service result within a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceReport {
    pub id: String,
    pub name: String,
    pub url: String,
    pub color: String,
    pub status: Verdict,
    /// Health weight of `status`.
    pub weight: f64,
    /// Rolling-history health percentage in [0, 100].
    pub uptime_percent: f64,
    /// Configured renewal date string (Jalali date or "unlimited").
    pub renewal_date: String,
    /// Signed days until renewal; absent for no-expiry services and for
    /// unparseable renewal dates (see `renewal_error`).
    pub days_remaining: Option<i64>,
    /// Set when the configured renewal date could not be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_error: Option<String>,
    /// Rolling verdict series, oldest first, bounded.
    pub history: Vec<Verdict>,
}

/// One point of the global fleet-score series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalPoint {
    /// Tehran-local Jalali label: a full timestamp in per-run mode, a date
    /// key in per-day mode.
    pub at: String,
    pub score: f64,
}
