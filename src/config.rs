//! Configuration module for statuspulse.
//!
//! Runtime knobs come from environment variables with sensible defaults;
//! the monitored service list comes from a JSON file.

use std::collections::HashSet;
use std::env;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::history::GlobalBucketing;

/// Configuration error types. All of these are fatal: a run must not start
/// against a missing or inconsistent service list.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading service list {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing service list {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid service list: {0}")]
    Invalid(String),
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to the service list JSON (default: "services.json")
    pub services_path: String,
    /// Path of the persisted snapshot (default: "data/status.json")
    pub snapshot_path: String,
    /// Path of the rendered markdown report (default: "STATUS.md")
    pub report_path: String,
    /// HTTP port for serve mode (default: 8080)
    pub http_port: u16,
    /// Per-service rolling history bound (default: 30)
    pub history_limit: usize,
    /// Global fleet-score series bound (default: 60)
    pub global_history_limit: usize,
    /// Per-probe timeout in seconds (default: 10)
    pub probe_timeout_secs: u64,
    /// Global series cadence (default: one point per run)
    pub global_bucketing: GlobalBucketing,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            services_path: "services.json".to_string(),
            snapshot_path: "data/status.json".to_string(),
            report_path: "STATUS.md".to_string(),
            http_port: 8080,
            history_limit: 30,
            global_history_limit: 60,
            probe_timeout_secs: 10,
            global_bucketing: GlobalBucketing::PerRun,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STATUSPULSE_SERVICES`: service list path
    /// - `STATUSPULSE_SNAPSHOT_PATH`: snapshot file path
    /// - `STATUSPULSE_REPORT_PATH`: markdown report path
    /// - `STATUSPULSE_HTTP_PORT`: serve-mode HTTP port
    /// - `STATUSPULSE_HISTORY_LIMIT`: per-service history bound
    /// - `STATUSPULSE_GLOBAL_HISTORY_LIMIT`: global series bound
    /// - `STATUSPULSE_PROBE_TIMEOUT_SECS`: per-probe timeout
    /// - `STATUSPULSE_GLOBAL_BUCKETING`: "run" or "day"
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Ok(path) = env::var("STATUSPULSE_SERVICES") {
            cfg.services_path = path;
        }
        if let Ok(path) = env::var("STATUSPULSE_SNAPSHOT_PATH") {
            cfg.snapshot_path = path;
        }
        if let Ok(path) = env::var("STATUSPULSE_REPORT_PATH") {
            cfg.report_path = path;
        }
        if let Ok(port_str) = env::var("STATUSPULSE_HTTP_PORT") {
            if let Ok(port) = port_str.parse() {
                cfg.http_port = port;
            }
        }
        if let Ok(s) = env::var("STATUSPULSE_HISTORY_LIMIT") {
            if let Ok(limit) = s.parse() {
                cfg.history_limit = limit;
            }
        }
        if let Ok(s) = env::var("STATUSPULSE_GLOBAL_HISTORY_LIMIT") {
            if let Ok(limit) = s.parse() {
                cfg.global_history_limit = limit;
            }
        }
        if let Ok(s) = env::var("STATUSPULSE_PROBE_TIMEOUT_SECS") {
            if let Ok(secs) = s.parse() {
                cfg.probe_timeout_secs = secs;
            }
        }
        if let Ok(s) = env::var("STATUSPULSE_GLOBAL_BUCKETING") {
            if s.eq_ignore_ascii_case("day") {
                cfg.global_bucketing = GlobalBucketing::PerDay;
            }
        }

        cfg
    }
}

/// One monitored service. Unknown JSON fields are ignored; missing
/// required fields fail the load.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Jalali `YYYY/MM/DD` date or "unlimited" / "نامحدود".
    pub renewal_date: String,
    /// Presentation-only accent color.
    pub color: String,
}

/// Load and validate the monitored service list.
pub fn load_services<P: AsRef<Path>>(path: P) -> Result<Vec<ServiceConfig>, ConfigError> {
    let path_str = path.as_ref().display().to_string();
    let raw = std::fs::read(path.as_ref()).map_err(|source| ConfigError::Io {
        path: path_str.clone(),
        source,
    })?;
    let services: Vec<ServiceConfig> =
        serde_json::from_slice(&raw).map_err(|source| ConfigError::Parse {
            path: path_str,
            source,
        })?;

    let mut seen = HashSet::new();
    for svc in &services {
        if svc.id.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "service {:?} has an empty id",
                svc.name
            )));
        }
        if svc.url.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "service {:?} has an empty url",
                svc.id
            )));
        }
        if !seen.insert(svc.id.clone()) {
            return Err(ConfigError::Invalid(format!(
                "duplicate service id {:?}",
                svc.id
            )));
        }
    }

    Ok(services)
}
