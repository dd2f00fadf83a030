//! Content-based health classification.
//!
//! Maps a fetched page body (and HTTP status, when one was obtained) to a
//! health verdict by case-insensitive token search, first match wins.

use serde::{Deserialize, Serialize};

/// Health verdict for a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Service is fully operational.
    Active,
    /// Service is up but overloaded or rate-limited.
    Degraded,
    /// Service is unreachable or in an unrecognized state.
    Inactive,
}

impl Verdict {
    /// Numeric weight used by all aggregation. Aggregation results depend
    /// on this mapping staying exactly active=1.0, degraded=0.5,
    /// inactive=0.0.
    pub fn weight(self) -> f64 {
        match self {
            Verdict::Active => 1.0,
            Verdict::Degraded => 0.5,
            Verdict::Inactive => 0.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::Active => "active",
            Verdict::Degraded => "degraded",
            Verdict::Inactive => "inactive",
        }
    }
}

/// Page markers that indicate a live service behind an auth wall.
const LOGIN_MARKERS: [&str; 4] = ["login", "username", "password", "sign in"];

/// Classify a response body.
///
/// `status` is the HTTP status when the page could be fetched at all; a
/// transport failure is represented by an empty body and `None`, which
/// falls through every rule to `Inactive`.
pub fn classify(body: &str, status: Option<u16>) -> Verdict {
    let body = body.to_lowercase();

    if body.contains("panel") {
        Verdict::Active
    } else if body.contains("rate") || body.contains("1027") {
        Verdict::Degraded
    } else if body.contains("1101") {
        Verdict::Inactive
    } else if status == Some(200) && LOGIN_MARKERS.iter().any(|m| body.contains(m)) {
        // A login page is still evidence of a live service.
        Verdict::Active
    } else {
        Verdict::Inactive
    }
}
