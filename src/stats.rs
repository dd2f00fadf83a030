//! Uptime and fleet-health aggregation.

use crate::classify::Verdict;

/// Percentage of full health represented by a verdict series, in [0, 100].
/// An empty series is 0.0 rather than an error.
pub fn uptime_percent(history: &[Verdict]) -> f64 {
    weighted_percent(history)
}

/// Fleet-wide health score from the current verdict of every endpoint, in
/// [0, 100]. An empty fleet is 0.0.
pub fn fleet_score(current: &[Verdict]) -> f64 {
    weighted_percent(current)
}

fn weighted_percent(verdicts: &[Verdict]) -> f64 {
    if verdicts.is_empty() {
        return 0.0;
    }
    let sum: f64 = verdicts.iter().map(|v| v.weight()).sum();
    round2(100.0 * sum / verdicts.len() as f64)
}

/// Round to 2 decimal places; every published percentage goes through this.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
