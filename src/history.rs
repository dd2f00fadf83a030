//! Bounded rolling history series.
//!
//! Series are chronological, oldest first, and physically a sliding
//! window: appending past the bound drops entries from the front, never
//! the back, and never reorders what remains.

use std::collections::HashMap;

use crate::classify::Verdict;
use crate::config::ServiceConfig;
use crate::snapshot::{GlobalPoint, Snapshot};

/// Cadence of the global fleet-score series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlobalBucketing {
    /// One point per run.
    #[default]
    PerRun,
    /// One point per Tehran-local calendar day; reruns within the same day
    /// overwrite that day's score.
    PerDay,
}

/// Build each configured service's starting series from the previous
/// snapshot. Services absent from it (or all of them, when there is no
/// usable snapshot) start empty.
pub fn carry_forward(
    prior: Option<&Snapshot>,
    services: &[ServiceConfig],
) -> HashMap<String, Vec<Verdict>> {
    services
        .iter()
        .map(|svc| {
            let series = prior
                .and_then(|s| s.services.iter().find(|r| r.id == svc.id))
                .map(|r| r.history.clone())
                .unwrap_or_default();
            (svc.id.clone(), series)
        })
        .collect()
}

/// Append a value, then truncate from the front down to `bound`. Handles
/// arbitrary pre-existing excess (for example after the bound was lowered
/// between runs) by dropping exactly `len - bound` oldest entries.
pub fn append_bounded<T>(series: &mut Vec<T>, value: T, bound: usize) {
    series.push(value);
    if bound > 0 && series.len() > bound {
        let excess = series.len() - bound;
        series.drain(..excess);
    }
}

/// Record a fleet-score point on the global series under the configured
/// cadence. `key` must already match the cadence (timestamp label per run,
/// date key per day).
pub fn record_global(
    series: &mut Vec<GlobalPoint>,
    key: String,
    score: f64,
    bound: usize,
    bucketing: GlobalBucketing,
) {
    if bucketing == GlobalBucketing::PerDay {
        if let Some(last) = series.last_mut() {
            if last.at == key {
                last.score = score;
                return;
            }
        }
    }
    append_bounded(series, GlobalPoint { at: key, score }, bound);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Verdict::*;

    fn svc(id: &str) -> ServiceConfig {
        ServiceConfig {
            id: id.to_string(),
            name: id.to_string(),
            url: format!("https://{id}.example.com/panel"),
            renewal_date: "unlimited".to_string(),
            color: "#FFFFFF".to_string(),
        }
    }

    #[test]
    fn append_within_bound_grows_by_one() {
        let mut series = vec![Active, Active, Degraded];
        append_bounded(&mut series, Active, 20);
        assert_eq!(series, vec![Active, Active, Degraded, Active]);
    }

    #[test]
    fn append_at_bound_slides_the_window() {
        let mut series = vec![Inactive, Active, Active];
        append_bounded(&mut series, Degraded, 3);
        assert_eq!(series, vec![Active, Active, Degraded]);
    }

    #[test]
    fn append_drops_arbitrary_excess() {
        // A bound lowered between runs leaves an oversized series behind.
        let mut series: Vec<u32> = (0..10).collect();
        append_bounded(&mut series, 10, 4);
        assert_eq!(series, vec![7, 8, 9, 10]);
    }

    #[test]
    fn repeated_appends_keep_suffix_order() {
        let bound = 5;
        let mut series: Vec<u32> = Vec::new();
        for k in 0..12 {
            append_bounded(&mut series, k, bound);
            assert_eq!(series.len(), usize::min(bound, k as usize + 1));
        }
        assert_eq!(series, vec![7, 8, 9, 10, 11]);
    }

    #[test]
    fn carry_forward_without_prior_state_is_empty() {
        let services = [svc("a"), svc("b")];
        let map = carry_forward(None, &services);
        assert_eq!(map.len(), 2);
        assert!(map["a"].is_empty());
        assert!(map["b"].is_empty());
    }

    #[test]
    fn carry_forward_keeps_known_and_resets_new() {
        let services = [svc("a"), svc("b")];
        let mut prior_services = Vec::new();
        {
            // Only "a" existed last run.
            let mut report = sample_report("a");
            report.history = vec![Active, Degraded];
            prior_services.push(report);
        }
        let prior = Snapshot {
            last_updated: String::new(),
            generated_at: chrono::Utc::now(),
            fleet_score: 0.0,
            services: prior_services,
            global_history: Vec::new(),
        };

        let map = carry_forward(Some(&prior), &services);
        assert_eq!(map["a"], vec![Active, Degraded]);
        assert!(map["b"].is_empty());
    }

    #[test]
    fn global_per_run_always_appends() {
        let mut series = Vec::new();
        record_global(&mut series, "1404/01/01 10:00".into(), 50.0, 3, GlobalBucketing::PerRun);
        record_global(&mut series, "1404/01/01 10:10".into(), 75.0, 3, GlobalBucketing::PerRun);
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].score, 75.0);
    }

    #[test]
    fn global_per_day_overwrites_same_day() {
        let mut series = Vec::new();
        record_global(&mut series, "1404/01/01".into(), 50.0, 3, GlobalBucketing::PerDay);
        record_global(&mut series, "1404/01/01".into(), 75.0, 3, GlobalBucketing::PerDay);
        record_global(&mut series, "1404/01/02".into(), 25.0, 3, GlobalBucketing::PerDay);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].score, 75.0);
        assert_eq!(series[1].score, 25.0);
    }

    #[test]
    fn global_series_respects_its_bound() {
        let mut series = Vec::new();
        for day in 1..=5 {
            record_global(
                &mut series,
                format!("1404/01/{day:02}"),
                day as f64,
                3,
                GlobalBucketing::PerDay,
            );
        }
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].at, "1404/01/03");
    }

    fn sample_report(id: &str) -> crate::snapshot::ServiceReport {
        crate::snapshot::ServiceReport {
            id: id.to_string(),
            name: id.to_string(),
            url: String::new(),
            color: String::new(),
            status: Inactive,
            weight: 0.0,
            uptime_percent: 0.0,
            renewal_date: "unlimited".to_string(),
            days_remaining: None,
            renewal_error: None,
            history: Vec::new(),
        }
    }
}
