//! Run orchestrator: one invocation probes the whole fleet and replaces
//! the persisted snapshot.
//!
//! A run moves through load, probe, aggregate, persist. Loading never
//! fails the run (missing or corrupt prior state resets the affected
//! histories); probing isolates endpoints from one another; only failing
//! to persist the new snapshot is fatal.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::classify::{classify, Verdict};
use crate::config::{ServerConfig, ServiceConfig};
use crate::history::{self, GlobalBucketing};
use crate::jalali;
use crate::probe;
use crate::snapshot::{ServiceReport, Snapshot, SnapshotError, SnapshotStore};
use crate::stats;

/// Probes in flight at once.
const MAX_CONCURRENT_PROBES: usize = 5;

/// Run error types.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("persisting snapshot: {0}")]
    Persist(#[from] SnapshotError),
}

/// Tunables for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub history_limit: usize,
    pub global_history_limit: usize,
    pub probe_timeout: Duration,
    pub global_bucketing: GlobalBucketing,
}

impl RunOptions {
    pub fn from_config(cfg: &ServerConfig) -> Self {
        Self {
            history_limit: cfg.history_limit,
            global_history_limit: cfg.global_history_limit,
            probe_timeout: Duration::from_secs(cfg.probe_timeout_secs),
            global_bucketing: cfg.global_bucketing,
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

/// Orchestrates a single monitoring pass.
pub struct Runner {
    services: Vec<ServiceConfig>,
    store: SnapshotStore,
    client: reqwest::Client,
    opts: RunOptions,
}

impl Runner {
    pub fn new(services: Vec<ServiceConfig>, store: SnapshotStore, opts: RunOptions) -> Self {
        Self {
            services,
            store,
            client: reqwest::Client::new(),
            opts,
        }
    }

    /// Execute one run at the given instant and return the persisted
    /// snapshot.
    pub async fn execute(&self, now: DateTime<Utc>) -> Result<Snapshot, RunError> {
        let prior = match self.store.load() {
            Ok(Some(snapshot)) => Some(snapshot),
            Ok(None) => {
                tracing::info!(
                    "no prior snapshot at {}, starting with empty histories",
                    self.store.path().display()
                );
                None
            }
            Err(e) => {
                tracing::warn!("discarding unusable prior snapshot, histories reset: {e}");
                None
            }
        };

        let mut histories = history::carry_forward(prior.as_ref(), &self.services);
        let mut global_history = prior.map(|s| s.global_history).unwrap_or_default();

        tracing::info!("probing {} services", self.services.len());
        let verdicts = self.probe_all().await;

        let today = jalali::tehran_today(now);
        let mut reports = Vec::with_capacity(self.services.len());
        for (svc, verdict) in self.services.iter().zip(&verdicts) {
            let series = histories.entry(svc.id.clone()).or_default();
            history::append_bounded(series, *verdict, self.opts.history_limit);

            let (days_remaining, renewal_error) =
                match jalali::days_remaining(&svc.renewal_date, today) {
                    Ok(days) => (days, None),
                    Err(e) => {
                        tracing::warn!("service {}: unusable renewal date: {e}", svc.id);
                        (None, Some(e.to_string()))
                    }
                };

            reports.push(ServiceReport {
                id: svc.id.clone(),
                name: svc.name.clone(),
                url: svc.url.clone(),
                color: svc.color.clone(),
                status: *verdict,
                weight: verdict.weight(),
                uptime_percent: stats::uptime_percent(series),
                renewal_date: svc.renewal_date.clone(),
                days_remaining,
                renewal_error,
                history: series.clone(),
            });
        }

        let fleet_score = stats::fleet_score(&verdicts);
        let global_key = match self.opts.global_bucketing {
            GlobalBucketing::PerRun => jalali::format_timestamp(now),
            GlobalBucketing::PerDay => jalali::day_key(now),
        };
        history::record_global(
            &mut global_history,
            global_key,
            fleet_score,
            self.opts.global_history_limit,
            self.opts.global_bucketing,
        );

        let snapshot = Snapshot {
            last_updated: jalali::format_timestamp(now),
            generated_at: now,
            fleet_score,
            services: reports,
            global_history,
        };
        self.store.save(&snapshot)?;

        tracing::info!(
            "run complete: fleet score {fleet_score}%, snapshot at {}",
            self.store.path().display()
        );
        Ok(snapshot)
    }

    /// Probe every service concurrently. One verdict per configured
    /// service, in configuration order; any failure — transport error,
    /// undecodable body, even a panicked task — yields `Inactive` for
    /// that service alone.
    async fn probe_all(&self) -> Vec<Verdict> {
        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_PROBES));
        let mut tasks = JoinSet::new();

        for (idx, svc) in self.services.iter().enumerate() {
            let client = self.client.clone();
            let semaphore = semaphore.clone();
            let id = svc.id.clone();
            let url = svc.url.clone();
            let timeout = self.opts.probe_timeout;

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let verdict = match probe::run_probe(&client, &url, timeout).await {
                    Ok(page) => classify(&page.body, Some(page.status)),
                    Err(e) => {
                        tracing::warn!("probe failed for {id}: {e}");
                        classify("", None)
                    }
                };
                tracing::debug!("service {id}: {}", verdict.label());
                (idx, verdict)
            });
        }

        let mut verdicts = vec![Verdict::Inactive; self.services.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, verdict)) => verdicts[idx] = verdict,
                Err(e) => tracing::error!("probe task failed: {e}"),
            }
        }
        verdicts
    }
}
