//! statuspulse - service fleet health monitor.
//!
//! Each `run` invocation (typically fired by cron or a CI schedule)
//! probes the configured services, folds the verdicts into the persisted
//! rolling histories, and replaces the snapshot plus a rendered markdown
//! report. `serve` exposes the snapshot as a small status page.

mod classify;
mod config;
mod history;
mod jalali;
mod probe;
mod report;
mod run;
mod snapshot;
mod stats;
mod web;

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::ServerConfig;
use run::{RunOptions, Runner};
use snapshot::SnapshotStore;
use web::Server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("statuspulse=info".parse()?),
        )
        .init();

    let cfg = ServerConfig::load();
    let mode = std::env::args().nth(1).unwrap_or_else(|| "run".to_string());

    match mode.as_str() {
        "run" => run_once(cfg).await,
        "serve" => serve(cfg).await,
        other => {
            eprintln!("unknown mode {other:?}; expected \"run\" or \"serve\"");
            std::process::exit(2);
        }
    }
}

/// One monitoring pass: probe, aggregate, persist, render.
async fn run_once(cfg: ServerConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let services = config::load_services(&cfg.services_path)?;
    tracing::info!(
        "monitoring {} services from {}",
        services.len(),
        cfg.services_path
    );

    let store = SnapshotStore::new(&cfg.snapshot_path);
    let runner = Runner::new(services, store, RunOptions::from_config(&cfg));
    let snapshot = runner.execute(Utc::now()).await?;

    // The report is a best-effort projection; the snapshot is the contract.
    if let Err(e) = report::write_markdown(&snapshot, &cfg.report_path) {
        tracing::warn!("could not write report {}: {e}", cfg.report_path);
    }

    let (mut active, mut degraded, mut inactive) = (0u32, 0u32, 0u32);
    for svc in &snapshot.services {
        match svc.status {
            classify::Verdict::Active => active += 1,
            classify::Verdict::Degraded => degraded += 1,
            classify::Verdict::Inactive => inactive += 1,
        }
    }
    tracing::info!("active: {active}, degraded: {degraded}, inactive: {inactive}");

    Ok(())
}

/// Serve the persisted snapshot as a status page.
async fn serve(cfg: ServerConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!("serving status page on port {}", cfg.http_port);
    let store = SnapshotStore::new(&cfg.snapshot_path);
    let server = Server::new(cfg, store);
    server.start().await
}
