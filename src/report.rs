//! Rendered projections of the snapshot: a markdown status report and the
//! HTML page used by serve mode. Both are read-only views; the snapshot
//! JSON stays the only machine contract.

use std::path::Path;

use askama::Template;
use thiserror::Error;

use crate::classify::Verdict;
use crate::snapshot::{ServiceReport, Snapshot};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("rendering report: {0}")]
    Render(#[from] askama::Error),
    #[error("writing report: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Template)]
#[template(path = "report.md", escape = "none")]
struct ReportTemplate<'a> {
    last_updated: &'a str,
    fleet_score: f64,
    rows: Vec<Row>,
}

#[derive(Template)]
#[template(path = "status.html")]
struct StatusPageTemplate<'a> {
    last_updated: &'a str,
    fleet_score: f64,
    rows: Vec<Row>,
}

/// Per-service presentation row shared by both templates.
struct Row {
    name: String,
    color: String,
    status: &'static str,
    emoji: &'static str,
    uptime_percent: f64,
    renewal: String,
    bar: String,
}

fn rows(snapshot: &Snapshot) -> Vec<Row> {
    snapshot
        .services
        .iter()
        .map(|svc| Row {
            name: svc.name.clone(),
            color: svc.color.clone(),
            status: svc.status.label(),
            emoji: emoji(svc.status),
            uptime_percent: svc.uptime_percent,
            renewal: renewal_text(svc),
            bar: bar(svc.uptime_percent),
        })
        .collect()
}

fn emoji(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Active => "🟢",
        Verdict::Degraded => "🟡",
        Verdict::Inactive => "🔴",
    }
}

fn renewal_text(svc: &ServiceReport) -> String {
    if svc.renewal_error.is_some() {
        return format!("{} (unparseable)", svc.renewal_date);
    }
    match svc.days_remaining {
        None => "unlimited".to_string(),
        Some(0) => format!("{} (due today)", svc.renewal_date),
        Some(d) if d > 0 => format!("{} ({d} days left)", svc.renewal_date),
        Some(d) => format!("{} ({} days overdue)", svc.renewal_date, -d),
    }
}

/// 20-cell uptime bar, `█` for health and `░` for the rest.
fn bar(uptime_percent: f64) -> String {
    const WIDTH: usize = 20;
    let filled = ((uptime_percent / 100.0) * WIDTH as f64).round() as usize;
    let filled = filled.min(WIDTH);
    let mut s = "█".repeat(filled);
    s.push_str(&"░".repeat(WIDTH - filled));
    s
}

/// Render the markdown status report.
pub fn render_markdown(snapshot: &Snapshot) -> Result<String, ReportError> {
    let template = ReportTemplate {
        last_updated: &snapshot.last_updated,
        fleet_score: snapshot.fleet_score,
        rows: rows(snapshot),
    };
    Ok(template.render()?)
}

/// Render the HTML status page.
pub fn render_html(snapshot: &Snapshot) -> Result<String, ReportError> {
    let template = StatusPageTemplate {
        last_updated: &snapshot.last_updated,
        fleet_score: snapshot.fleet_score,
        rows: rows(snapshot),
    };
    Ok(template.render()?)
}

/// Render and write the markdown report.
pub fn write_markdown<P: AsRef<Path>>(snapshot: &Snapshot, path: P) -> Result<(), ReportError> {
    let body = render_markdown(snapshot)?;
    std::fs::write(path, body)?;
    Ok(())
}
