//! Probe module: fetches a service page for classification.

mod http;

pub use http::*;

use std::time::Duration;

use thiserror::Error;

/// Probe error types. Every variant downgrades to an inactive verdict at
/// the orchestrator; none aborts a run.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("response body is not valid UTF-8: {0}")]
    Decode(String),
}

/// Run a probe against the given URL.
pub async fn run_probe(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<PageResponse, ProbeError> {
    // Add jitter to avoid thundering herd
    let jitter = rand::random::<u64>() % 100;
    tokio::time::sleep(Duration::from_millis(jitter)).await;

    fetch_page(client, url, timeout).await
}
