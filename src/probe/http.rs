//! HTTP page fetch implementation.

use std::time::Duration;

use super::ProbeError;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; statuspulse/0.1; monitoring)";

/// A fetched page: HTTP status plus the decoded body.
///
/// Non-2xx responses are returned as pages, not errors: the upstream edge
/// serves its rate-limit and worker-error markers on error pages, and the
/// classifier needs to see them.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: u16,
    pub body: String,
}

/// Fetch a page body for classification.
pub async fn fetch_page(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<PageResponse, ProbeError> {
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                ProbeError::Timeout(timeout)
            } else {
                ProbeError::Network(e.to_string())
            }
        })?;

    let status = response.status().as_u16();

    let bytes = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            ProbeError::Timeout(timeout)
        } else {
            ProbeError::Network(e.to_string())
        }
    })?;

    let body = String::from_utf8(bytes.to_vec()).map_err(|e| ProbeError::Decode(e.to_string()))?;

    Ok(PageResponse { status, body })
}
