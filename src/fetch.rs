//! Live page fetching into a content record

use std::time::Duration;

use anyhow::{Context, Result};
use pageaudit_core::{ContentRecord, Headers};
use reqwest::Client;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// GET the page and capture body and response headers
pub async fn fetch_record(url: &str) -> Result<ContentRecord> {
    let client = Client::builder()
        .user_agent(format!(
            "Mozilla/5.0 (compatible; pageaudit/{})",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed to fetch {}", url))?
        .error_for_status()
        .with_context(|| format!("non-success status from {}", url))?;

    let headers: Headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
        .collect();

    let html = response
        .text()
        .await
        .with_context(|| format!("failed to read response body from {}", url))?;

    tracing::info!(url, bytes = html.len(), "fetched page");

    Ok(ContentRecord {
        html_content: Some(html),
        headers,
        ..ContentRecord::new(url)
    })
}
