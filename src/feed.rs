//! Traffic image feed client.
//!
//! One authenticated GET against the upstream API, returning every camera
//! under the response's `value` field. There are no retries: a failed
//! request is logged and reported as an empty list so the caller can
//! treat it as "no data".

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::models::CameraRecord;

#[derive(Deserialize)]
struct FeedResponse {
    /// Kept raw so one bad record does not sink the rest of the feed.
    value: Vec<serde_json::Value>,
}

/// Build the HTTP client shared by the feed and image downloads.
pub fn http_client(api: &ApiConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(api.timeout_secs))
        .build()
        .context("Failed to build HTTP client")
}

/// Fetch all cameras, or an empty list if anything goes wrong.
pub async fn fetch_cameras(
    client: &reqwest::Client,
    api: &ApiConfig,
    api_key: &str,
) -> Vec<CameraRecord> {
    match try_fetch_cameras(client, api, api_key).await {
        Ok(cameras) => {
            info!(count = cameras.len(), "fetched camera list");
            cameras
        }
        Err(e) => {
            warn!(url = %api.url, "Error fetching data from API: {:#}", e);
            Vec::new()
        }
    }
}

/// Fetch all cameras, surfacing the failure reason.
pub async fn try_fetch_cameras(
    client: &reqwest::Client,
    api: &ApiConfig,
    api_key: &str,
) -> Result<Vec<CameraRecord>> {
    let response = client
        .get(&api.url)
        .header("AccountKey", api_key)
        .header("accept", "application/json")
        .send()
        .await
        .with_context(|| format!("request to {} failed", api.url))?;

    let status = response.status();
    if !status.is_success() {
        let body_text = response.text().await.unwrap_or_default();
        bail!("traffic image API error {}: {}", status, body_text);
    }

    let body: FeedResponse = response
        .json()
        .await
        .context("malformed traffic image API response")?;

    Ok(parse_records(body.value))
}

/// Decode each camera on its own, skipping records that do not parse.
fn parse_records(values: Vec<serde_json::Value>) -> Vec<CameraRecord> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            match serde_json::from_value::<CameraRecord>(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(index, "skipping unreadable camera record: {}", e);
                    None
                }
            }
        })
        .collect()
}
