//! Snapshot image download with validation.
//!
//! A response is only written to disk when its declared content type is an
//! image and the body is at least `min_bytes` long. Upstream serves small
//! placeholder payloads (and HTML error pages) with a 200 status once a
//! signed link expires, so the status code alone is not trusted.
//!
//! Every failure mode is converted into a [`DownloadOutcome`]; nothing
//! propagates past [`download_image`].

use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Result of one download attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub saved: bool,
    pub message: String,
}

impl DownloadOutcome {
    fn saved(message: String) -> Self {
        Self {
            saved: true,
            message,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            saved: false,
            message,
        }
    }
}

/// GET `url` and write the body to `dest` if it passes validation.
pub async fn download_image(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    min_bytes: u64,
) -> DownloadOutcome {
    match try_download(client, url, dest, min_bytes).await {
        Ok(len) => {
            debug!(url, dest = %dest.display(), bytes = len, "saved image");
            DownloadOutcome::saved(format!("Saved: {} ({} bytes)", dest.display(), len))
        }
        Err(e) => {
            warn!(url, "image download failed: {:#}", e);
            DownloadOutcome::failed(format!("Failed to download {}: {:#}", url, e))
        }
    }
}

async fn try_download(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    min_bytes: u64,
) -> Result<u64> {
    let response = client
        .get(url)
        .send()
        .await
        .context("request failed")?;

    let status = response.status();
    if !status.is_success() {
        bail!("HTTP {}", status);
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let bytes = response.bytes().await.context("failed to read body")?;

    validate_image(content_type.as_deref(), bytes.len() as u64, min_bytes)?;

    std::fs::write(dest, &bytes)
        .with_context(|| format!("failed to write {}", dest.display()))?;

    verify_written(dest)
}

/// Check the declared content type and payload size.
pub fn validate_image(content_type: Option<&str>, len: u64, min_bytes: u64) -> Result<()> {
    let content_type = content_type.unwrap_or("").trim().to_ascii_lowercase();
    if !content_type.starts_with("image/") {
        bail!(
            "unexpected content type '{}'",
            if content_type.is_empty() {
                "<none>"
            } else {
                content_type.as_str()
            }
        );
    }
    if len < min_bytes {
        bail!("payload too small: {} bytes (minimum {})", len, min_bytes);
    }
    Ok(())
}

fn verify_written(dest: &Path) -> Result<u64> {
    let len = std::fs::metadata(dest)
        .with_context(|| format!("{} missing after write", dest.display()))?
        .len();
    if len == 0 {
        bail!("{} is empty after write", dest.display());
    }
    Ok(len)
}
