//! One capture run.
//!
//! ```text
//! fetch feed ──▶ watchlist ──▶ download each ──▶ metadata ──▶ summary + README
//! ```
//!
//! Everything runs sequentially on the calling task. A missing API key or
//! an empty feed aborts the run before anything is written to the archive
//! (the date directory aside). Per-camera failures are counted and the run
//! carries on. Failing to write to the archive is fatal.

use anyhow::Context;
use chrono::{DateTime, FixedOffset};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Config;
use crate::download::download_image;
use crate::error::CaptureError;
use crate::feed::{fetch_cameras, http_client};
use crate::models::{
    archive_now, ArchiveSummary, CaptureEntry, CaptureStamp, RunMetadata, TIMEZONE_LABEL,
};
use crate::summary::generate_summary_at;
use crate::watchlist::Watchlist;

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct CaptureReport {
    pub stamp: CaptureStamp,
    pub day_dir: PathBuf,
    pub metadata_path: PathBuf,
    /// Cameras chosen by the watchlist.
    pub selected: usize,
    pub succeeded: usize,
    /// Download failures plus cameras without an image link.
    pub failed: usize,
    pub selected_by: Option<String>,
    pub summary: ArchiveSummary,
}

/// Run a capture stamped with the current UTC+8 time.
pub async fn run_capture(
    config: &Config,
    api_key: Option<&str>,
) -> Result<CaptureReport, CaptureError> {
    run_capture_at(config, api_key, archive_now()).await
}

/// Run a capture as if it started at `now`.
pub async fn run_capture_at(
    config: &Config,
    api_key: Option<&str>,
    now: DateTime<FixedOffset>,
) -> Result<CaptureReport, CaptureError> {
    let api_key = api_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| CaptureError::MissingApiKey {
            var: config.api.key_env.clone(),
        })?;

    let stamp = CaptureStamp::new(now);
    let day_dir = config.archive.root.join(&stamp.date_key);
    std::fs::create_dir_all(&day_dir)
        .with_context(|| format!("Failed to create {}", day_dir.display()))?;

    let banner = "=".repeat(60);
    println!("{}", banner);
    println!("Checkpoint Traffic Capture");
    println!("Date/Time: {}", stamp.at.format("%Y-%m-%d %H:%M:%S %:z"));
    println!("{}", banner);
    println!();

    let client = http_client(&config.api)?;
    let cameras = fetch_cameras(&client, &config.api, api_key).await;
    if cameras.is_empty() {
        println!("No camera data received from API");
        return Err(CaptureError::NoUpstreamData);
    }

    let selection = Watchlist::from_config(&config.watchlist).select(&cameras);
    if selection.used_fallback() {
        warn!(
            strategy = selection.strategy.as_deref().unwrap_or(""),
            matched = selection.cameras.len(),
            "no watchlisted camera ids upstream, using fallback"
        );
        println!(
            "Warning: no watchlisted camera ids found; matched {} camera(s) by location keyword",
            selection.cameras.len()
        );
    }
    info!(
        upstream = cameras.len(),
        selected = selection.cameras.len(),
        "watchlist applied"
    );

    let mut entries = Vec::new();
    let mut failed = 0;

    for camera in &selection.cameras {
        println!("Camera {}: {}", camera.camera_id, camera.location);

        let Some(image_url) = camera.image_link() else {
            println!("  No image URL available");
            failed += 1;
            continue;
        };

        let filename = stamp.image_filename(&camera.camera_id);
        let outcome = download_image(
            &client,
            image_url,
            &day_dir.join(&filename),
            config.archive.min_image_bytes,
        )
        .await;

        if outcome.saved {
            println!("  ✓ {}", outcome.message);
            entries.push(CaptureEntry {
                camera_id: camera.camera_id.clone(),
                location: camera.location.clone(),
                filename,
                image_url: image_url.to_string(),
                latitude: camera.latitude,
                longitude: camera.longitude,
            });
        } else {
            println!("  ✗ {}", outcome.message);
            failed += 1;
        }
    }

    let succeeded = entries.len();
    let metadata = RunMetadata {
        timestamp: stamp.at,
        date: stamp.date_key.clone(),
        time: stamp.time_key.clone(),
        timezone: TIMEZONE_LABEL.to_string(),
        selected_by: selection.strategy.clone(),
        succeeded,
        failed,
        cameras: entries,
    };

    let metadata_path = day_dir.join(stamp.metadata_filename());
    let json = serde_json::to_string_pretty(&metadata).context("Failed to encode metadata")?;
    std::fs::write(&metadata_path, json)
        .with_context(|| format!("Failed to write {}", metadata_path.display()))?;

    println!();
    println!("✓ Captured {} camera(s), {} failed", succeeded, failed);
    println!("✓ Saved to: {}", day_dir.display());
    if succeeded == 0 {
        println!();
        println!("Warning: no images were captured this run. Likely causes:");
        println!("  - image links expired before download (they are only valid for minutes)");
        println!("  - the image host is rate limiting requests");
        println!("  - network connectivity problems");
    }
    println!();
    println!("{}", banner);

    let summary = generate_summary_at(config, now)?;

    Ok(CaptureReport {
        stamp,
        day_dir,
        metadata_path,
        selected: selection.cameras.len(),
        succeeded,
        failed,
        selected_by: selection.strategy,
        summary,
    })
}
