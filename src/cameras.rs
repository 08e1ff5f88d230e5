use anyhow::Result;

use crate::config::Config;
use crate::feed::{http_client, try_fetch_cameras};
use crate::models::CameraRecord;
use crate::watchlist::Watchlist;

/// Fetch the upstream camera list and print it, marking watched cameras.
///
/// Handy for checking whether the configured ids still exist upstream
/// before the keyword fallback has to kick in.
pub async fn list_cameras(config: &Config, api_key: &str, watched_only: bool) -> Result<()> {
    let client = http_client(&config.api)?;
    let cameras = try_fetch_cameras(&client, &config.api, api_key).await?;

    let selection = Watchlist::from_config(&config.watchlist).select(&cameras);
    let selected = |cam: &CameraRecord| {
        selection
            .cameras
            .iter()
            .any(|c| c.camera_id == cam.camera_id)
    };

    println!(
        "{:<10} {:<9} {:>10} {:>11}   LOCATION",
        "CAMERA", "WATCHED", "LAT", "LON"
    );
    let mut shown = 0;
    for cam in &cameras {
        let is_selected = selected(cam);
        if watched_only && !is_selected {
            continue;
        }
        println!(
            "{:<10} {:<9} {:>10} {:>11}   {}",
            cam.camera_id,
            if is_selected { "yes" } else { "no" },
            format_coord(cam.latitude),
            format_coord(cam.longitude),
            cam.location
        );
        shown += 1;
    }

    println!();
    println!(
        "{} of {} camera(s) shown; watchlist selected {} via {}",
        shown,
        cameras.len(),
        selection.cameras.len(),
        selection.strategy.as_deref().unwrap_or("nothing")
    );

    let missing: Vec<&str> = config
        .watchlist
        .cameras
        .iter()
        .filter(|w| !cameras.iter().any(|c| c.camera_id == w.id))
        .map(|w| w.id.as_str())
        .collect();
    if !missing.is_empty() {
        println!("Not found upstream: {}", missing.join(", "));
    }

    Ok(())
}

fn format_coord(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.5}", v),
        None => "-".to_string(),
    }
}
