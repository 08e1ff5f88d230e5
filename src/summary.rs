//! Archive summary and generated README.
//!
//! The summary is never maintained incrementally. Each call rescans the
//! archive root, counts the metadata documents and camera images in every
//! date partition, and rewrites `summary.json` and `README.md` from those
//! counts. Whatever is on disk is the truth, including leftovers from a
//! run that was killed halfway.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate};
use globset::{Glob, GlobMatcher};
use std::path::Path;
use walkdir::WalkDir;

use crate::config::Config;
use crate::models::{archive_now, ArchiveSummary, DaySummary, TIMEZONE_LABEL};

pub const SUMMARY_FILE: &str = "summary.json";
pub const REPORT_FILE: &str = "README.md";

const METADATA_PATTERN: &str = "metadata_*.json";
const IMAGE_PATTERN: &str = "camera_*.jpg";

/// Rescan the archive and rewrite the summary and report, stamped now.
pub fn generate_summary(config: &Config) -> Result<ArchiveSummary> {
    generate_summary_at(config, archive_now())
}

/// Rescan the archive and rewrite the summary and report.
///
/// Creates the archive root if it is missing, so the first capture into a
/// fresh location succeeds. Callers that only want to report on an existing
/// archive should check for the root first.
pub fn generate_summary_at(
    config: &Config,
    now: DateTime<FixedOffset>,
) -> Result<ArchiveSummary> {
    let root = &config.archive.root;
    std::fs::create_dir_all(root)
        .with_context(|| format!("Failed to create archive root: {}", root.display()))?;

    let days = scan_archive(root)?;
    let summary = ArchiveSummary {
        last_updated: now,
        timezone: TIMEZONE_LABEL.to_string(),
        total_days: days.len(),
        total_captures: days.iter().map(|d| d.captures).sum(),
        days,
    };

    let summary_path = root.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(&summary)?;
    std::fs::write(&summary_path, json)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;

    let report_path = root.join(REPORT_FILE);
    std::fs::write(&report_path, render_report(&summary, config))
        .with_context(|| format!("Failed to write {}", report_path.display()))?;

    Ok(summary)
}

/// Count captures per date partition, sorted ascending by date.
///
/// Only directories named `YYYY-MM-DD` are partitions; anything else under
/// the root is ignored.
pub fn scan_archive(root: &Path) -> Result<Vec<DaySummary>> {
    let metadata_matcher = matcher(METADATA_PATTERN)?;
    let image_matcher = matcher(IMAGE_PATTERN)?;

    let mut days = Vec::new();

    let partitions = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in partitions {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let date = entry.file_name().to_string_lossy().to_string();
        if NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
            continue;
        }

        let mut captures = 0;
        let mut images = 0;
        for file in WalkDir::new(entry.path()).min_depth(1).max_depth(1) {
            let file = file?;
            if !file.file_type().is_file() {
                continue;
            }
            let name = file.file_name().to_string_lossy();
            if metadata_matcher.is_match(&*name) {
                captures += 1;
            } else if image_matcher.is_match(&*name) {
                images += 1;
            }
        }

        days.push(DaySummary {
            date,
            captures,
            images,
        });
    }

    Ok(days)
}

fn matcher(pattern: &str) -> Result<GlobMatcher> {
    Ok(Glob::new(pattern)?.compile_matcher())
}

/// Render the README that sits at the archive root.
pub fn render_report(summary: &ArchiveSummary, config: &Config) -> String {
    let recent = recent_days(&summary.days, config.archive.report_days);
    let recent_lines = if recent.is_empty() {
        "_No captures yet._".to_string()
    } else {
        recent
            .iter()
            .map(|day| {
                format!(
                    "- **{}**: {} capture(s), {} image(s)",
                    day.date, day.captures, day.images
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let camera_rows = config
        .watchlist
        .cameras
        .iter()
        .map(|cam| {
            let label = if cam.label.is_empty() { "-" } else { &cam.label };
            format!("| {} | {} |", cam.id, label)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let fallback_note = if config.watchlist.keywords.is_empty() {
        String::new()
    } else {
        let keywords = config
            .watchlist
            .keywords
            .iter()
            .map(|k| format!("`{}`", k))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "\nWhen none of these ids are present upstream, cameras whose location \
             mentions any of {} are captured instead.\n",
            keywords
        )
    };

    format!(
        r#"# Checkpoint Traffic Monitor

Scheduled snapshots of the traffic cameras at the Woodlands and Tuas checkpoints.

## Latest Summary
- **Last Updated**: {last_updated}
- **Timezone**: {timezone}
- **Total Days Monitored**: {total_days}
- **Total Captures**: {total_captures}

## Recent Captures

{recent_lines}

## Camera Locations

| Camera ID | Location |
|-----------|----------|
{camera_rows}
{fallback_note}
## Data Structure

```
{root}/
├── YYYY-MM-DD/
│   ├── camera_<ID>_YYYY-MM-DD_HH-MM-SS.jpg
│   ├── metadata_YYYY-MM-DD_HH-MM-SS.json
│   └── ...
├── {summary_file}
└── {report_file}
```

Times in file names are {zone} wall-clock time. Each metadata file lists the cameras captured in that run with their source URL and coordinates.

---

*Generated by cpwatch. This file is rewritten on every run.*
"#,
        last_updated = summary.last_updated.format("%Y-%m-%d %H:%M:%S %:z"),
        timezone = summary.timezone,
        total_days = summary.total_days,
        total_captures = summary.total_captures,
        recent_lines = recent_lines,
        camera_rows = camera_rows,
        fallback_note = fallback_note,
        root = config.archive.root.display(),
        summary_file = SUMMARY_FILE,
        report_file = REPORT_FILE,
        zone = TIMEZONE_LABEL,
    )
}

/// The `n` most recent days, newest first.
fn recent_days(days: &[DaySummary], n: usize) -> Vec<&DaySummary> {
    let mut sorted: Vec<&DaySummary> = days.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(n);
    sorted
}

/// Print a short overview of a freshly generated summary.
pub fn print_summary(summary: &ArchiveSummary, root: &Path) {
    println!("Archive:          {}", root.display());
    println!("Days monitored:   {}", summary.total_days);
    println!("Total captures:   {}", summary.total_captures);
    println!(
        "Total images:     {}",
        summary.days.iter().map(|d| d.images).sum::<usize>()
    );
    if let Some(latest) = summary.days.last() {
        println!(
            "Latest day:       {} ({} capture(s), {} image(s))",
            latest.date, latest.captures, latest.images
        );
    }
}
