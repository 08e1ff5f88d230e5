//! Core data models used throughout the capture pipeline.
//!
//! Camera records come from the upstream feed and live only for one run.
//! Everything else here is persisted as JSON in the archive.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Offset of the archive's timezone from UTC, in seconds.
pub const ARCHIVE_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// Label written next to every timestamp in the archive.
pub const TIMEZONE_LABEL: &str = "Asia/Singapore (UTC+08:00)";

/// The fixed UTC+8 zone every partition key is derived from.
pub fn archive_offset() -> FixedOffset {
    FixedOffset::east_opt(ARCHIVE_UTC_OFFSET_SECS).expect("UTC+8 is a valid offset")
}

/// Current time in the archive's timezone.
pub fn archive_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&archive_offset())
}

/// One camera as reported by the upstream traffic image feed.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CameraRecord {
    #[serde(rename = "CameraID", deserialize_with = "string_or_number")]
    pub camera_id: String,
    #[serde(
        rename = "Location",
        default = "unknown_location",
        deserialize_with = "location_or_unknown"
    )]
    pub location: String,
    #[serde(rename = "ImageLink", default)]
    pub image_url: Option<String>,
    #[serde(rename = "Latitude", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "Longitude", default)]
    pub longitude: Option<f64>,
}

impl CameraRecord {
    /// Image link, if present and non-blank.
    pub fn image_link(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

fn unknown_location() -> String {
    "Unknown".to_string()
}

/// Upstream sends `"Location": null` for some cameras.
fn location_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(unknown_location))
}

/// Camera ids are strings upstream, but older feeds sent bare numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for CameraID, got {}",
            other
        ))),
    }
}

/// Time of one run and the keys derived from it.
#[derive(Debug, Clone)]
pub struct CaptureStamp {
    pub at: DateTime<FixedOffset>,
    /// `YYYY-MM-DD`, the partition directory name.
    pub date_key: String,
    /// `HH-MM-SS`, embedded in every file name of the run.
    pub time_key: String,
}

impl CaptureStamp {
    pub fn new(at: DateTime<FixedOffset>) -> Self {
        let at = at.with_timezone(&archive_offset());
        Self {
            date_key: at.format("%Y-%m-%d").to_string(),
            time_key: at.format("%H-%M-%S").to_string(),
            at,
        }
    }

    pub fn image_filename(&self, camera_id: &str) -> String {
        format!(
            "camera_{}_{}_{}.jpg",
            sanitize_id(camera_id),
            self.date_key,
            self.time_key
        )
    }

    pub fn metadata_filename(&self) -> String {
        format!("metadata_{}_{}.json", self.date_key, self.time_key)
    }
}

/// Keep camera ids from escaping the partition directory.
///
/// Lossy: ids differing only in replaced characters (`a.b`, `a_b`) map to
/// the same file name and overwrite each other within the same second.
fn sanitize_id(camera_id: &str) -> String {
    camera_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// One successfully captured camera in a run's metadata document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureEntry {
    pub camera_id: String,
    pub location: String,
    pub filename: String,
    pub image_url: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// The per-run metadata document, `metadata_<date>_<time>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub timestamp: DateTime<FixedOffset>,
    pub date: String,
    pub time: String,
    pub timezone: String,
    /// Name of the watchlist strategy that selected the cameras.
    pub selected_by: Option<String>,
    pub succeeded: usize,
    pub failed: usize,
    pub cameras: Vec<CaptureEntry>,
}

/// Per-day figures in `summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaySummary {
    pub date: String,
    pub captures: usize,
    pub images: usize,
}

/// The archive-wide summary document, `summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchiveSummary {
    pub last_updated: DateTime<FixedOffset>,
    pub timezone: String,
    pub total_days: usize,
    pub total_captures: usize,
    pub days: Vec<DaySummary>,
}
