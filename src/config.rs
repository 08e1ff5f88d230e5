//! TOML configuration for the capture pipeline.
//!
//! The configuration is built once at process start and passed by
//! reference into every component. Every field has a default, so the
//! crate runs without a config file at all.
//!
//! ```toml
//! [api]
//! url = "https://datamall2.mytransport.sg/ltaodataservice/Traffic-Imagesv2"
//! key_env = "LTA_API_KEY"
//! timeout_secs = 30
//!
//! [archive]
//! root = "traffic_images"
//! min_image_bytes = 1024
//! report_days = 7
//!
//! [watchlist]
//! keywords = ["Woodlands", "Tuas"]
//!
//! [[watchlist.cameras]]
//! id = "4713"
//! label = "Tuas Checkpoint"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub watchlist: WatchlistConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub url: String,
    /// Name of the environment variable holding the account key.
    #[serde(default = "default_key_env")]
    pub key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            key_env: default_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_url() -> String {
    "https://datamall2.mytransport.sg/ltaodataservice/Traffic-Imagesv2".to_string()
}
fn default_key_env() -> String {
    "LTA_API_KEY".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArchiveConfig {
    #[serde(default = "default_archive_root")]
    pub root: PathBuf,
    /// Payloads smaller than this are treated as error placeholders.
    #[serde(default = "default_min_image_bytes")]
    pub min_image_bytes: u64,
    /// Number of most recent days listed in the generated README.
    #[serde(default = "default_report_days")]
    pub report_days: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            root: default_archive_root(),
            min_image_bytes: default_min_image_bytes(),
            report_days: default_report_days(),
        }
    }
}

fn default_archive_root() -> PathBuf {
    PathBuf::from("traffic_images")
}
fn default_min_image_bytes() -> u64 {
    1024
}
fn default_report_days() -> usize {
    7
}

#[derive(Debug, Deserialize, Clone)]
pub struct WatchlistConfig {
    #[serde(default = "default_cameras")]
    pub cameras: Vec<WatchedCamera>,
    /// Location keywords used when none of the camera ids are found upstream.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
}

impl Default for WatchlistConfig {
    fn default() -> Self {
        Self {
            cameras: default_cameras(),
            keywords: default_keywords(),
        }
    }
}

impl WatchlistConfig {
    pub fn camera_ids(&self) -> Vec<String> {
        self.cameras.iter().map(|c| c.id.clone()).collect()
    }

    pub fn contains(&self, camera_id: &str) -> bool {
        self.cameras.iter().any(|c| c.id == camera_id)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct WatchedCamera {
    pub id: String,
    #[serde(default)]
    pub label: String,
}

fn default_cameras() -> Vec<WatchedCamera> {
    [
        ("2701", "Woodlands Causeway (towards Johor)"),
        ("2702", "Woodlands Checkpoint"),
        ("4703", "Tuas Second Link"),
        ("4713", "Tuas Checkpoint"),
        ("4714", "AYE towards Tuas Checkpoint"),
    ]
    .into_iter()
    .map(|(id, label)| WatchedCamera {
        id: id.to_string(),
        label: label.to_string(),
    })
    .collect()
}

fn default_keywords() -> Vec<String> {
    vec!["Woodlands".to_string(), "Tuas".to_string()]
}

/// Load configuration from `path`.
///
/// When `required` is false and the file does not exist, the defaults
/// are used. This lets the binary run with no config on disk while still
/// failing loudly for an explicitly passed path that is wrong.
pub fn load_config(path: &Path, required: bool) -> Result<Config> {
    if !required && !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.api.url.trim().is_empty() {
        bail!("api.url must not be empty");
    }
    if config.api.key_env.trim().is_empty() {
        bail!("api.key_env must not be empty");
    }
    if config.api.timeout_secs == 0 {
        bail!("api.timeout_secs must be > 0");
    }
    if config.archive.report_days < 1 {
        bail!("archive.report_days must be >= 1");
    }
    if config.watchlist.cameras.is_empty() {
        bail!("watchlist.cameras must list at least one camera");
    }
    if let Some(cam) = config
        .watchlist
        .cameras
        .iter()
        .find(|c| c.id.trim().is_empty())
    {
        bail!("watchlist camera with label '{}' has an empty id", cam.label);
    }
    Ok(())
}
