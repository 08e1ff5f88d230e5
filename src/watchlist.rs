//! Watchlist filtering.
//!
//! Selection is an ordered chain of [`FilterStrategy`]s. Each strategy is
//! tried in turn against the full camera list and the first non-empty
//! result wins, so a later strategy only runs when every earlier one
//! matched nothing.
//!
//! The default chain is:
//!
//! 1. [`IdentifierMatch`]: exact camera id from the configured list.
//! 2. [`LocationKeywordMatch`]: case-insensitive substring of a keyword in
//!    the camera's location text.
//!
//! Upstream ids are not guaranteed stable and location text is free-form,
//! so the keyword fallback is a best-effort recovery only.

use crate::config::WatchlistConfig;
use crate::models::CameraRecord;

/// One way of picking watched cameras out of the feed.
pub trait FilterStrategy: Send + Sync {
    /// Short name recorded in run metadata.
    fn name(&self) -> &str;

    /// Return the matching cameras, preserving upstream order.
    fn select(&self, cameras: &[CameraRecord]) -> Vec<CameraRecord>;
}

pub struct IdentifierMatch {
    ids: Vec<String>,
}

impl IdentifierMatch {
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids }
    }
}

impl FilterStrategy for IdentifierMatch {
    fn name(&self) -> &str {
        "camera_id"
    }

    fn select(&self, cameras: &[CameraRecord]) -> Vec<CameraRecord> {
        cameras
            .iter()
            .filter(|c| self.ids.iter().any(|id| *id == c.camera_id))
            .cloned()
            .collect()
    }
}

pub struct LocationKeywordMatch {
    keywords: Vec<String>,
}

impl LocationKeywordMatch {
    pub fn new(keywords: &[String]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }
}

impl FilterStrategy for LocationKeywordMatch {
    fn name(&self) -> &str {
        "location_keyword"
    }

    fn select(&self, cameras: &[CameraRecord]) -> Vec<CameraRecord> {
        cameras
            .iter()
            .filter(|c| {
                let location = c.location.to_lowercase();
                self.keywords.iter().any(|k| location.contains(k.as_str()))
            })
            .cloned()
            .collect()
    }
}

/// Result of running the chain.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub cameras: Vec<CameraRecord>,
    /// Strategy that produced `cameras`, `None` if nothing matched.
    pub strategy: Option<String>,
    /// Index of that strategy in the chain. Anything above 0 is a fallback.
    pub position: Option<usize>,
}

impl Selection {
    pub fn used_fallback(&self) -> bool {
        self.position.is_some_and(|p| p > 0)
    }
}

pub struct Watchlist {
    strategies: Vec<Box<dyn FilterStrategy>>,
}

impl Watchlist {
    pub fn new(strategies: Vec<Box<dyn FilterStrategy>>) -> Self {
        Self { strategies }
    }

    /// The id list followed by the keyword fallback.
    pub fn from_config(config: &WatchlistConfig) -> Self {
        Self::new(vec![
            Box::new(IdentifierMatch::new(config.camera_ids())),
            Box::new(LocationKeywordMatch::new(&config.keywords)),
        ])
    }

    pub fn select(&self, cameras: &[CameraRecord]) -> Selection {
        for (position, strategy) in self.strategies.iter().enumerate() {
            let matched = strategy.select(cameras);
            if !matched.is_empty() {
                return Selection {
                    cameras: matched,
                    strategy: Some(strategy.name().to_string()),
                    position: Some(position),
                };
            }
        }
        Selection::default()
    }
}
