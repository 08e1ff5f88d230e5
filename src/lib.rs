//! # Checkpoint Watch
//!
//! Scheduled capture of traffic camera snapshots at Singapore's land
//! checkpoints.
//!
//! Each run fetches the current camera list from the LTA DataMall traffic
//! image API, keeps the watched cameras, downloads their snapshots into a
//! date-partitioned archive, writes a metadata document for the run, and
//! regenerates the archive summary and README from what is on disk.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌──────────┐   ┌──────────┐   ┌─────────┐
//! │   Feed   │──▶│ Watchlist │──▶│ Download │──▶│ Metadata │──▶│ Summary │
//! │ (HTTP)   │   │ id→keyword│   │ validate │   │  (JSON)  │   │ +README │
//! └──────────┘   └───────────┘   └──────────┘   └──────────┘   └─────────┘
//! ```
//!
//! ## Archive Layout
//!
//! ```text
//! traffic_images/
//!   2026-10-18/
//!     camera_4713_2026-10-18_05-00-03.jpg
//!     metadata_2026-10-18_05-00-03.json
//!   summary.json
//!   README.md
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Camera records and archive documents |
//! | [`feed`] | Traffic image API client |
//! | [`watchlist`] | Camera selection strategies |
//! | [`download`] | Validated snapshot download |
//! | [`capture`] | One end-to-end run |
//! | [`summary`] | Archive rescan, summary and README |
//! | [`cameras`] | Upstream camera listing |
//! | [`error`] | Run failure classes and exit codes |

pub mod cameras;
pub mod capture;
pub mod config;
pub mod download;
pub mod error;
pub mod feed;
pub mod models;
pub mod summary;
pub mod watchlist;
