//! Run-level failure classes and the exit codes they map to.
//!
//! Per-camera download problems never show up here; they are folded into
//! the run's failure count by the orchestrator.

use std::process::ExitCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// The account key variable is unset or empty. Nothing is written.
    #[error("{var} environment variable not set")]
    MissingApiKey { var: String },

    /// The feed request failed or returned no cameras. Nothing is written.
    #[error("no camera data received from the traffic image API")]
    NoUpstreamData,

    /// The archive could not be written, or the run could not start.
    #[error("{0:#}")]
    Fatal(#[from] anyhow::Error),
}

impl CaptureError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CaptureError::MissingApiKey { .. } => ExitCode::from(EXIT_CONFIG),
            CaptureError::NoUpstreamData => ExitCode::from(EXIT_NO_DATA),
            CaptureError::Fatal(_) => ExitCode::from(EXIT_FATAL),
        }
    }
}

pub const EXIT_FATAL: u8 = 1;
pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_NO_DATA: u8 = 3;
