//! # Checkpoint Watch CLI (`cpwatch`)
//!
//! Meant to be run from an external scheduler (cron, CI schedule). Each
//! invocation is one independent run.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cpwatch capture` | Capture the watched cameras and refresh the summary |
//! | `cpwatch summary` | Rescan the archive and rewrite summary.json and README.md |
//! | `cpwatch cameras` | List cameras currently reported by the API |
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Run completed (zero captured images is only a warning) |
//! | 1 | Archive missing (`summary`) or could not be written |
//! | 2 | Configuration error, including a missing API key |
//! | 3 | The API returned no camera data |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use checkpoint_watch::error::{CaptureError, EXIT_CONFIG, EXIT_FATAL};
use checkpoint_watch::{cameras, capture, config, summary};

const DEFAULT_CONFIG: &str = "./config/cpwatch.toml";

/// Checkpoint Watch: archive traffic camera snapshots at the land checkpoints.
#[derive(Parser)]
#[command(name = "cpwatch", version)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/cpwatch.toml`; built-in defaults are used
    /// when that file does not exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override `archive.root` from the config.
    #[arg(long, global = true)]
    archive: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture snapshots for the watched cameras.
    ///
    /// Reads the API key from the environment variable named by
    /// `api.key_env` (default `LTA_API_KEY`).
    Capture,

    /// Regenerate summary.json and README.md from the archive on disk.
    ///
    /// The archive root must already exist.
    Summary,

    /// List cameras reported by the API.
    Cameras {
        /// Only show cameras the watchlist would capture.
        #[arg(long)]
        watched: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => config::load_config(path, true),
        None => config::load_config(&PathBuf::from(DEFAULT_CONFIG), false),
    };
    let mut cfg = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    if let Some(root) = cli.archive {
        cfg.archive.root = root;
    }

    let api_key = std::env::var(&cfg.api.key_env).ok();

    match cli.command {
        Commands::Capture => match capture::run_capture(&cfg, api_key.as_deref()).await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                if let CaptureError::MissingApiKey { var } = &e {
                    eprintln!("Set {} to your LTA DataMall account key.", var);
                }
                e.exit_code()
            }
        },
        Commands::Summary if !cfg.archive.root.is_dir() => {
            eprintln!(
                "Error: archive root does not exist: {}",
                cfg.archive.root.display()
            );
            ExitCode::from(EXIT_FATAL)
        }
        Commands::Summary => match summary::generate_summary(&cfg) {
            Ok(s) => {
                summary::print_summary(&s, &cfg.archive.root);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::from(EXIT_FATAL)
            }
        },
        Commands::Cameras { watched } => {
            let Some(key) = api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
                let e = CaptureError::MissingApiKey {
                    var: cfg.api.key_env.clone(),
                };
                eprintln!("Error: {}", e);
                return e.exit_code();
            };
            match cameras::list_cameras(&cfg, key, watched).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Error: {:#}", e);
                    CaptureError::NoUpstreamData.exit_code()
                }
            }
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
