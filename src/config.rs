//! Configuration types for repo-walker
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - The JSON scan request (clone URL, threshold, optional token)
//! - Runtime configuration with validation

use crate::error::ConfigError;
use crate::scanner::default_workers;
use crate::scanner::size::MIB;
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Minimum queue size
const MIN_QUEUE_SIZE: usize = 100;

/// Clone a git repository and report files over a size threshold
#[derive(Parser, Debug, Clone)]
#[command(
    name = "repo-walker",
    version,
    about = "Clone a git repository and report files over a size threshold",
    long_about = "Clones the repository named in a JSON scan request, walks the checked-out\n\
                  working tree with a worker pool, and prints every file whose size exceeds\n\
                  the requested threshold as JSON on stdout.\n\n\
                  The request has the shape:\n\
                  {\"clone_url\": \"https://...\", \"size\": 1.5, \"token\": \"optional\"}\n\
                  where \"size\" is the threshold in megabytes.",
    after_help = "EXAMPLES:\n    \
        repo-walker -j '{\"clone_url\": \"https://github.com/org/repo.git\", \"size\": 1}'\n    \
        repo-walker -i request.json -w 8\n    \
        echo '{\"clone_url\": \"...\", \"size\": 0.5}' | repo-walker -q"
)]
pub struct CliArgs {
    /// Path to a JSON scan request file, or '-' for stdin
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input: Option<String>,

    /// Inline JSON scan request (mutually exclusive with --input)
    #[arg(short = 'j', long, value_name = "JSON")]
    pub json: Option<String>,

    /// Number of stat workers
    #[arg(
        short = 'w',
        long,
        default_value_t = default_workers(),
        value_name = "NUM"
    )]
    pub workers: usize,

    /// Work queue size (controls memory usage on very large trees)
    #[arg(long, default_value = "1024", value_name = "NUM")]
    pub queue_size: usize,

    /// Quiet mode - suppress progress and summary output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Read and validate the scan request from the configured source
    pub fn read_request(&self) -> Result<ScanRequest, ConfigError> {
        match (&self.json, &self.input) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingInputs),
            (Some(json), None) => ScanRequest::from_json(json),
            (None, Some(path)) if path != "-" => {
                let file = std::fs::File::open(path).map_err(|e| ConfigError::InputUnreadable {
                    path: PathBuf::from(path),
                    reason: e.to_string(),
                })?;
                ScanRequest::from_reader(std::io::BufReader::new(file))
            }
            _ => ScanRequest::from_reader(std::io::stdin().lock()),
        }
    }
}

/// A scan request decoded from JSON input
#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    /// Repository to clone
    #[serde(default)]
    pub clone_url: String,

    /// Threshold in megabytes; files strictly larger are reported
    #[serde(default, rename = "size")]
    pub size_mb: f64,

    /// Access token for private repositories
    #[serde(default)]
    pub token: Option<String>,
}

impl ScanRequest {
    /// Decode and validate a request from a reader
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, ConfigError> {
        let request: ScanRequest = serde_json::from_reader(reader)?;
        request.validate()?;
        Ok(request)
    }

    /// Decode and validate a request from an inline JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let request: ScanRequest = serde_json::from_str(json)?;
        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.clone_url.is_empty() {
            return Err(ConfigError::MissingCloneUrl);
        }
        if self.size_mb <= 0.0 {
            return Err(ConfigError::InvalidThreshold {
                size_mb: self.size_mb,
            });
        }
        Ok(())
    }

    /// Threshold converted to bytes
    pub fn threshold_bytes(&self) -> u64 {
        (self.size_mb * MIB as f64) as u64
    }
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Number of worker threads
    pub worker_count: usize,

    /// Work queue capacity
    pub queue_size: usize,

    /// Show progress indicator and summary
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl ScanConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        if args.queue_size < MIN_QUEUE_SIZE {
            return Err(ConfigError::InvalidQueueSize {
                size: args.queue_size,
                min: MIN_QUEUE_SIZE,
            });
        }

        Ok(Self {
            worker_count: args.workers,
            queue_size: args.queue_size,
            show_progress: !args.quiet,
            verbose: args.verbose,
        })
    }
}
