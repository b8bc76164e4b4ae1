//! Error types for repo-walker
//!
//! This module defines the error hierarchy:
//! - Git clone and authentication errors
//! - Configuration and input-parsing errors
//! - Scan errors (traversal failures, cancellation)
//! - Worker thread errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Only structural and cancellation errors cross the scanner boundary;
//!   per-file stat failures are logged and skipped, never propagated
//! - Preserve error chains for debugging

use crate::scanner::ScanMatch;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the repo-walker application
#[derive(Error, Debug)]
pub enum WalkerError {
    /// Repository acquisition errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scan errors
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Repository acquisition errors
#[derive(Error, Debug)]
pub enum GitError {
    /// Clone failed after all retry attempts
    #[error("Failed to clone '{url}' after {attempts} attempts: {source}")]
    CloneFailed {
        url: String,
        attempts: u32,
        #[source]
        source: git2::Error,
    },

    /// Temp directory for the checkout could not be created
    #[error("Failed to create temporary clone directory: {0}")]
    TempDir(#[from] std::io::Error),

    /// Leftovers of a failed attempt could not be removed
    #[error("Failed to clean up after a failed clone attempt: {0}")]
    Cleanup(#[source] std::io::Error),

    /// Clone interrupted by the cancellation signal
    #[error("Clone cancelled")]
    Cancelled,
}

/// Configuration and input-parsing errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid queue size
    #[error("Invalid queue size {size}: must be at least {min}")]
    InvalidQueueSize { size: usize, min: usize },

    /// Scan request could not be decoded
    #[error("Invalid scan request: {0}")]
    Json(#[from] serde_json::Error),

    /// Scan request is missing the clone URL
    #[error("clone_url is required")]
    MissingCloneUrl,

    /// Scan request threshold is not positive
    #[error("size must be positive, got {size_mb}")]
    InvalidThreshold { size_mb: f64 },

    /// --json and --input were both supplied
    #[error("--json and --input cannot be used together")]
    ConflictingInputs,

    /// Input file could not be opened
    #[error("Failed to read input '{path}': {reason}")]
    InputUnreadable { path: PathBuf, reason: String },
}

/// Errors terminating a scan
///
/// Per-file stat failures never surface here; they are skipped and counted.
#[derive(Error, Debug)]
pub enum ScanError {
    /// A directory's entries could not be enumerated (structural error)
    ///
    /// `partial` holds the matches collected before the failure. This is
    /// best effort only; full membership is guaranteed only on success.
    #[error("Failed to read directory '{path}': {source}")]
    Traversal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        partial: Vec<ScanMatch>,
    },

    /// Scan stopped by the cancellation signal
    ///
    /// Matches collected before cancellation are discarded.
    #[error("Scan cancelled")]
    Cancelled,

    /// Worker pool failure
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

impl ScanError {
    /// Returns true if this error was a user-requested stop
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScanError::Cancelled)
    }

    /// Matches collected before the scan terminated, if any were retained
    pub fn partial_matches(&self) -> &[ScanMatch] {
        match self {
            ScanError::Traversal { partial, .. } => partial,
            _ => &[],
        }
    }
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked")]
    Panicked { id: usize },

    /// Worker initialization failed
    #[error("Failed to spawn worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },

    /// Result channel closed while a worker still had matches to report
    #[error("Result channel closed unexpectedly")]
    ResultChannelClosed,

    /// Collector thread could not be spawned
    #[error("Failed to spawn collector thread: {reason}")]
    CollectorSpawnFailed { reason: String },

    /// Collector thread panicked
    #[error("Collector thread panicked")]
    CollectorPanicked,
}

/// Result type alias for WalkerError
pub type Result<T> = std::result::Result<T, WalkerError>;

/// Result type alias for GitError
pub type GitResult<T> = std::result::Result<T, GitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_cancelled() {
        assert!(ScanError::Cancelled.is_cancelled());

        let traversal = ScanError::Traversal {
            path: PathBuf::from("/missing"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            partial: Vec::new(),
        };
        assert!(!traversal.is_cancelled());
    }

    #[test]
    fn test_partial_matches_retained_on_traversal() {
        let m = ScanMatch::new("big.bin", 2_000_000);
        let err = ScanError::Traversal {
            path: PathBuf::from("/repo/sub"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            partial: vec![m],
        };
        assert_eq!(err.partial_matches().len(), 1);
        assert!(ScanError::Cancelled.partial_matches().is_empty());
    }

    #[test]
    fn test_cleanup_failure_names_cleanup() {
        let err = GitError::Cleanup(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(err.to_string().contains("clean up"));

        let err = GitError::TempDir(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(err.to_string().contains("temporary clone directory"));
    }

    #[test]
    fn test_error_conversion() {
        let worker_err = WorkerError::Panicked { id: 3 };
        let scan_err: ScanError = worker_err.into();
        assert!(matches!(scan_err, ScanError::Worker(_)));

        let walker_err: WalkerError = scan_err.into();
        assert!(matches!(walker_err, WalkerError::Scan(_)));
    }
}
