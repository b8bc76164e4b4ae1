//! Concurrent threshold scanner
//!
//! Walks a directory tree and reports every regular file whose size
//! strictly exceeds a byte threshold, skipping `.git` subtrees.
//!
//! # Architecture
//!
//! ```text
//!                  ┌──────────────────────────┐
//!                  │    Traversal producer    │
//!                  │  read_dir, skips .git    │
//!                  └────────────┬─────────────┘
//!                               │ bounded work queue
//!        ┌──────────────────────┼──────────────────────┐
//!  ┌─────▼─────┐          ┌─────▼─────┐          ┌─────▼─────┐
//!  │  Worker 1 │          │  Worker 2 │   ...    │  Worker N │
//!  │ stat+size │          │ stat+size │          │ stat+size │
//!  └─────┬─────┘          └─────┬─────┘          └─────┬─────┘
//!        └──────────────────────┼──────────────────────┘
//!                               │ bounded match channel
//!                  ┌────────────▼─────────────┐
//!                  │        Collector         │
//!                  │   Vec<ScanMatch> (set)   │
//!                  └──────────────────────────┘
//! ```

pub mod coordinator;
pub mod queue;
pub mod size;
pub mod types;
pub mod worker;

pub use coordinator::{default_workers, ScanCoordinator, ScanOptions};
pub use types::{ScanMatch, ScanResult};

use crate::error::ScanError;
use std::path::PathBuf;

/// Scan `root` with the given threshold and pool size
///
/// Convenience wrapper over [`ScanCoordinator`] for callers that do not
/// need the cancellation flag.
pub fn scan(
    root: impl Into<PathBuf>,
    threshold_bytes: u64,
    worker_count: usize,
) -> Result<ScanResult, ScanError> {
    let mut options = ScanOptions::new(threshold_bytes);
    options.worker_count = worker_count.max(1);
    ScanCoordinator::new(root, options).run()
}
