//! repo-walker - Large-File Repository Scanner
//!
//! Clones a git repository, walks its checked-out working tree with a
//! parallel worker pool, and reports every file whose size exceeds a
//! configurable threshold.
//!
//! # Features
//!
//! - **Parallel Scanning**: A traversal producer feeds a bounded work
//!   queue drained by stat workers, so huge trees scan quickly without
//!   unbounded memory use.
//!
//! - **Cancellation**: A shared flag (wired to Ctrl-C by the CLI) stops
//!   the clone and the scan promptly, even when threads are blocked on a
//!   full or empty channel.
//!
//! - **Robust Traversal**: Individual unreadable files are skipped and
//!   counted; only a failure to enumerate a directory aborts the scan.
//!
//! - **JSON In, JSON Out**: The scan request (clone URL, threshold in MB,
//!   optional token) arrives as JSON; matches leave as JSON on stdout.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Remote Repository                          │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ shallow clone (git2, temp dir)
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Working Tree on Disk                       │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ read_dir (skips .git)
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Producer ──► bounded work queue ──► Worker 1..N (stat + size)  │
//! │                                           │                      │
//! │                                           ▼                      │
//! │                              bounded match channel               │
//! │                                           │                      │
//! │                                           ▼                      │
//! │                               Collector (match set)              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! repo-walker -j '{"clone_url": "https://github.com/org/repo.git", "size": 1.5}'
//! ```

pub mod config;
pub mod error;
pub mod git;
pub mod progress;
pub mod scanner;

pub use config::{CliArgs, ScanConfig, ScanRequest};
pub use error::{Result, WalkerError};
pub use scanner::{scan, ScanCoordinator, ScanMatch, ScanOptions, ScanResult};
