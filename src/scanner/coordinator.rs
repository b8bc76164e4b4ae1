//! Scan coordinator - orchestrates the concurrent tree walk
//!
//! The coordinator is responsible for:
//! - Setting up the work queue, match channel, and worker pool
//! - Running the traversal producer on the calling thread
//! - Collecting matches on a dedicated collector thread
//! - Observing the cancellation flag and shutting down cleanly
//! - Mapping the traversal outcome to the scan's terminal error
//!
//! Shutdown ordering: the work queue's only sender is dropped exactly once
//! when traversal ends, which terminates the workers' pull loops; each
//! worker drops its match-sender clone on exit, so the collector's drain
//! loop ends only after every worker has finished. Workers are then joined
//! before the result is assembled.

use crate::error::{ScanError, WorkerError};
use crate::scanner::queue::{MatchChannel, Submit, WorkQueue};
use crate::scanner::worker::{aggregate_stats, Worker};
use crate::scanner::{ScanMatch, ScanResult};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Version-control metadata directory excluded from every scan.
/// Exact match on the final path component, not a pattern.
const GIT_DIR: &str = ".git";

/// Capacity of the match channel between workers and collector
const MATCH_CHANNEL_CAPACITY: usize = 256;

/// Default capacity of the work queue
const DEFAULT_QUEUE_SIZE: usize = 1024;

/// Interval for cancellation re-checks while the work queue is full
const SUBMIT_INTERVAL: Duration = Duration::from_millis(50);

/// Tunables for one scan invocation
///
/// Pool size is an explicit parameter rather than process-global state so
/// concurrent scans and tests cannot interfere with each other.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Report files strictly larger than this many bytes
    pub threshold_bytes: u64,

    /// Number of stat workers
    pub worker_count: usize,

    /// Work queue capacity (bounds memory on very large trees)
    pub queue_size: usize,
}

impl ScanOptions {
    /// Options with the default pool size (2x logical CPUs, at least 1)
    pub fn new(threshold_bytes: u64) -> Self {
        Self {
            threshold_bytes,
            worker_count: default_workers(),
            queue_size: DEFAULT_QUEUE_SIZE,
        }
    }
}

/// Default worker count: stat calls are I/O bound, so oversubscribe
pub fn default_workers() -> usize {
    (num_cpus::get() * 2).max(1)
}

/// Outcome of the traversal producer
enum WalkOutcome {
    /// Every directory was enumerated
    Completed { dirs: u64, files: u64 },

    /// The cancellation flag was raised mid-walk
    Cancelled,

    /// A directory's entries could not be read
    Failed { path: PathBuf, source: std::io::Error },

    /// The worker pool terminated while work remained
    PoolClosed,
}

/// Coordinates the concurrent scan of one directory tree
pub struct ScanCoordinator {
    /// Scan root (must exist before `run` is called)
    root: PathBuf,

    /// Scan tunables
    options: ScanOptions,

    /// Cancellation signal shared with producer and workers
    cancel: Arc<AtomicBool>,
}

impl ScanCoordinator {
    /// Create a new scan coordinator with its own cancellation flag
    pub fn new(root: impl Into<PathBuf>, options: ScanOptions) -> Self {
        Self::with_cancel(root, options, Arc::new(AtomicBool::new(false)))
    }

    /// Create a coordinator observing an externally-owned cancellation flag
    ///
    /// Lets one signal handler cover both the clone phase and the scan.
    pub fn with_cancel(
        root: impl Into<PathBuf>,
        options: ScanOptions,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self {
            root: root.into(),
            options,
            cancel,
        }
    }

    /// Get a clone of the cancellation flag (for signal handlers)
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Run the scan
    ///
    /// On success, returns every file under the root (outside `.git`
    /// subtrees) whose size strictly exceeds the threshold; match order is
    /// unspecified. On a structural traversal error the matches collected
    /// so far ride along in [`ScanError::Traversal`]. On cancellation the
    /// partial matches are discarded and [`ScanError::Cancelled`] is
    /// returned.
    pub fn run(self) -> Result<ScanResult, ScanError> {
        let start = Instant::now();

        info!(
            root = %self.root.display(),
            workers = self.options.worker_count,
            threshold_bytes = self.options.threshold_bytes,
            "Starting scan"
        );

        let queue = WorkQueue::new(self.options.queue_size);
        let channel = MatchChannel::new(MATCH_CHANNEL_CAPACITY);
        let root = Arc::new(self.root.clone());

        // Spawn the worker pool
        let mut workers = Vec::with_capacity(self.options.worker_count);
        for id in 0..self.options.worker_count {
            workers.push(Worker::spawn(
                id,
                Arc::clone(&root),
                self.options.threshold_bytes,
                queue.receiver(),
                channel.sender(),
                Arc::clone(&self.cancel),
            )?);
        }
        debug!(count = workers.len(), "Workers spawned");

        // Spawn the collector; into_receiver drops the channel's own
        // sender, leaving only the workers' clones alive
        let matches_rx = channel.into_receiver();
        let collector = thread::Builder::new()
            .name("scan-collector".into())
            .spawn(move || {
                let mut collected: Vec<ScanMatch> = Vec::new();
                while let Ok(m) = matches_rx.recv() {
                    collected.push(m);
                }
                collected
            })
            .map_err(|e| WorkerError::CollectorSpawnFailed {
                reason: e.to_string(),
            })?;

        // Traversal runs on the calling thread; dropping the queue inside
        // `traverse` is what closes it, exactly once
        let outcome = traverse(&self.root, queue, &self.cancel);

        // Join workers (completion barrier), then the collector
        let stats_handles: Vec<_> = workers.iter().map(|w| w.stats_handle()).collect();
        let mut worker_failure: Option<WorkerError> = None;
        for worker in workers {
            let id = worker.id();
            if let Err(e) = worker.join() {
                warn!(worker = id, error = %e, "Worker failed");
                worker_failure.get_or_insert(e);
            }
        }
        let (statted, _, skipped) = aggregate_stats(&stats_handles);

        let matches = collector
            .join()
            .map_err(|_| WorkerError::CollectorPanicked)?;

        let duration = start.elapsed();

        match outcome {
            WalkOutcome::Completed { dirs, files } => {
                // The flag may have been raised after traversal finished
                // but while workers were still draining the queue; the
                // match set would be incomplete, so report cancellation
                if self.cancel.load(Ordering::Relaxed) {
                    info!("Scan cancelled");
                    return Err(ScanError::Cancelled);
                }

                if let Some(e) = worker_failure {
                    return Err(e.into());
                }

                info!(
                    dirs = dirs,
                    files = files,
                    matches = matches.len(),
                    skipped = skipped,
                    duration_ms = duration.as_millis() as u64,
                    "Scan completed"
                );

                Ok(ScanResult {
                    matches,
                    files_scanned: statted,
                    dirs_scanned: dirs,
                    skipped,
                    duration,
                })
            }
            WalkOutcome::Cancelled => {
                info!("Scan cancelled");
                Err(ScanError::Cancelled)
            }
            WalkOutcome::Failed { path, source } => {
                warn!(path = %path.display(), error = %source, "Traversal failed");
                Err(ScanError::Traversal {
                    path,
                    source,
                    partial: matches,
                })
            }
            WalkOutcome::PoolClosed => {
                // Workers exit their pull loops on the flag, so the
                // producer can see a closed queue before it observes the
                // flag itself; that is a cancellation, not a pool failure
                if self.cancel.load(Ordering::Relaxed) {
                    info!("Scan cancelled");
                    return Err(ScanError::Cancelled);
                }
                Err(worker_failure.unwrap_or(WorkerError::ResultChannelClosed).into())
            }
        }
    }
}

/// Enumerate the tree under `root`, feeding file paths into the queue
///
/// Takes the queue by value; it is dropped on every return path, closing
/// the workers' pull loops.
fn traverse(root: &Path, queue: WorkQueue, cancel: &AtomicBool) -> WalkOutcome {
    let mut pending = vec![root.to_path_buf()];
    let mut dirs = 0u64;
    let mut files = 0u64;

    while let Some(dir) = pending.pop() {
        if cancel.load(Ordering::Relaxed) {
            return WalkOutcome::Cancelled;
        }

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => return WalkOutcome::Failed { path: dir, source: e },
        };
        dirs += 1;

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    return WalkOutcome::Failed {
                        path: dir.clone(),
                        source: e,
                    }
                }
            };

            // Symlinks are not followed here; a link to a directory is
            // submitted as a plain entry and ignored by the worker's stat
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            let path = entry.path();

            if is_dir {
                if entry.file_name() == GIT_DIR {
                    trace!(path = %path.display(), "Skipping version-control metadata");
                    continue;
                }
                pending.push(path);
                continue;
            }

            files += 1;
            loop {
                if cancel.load(Ordering::Relaxed) {
                    return WalkOutcome::Cancelled;
                }
                match queue.submit_timeout(path.clone(), SUBMIT_INTERVAL) {
                    Submit::Sent => break,
                    Submit::Full => continue,
                    Submit::Closed => return WalkOutcome::PoolClosed,
                }
            }
        }
    }

    WalkOutcome::Completed { dirs, files }
}
