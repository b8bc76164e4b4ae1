//! Worker thread logic for the scan pool
//!
//! Each worker:
//! - Pulls file paths from the work queue
//! - Stats the file and applies the size classifier
//! - Emits a [`ScanMatch`] for qualifying files
//! - Exits when the queue closes or cancellation is observed
//!
//! A failed stat (file disappeared, permission denied, broken symlink) is
//! logged at debug and skipped; it never terminates the scan.

use crate::error::WorkerError;
use crate::scanner::queue::{MatchSender, Poll, WorkReceiver};
use crate::scanner::{size, ScanMatch};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// Interval for cancellation re-checks while blocked on a channel
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Statistics collected by a worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Files statted successfully
    pub files_statted: AtomicU64,

    /// Matches emitted
    pub matches_found: AtomicU64,

    /// Entries skipped because their stat failed
    pub skipped: AtomicU64,
}

impl WorkerStats {
    fn record_stat(&self) {
        self.files_statted.fetch_add(1, Ordering::Relaxed);
    }

    fn record_match(&self) {
        self.matches_found.fetch_add(1, Ordering::Relaxed);
    }

    fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }
}

/// A worker thread that stats and classifies queued paths
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<Result<(), WorkerError>>>,

    /// Worker statistics
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(
        id: usize,
        root: Arc<PathBuf>,
        threshold_bytes: u64,
        queue_rx: WorkReceiver,
        matches_tx: MatchSender,
        cancel: Arc<AtomicBool>,
    ) -> Result<Self, WorkerError> {
        let stats = Arc::new(WorkerStats::default());
        let stats_clone = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name(format!("scan-worker-{}", id))
            .spawn(move || {
                worker_loop(id, root, threshold_bytes, queue_rx, matches_tx, cancel, stats_clone)
            })
            .map_err(|e| WorkerError::InitFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    /// Get a shared handle to the statistics, valid after the worker is
    /// joined
    pub fn stats_handle(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<(), WorkerError> {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(result) => result,
                Err(_) => Err(WorkerError::Panicked { id: self.id }),
            }
        } else {
            Ok(())
        }
    }
}

/// Main worker loop
fn worker_loop(
    id: usize,
    root: Arc<PathBuf>,
    threshold_bytes: u64,
    queue_rx: WorkReceiver,
    matches_tx: MatchSender,
    cancel: Arc<AtomicBool>,
    stats: Arc<WorkerStats>,
) -> Result<(), WorkerError> {
    debug!(worker = id, "Worker starting");

    loop {
        // Checked before each pull so no new stat starts after cancellation
        if cancel.load(Ordering::Relaxed) {
            debug!(worker = id, "Cancellation observed");
            break;
        }

        match queue_rx.poll(POLL_INTERVAL) {
            Poll::Task(path) => {
                if let Some(m) = stat_and_classify(id, &root, &path, threshold_bytes, &stats) {
                    if !deliver(&matches_tx, m, &cancel)? {
                        break;
                    }
                }
            }
            Poll::Empty => continue,
            Poll::Closed => break,
        }
    }

    debug!(
        worker = id,
        statted = stats.files_statted.load(Ordering::Relaxed),
        matches = stats.matches_found.load(Ordering::Relaxed),
        "Worker exiting"
    );

    Ok(())
}

/// Stat one path and decide whether it qualifies
fn stat_and_classify(
    worker_id: usize,
    root: &Path,
    path: &Path,
    threshold_bytes: u64,
    stats: &WorkerStats,
) -> Option<ScanMatch> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) => {
            debug!(worker = worker_id, path = %path.display(), error = %e, "Skipping entry");
            stats.record_skip();
            return None;
        }
    };

    stats.record_stat();

    // Symlinks to directories and other non-regular targets carry no size
    // worth reporting
    if !meta.is_file() {
        return None;
    }

    if !size::exceeds_threshold(meta.len(), threshold_bytes) {
        return None;
    }

    let relative = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned();

    stats.record_match();
    Some(ScanMatch::new(relative, meta.len()))
}

/// Push a match into the results channel, re-checking cancellation while
/// the channel is full
///
/// Returns `Ok(false)` if cancellation was observed before delivery.
fn deliver(
    matches_tx: &MatchSender,
    m: ScanMatch,
    cancel: &AtomicBool,
) -> Result<bool, WorkerError> {
    loop {
        match matches_tx.send_timeout(m.clone(), POLL_INTERVAL) {
            Ok(true) => return Ok(true),
            Ok(false) => {
                if cancel.load(Ordering::Relaxed) {
                    return Ok(false);
                }
            }
            Err(()) => return Err(WorkerError::ResultChannelClosed),
        }
    }
}

/// Aggregate statistics from the pool; call after every worker is joined
pub fn aggregate_stats(stats: &[Arc<WorkerStats>]) -> (u64, u64, u64) {
    let mut statted = 0u64;
    let mut matches = 0u64;
    let mut skipped = 0u64;

    for s in stats {
        statted += s.files_statted.load(Ordering::Relaxed);
        matches += s.matches_found.load(Ordering::Relaxed);
        skipped += s.skipped.load(Ordering::Relaxed);
    }

    (statted, matches, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::queue::{MatchChannel, WorkQueue};
    use std::io::Write;

    #[test]
    fn test_worker_stats() {
        let stats = WorkerStats::default();

        stats.record_stat();
        stats.record_match();
        stats.record_skip();

        assert_eq!(stats.files_statted.load(Ordering::Relaxed), 1);
        assert_eq!(stats.matches_found.load(Ordering::Relaxed), 1);
        assert_eq!(stats.skipped.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_worker_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let big = dir.path().join("big.bin");
        let mut f = std::fs::File::create(&big).unwrap();
        f.write_all(&vec![0u8; 2048]).unwrap();
        drop(f);

        let queue = WorkQueue::new(16);
        let channel = MatchChannel::new(16);
        let cancel = Arc::new(AtomicBool::new(false));

        let worker = Worker::spawn(
            0,
            Arc::new(dir.path().to_path_buf()),
            1024,
            queue.receiver(),
            channel.sender(),
            Arc::clone(&cancel),
        )
        .unwrap();

        assert!(matches!(
            queue.submit_timeout(big, Duration::from_secs(1)),
            crate::scanner::queue::Submit::Sent
        ));
        assert!(matches!(
            queue.submit_timeout(dir.path().join("missing.bin"), Duration::from_secs(1)),
            crate::scanner::queue::Submit::Sent
        ));
        drop(queue);

        let receiver = channel.into_receiver();
        let m = receiver.recv().unwrap();
        assert_eq!(m.relative_path, "big.bin");
        assert_eq!(m.size_bytes, 2048);
        assert!(receiver.recv().is_err());

        worker.join().unwrap();
    }

    #[test]
    fn test_worker_exits_on_cancellation() {
        let queue = WorkQueue::new(16);
        let channel = MatchChannel::new(16);
        let cancel = Arc::new(AtomicBool::new(true));

        let worker = Worker::spawn(
            0,
            Arc::new(PathBuf::from("/nonexistent")),
            0,
            queue.receiver(),
            channel.sender(),
            cancel,
        )
        .unwrap();

        // Queue stays open; the worker must exit on the flag alone
        worker.join().unwrap();
        drop(queue);
    }
}
