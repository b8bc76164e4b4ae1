//! Bounded channels between the traversal producer, workers, and collector
//!
//! Two channels make up the scan pipeline:
//! - the work queue, carrying file paths from the producer to the workers;
//!   bounded so a very large tree cannot balloon memory
//! - the match channel, carrying qualifying files from the workers to the
//!   collector
//!
//! Closing protocol: the producer owns the only work-queue sender and drops
//! it exactly once when traversal ends; each worker owns a match-sender
//! clone and drops it on exit, so the collector's drain loop terminates
//! only after every worker has finished. All blocking operations take a
//! timeout so a raised cancellation flag is observed within one interval.

use crate::scanner::ScanMatch;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, SendTimeoutError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Statistics for the work queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total paths enqueued
    pub enqueued: AtomicU64,

    /// Total paths dequeued
    pub dequeued: AtomicU64,

    /// Number of times the producer timed out on a full queue
    pub backpressure_events: AtomicU64,
}

impl QueueStats {
    /// Get backpressure event count
    pub fn backpressure_count(&self) -> u64 {
        self.backpressure_events.load(Ordering::Relaxed)
    }
}

/// Outcome of submitting a path to the work queue
#[derive(Debug, PartialEq, Eq)]
pub enum Submit {
    /// Path enqueued
    Sent,

    /// Queue full for the whole timeout; caller re-checks cancellation
    /// and retries
    Full,

    /// Every receiver is gone; the worker pool has terminated
    Closed,
}

/// Outcome of polling the work queue
#[derive(Debug)]
pub enum Poll {
    /// A path is ready for processing
    Task(PathBuf),

    /// No path arrived within the timeout; the queue is still open
    Empty,

    /// The producer has dropped its sender and the queue is drained
    Closed,
}

/// Bounded queue of file paths awaiting a stat
///
/// The producer owns this struct; dropping it closes the queue.
pub struct WorkQueue {
    sender: Sender<PathBuf>,
    receiver: Receiver<PathBuf>,
    capacity: usize,
    stats: Arc<QueueStats>,
}

impl WorkQueue {
    /// Create a new work queue with the specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);

        Self {
            sender,
            receiver,
            capacity,
            stats: Arc::new(QueueStats::default()),
        }
    }

    /// Get a receiver handle (clone one per worker)
    pub fn receiver(&self) -> WorkReceiver {
        WorkReceiver {
            receiver: self.receiver.clone(),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Get queue statistics
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }

    /// Get queue capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Submit a path, waiting at most `timeout` for a free slot
    pub fn submit_timeout(&self, path: PathBuf, timeout: Duration) -> Submit {
        match self.sender.send_timeout(path, timeout) {
            Ok(()) => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                Submit::Sent
            }
            Err(SendTimeoutError::Timeout(_)) => {
                self.stats.backpressure_events.fetch_add(1, Ordering::Relaxed);
                Submit::Full
            }
            Err(SendTimeoutError::Disconnected(_)) => Submit::Closed,
        }
    }
}

/// Handle for pulling paths from the work queue
#[derive(Clone)]
pub struct WorkReceiver {
    receiver: Receiver<PathBuf>,
    stats: Arc<QueueStats>,
}

impl WorkReceiver {
    /// Poll for a path, waiting at most `timeout`
    pub fn poll(&self, timeout: Duration) -> Poll {
        match self.receiver.recv_timeout(timeout) {
            Ok(path) => {
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                Poll::Task(path)
            }
            Err(RecvTimeoutError::Timeout) => Poll::Empty,
            Err(RecvTimeoutError::Disconnected) => Poll::Closed,
        }
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        self.receiver.len()
    }
}

/// Channel carrying matches from workers to the collector
pub struct MatchChannel {
    sender: Sender<ScanMatch>,
    receiver: Receiver<ScanMatch>,
}

impl MatchChannel {
    /// Create a new match channel with the specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Get a sender handle (clone one per worker)
    pub fn sender(&self) -> MatchSender {
        MatchSender {
            sender: self.sender.clone(),
        }
    }

    /// Consume the channel, returning the collector's receiver
    ///
    /// Dropping the channel's own sender here is what lets the collector
    /// observe disconnection once the workers' clones are gone.
    pub fn into_receiver(self) -> Receiver<ScanMatch> {
        self.receiver
    }
}

/// Handle for emitting matches from a worker
#[derive(Clone)]
pub struct MatchSender {
    sender: Sender<ScanMatch>,
}

impl MatchSender {
    /// Emit a match, waiting at most `timeout` for a free slot
    ///
    /// Returns `Ok(true)` if sent, `Ok(false)` on timeout (caller re-checks
    /// cancellation and retries), `Err` if the collector is gone.
    pub fn send_timeout(&self, m: ScanMatch, timeout: Duration) -> Result<bool, ()> {
        match self.sender.send_timeout(m, timeout) {
            Ok(()) => Ok(true),
            Err(SendTimeoutError::Timeout(_)) => Ok(false),
            Err(SendTimeoutError::Disconnected(_)) => Err(()),
        }
    }
}
