//! Repository acquisition
//!
//! Clones the requested repository into a temporary directory so the
//! scanner can treat it as a plain local tree. The checkout is removed
//! when the [`ClonedRepo`] handle is dropped.
//!
//! Transient clone failures are retried with linear backoff; the
//! cancellation flag is honored between attempts and during transfer.

use crate::error::{GitError, GitResult};
use git2::build::RepoBuilder;
use git2::{Cred, FetchOptions, RemoteCallbacks};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Clone attempts before giving up
const MAX_ATTEMPTS: u32 = 3;

/// Base delay between attempts (multiplied by the attempt number)
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// A repository checked out into a temporary directory
///
/// Dropping this removes the checkout.
#[derive(Debug)]
pub struct ClonedRepo {
    dir: TempDir,
}

impl ClonedRepo {
    /// Path to the working tree root
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Clone `url` into a fresh temporary directory
///
/// Retries up to [`MAX_ATTEMPTS`] times. `token` is sent as x-oauth-basic
/// credentials when present.
pub fn clone_repo(
    url: &str,
    token: Option<&str>,
    cancel: &Arc<AtomicBool>,
) -> GitResult<ClonedRepo> {
    let dir = tempfile::Builder::new().prefix("repo-walker-").tempdir()?;

    info!(url = url, dest = %dir.path().display(), "Cloning repository");

    let mut last_err = None;
    for attempt in 1..=MAX_ATTEMPTS {
        if cancel.load(Ordering::Relaxed) {
            return Err(GitError::Cancelled);
        }

        match try_clone(url, token, dir.path(), cancel) {
            Ok(()) => {
                debug!(attempt = attempt, "Clone succeeded");
                return Ok(ClonedRepo { dir });
            }
            Err(e) => {
                if cancel.load(Ordering::Relaxed) {
                    return Err(GitError::Cancelled);
                }
                warn!(attempt = attempt, error = %e, "Clone attempt failed");
                last_err = Some(e);

                if attempt < MAX_ATTEMPTS {
                    std::thread::sleep(RETRY_DELAY * attempt);
                    clear_dir(dir.path()).map_err(GitError::Cleanup)?;
                }
            }
        }
    }

    Err(GitError::CloneFailed {
        url: url.to_string(),
        attempts: MAX_ATTEMPTS,
        source: last_err.unwrap_or_else(|| git2::Error::from_str("clone failed")),
    })
}

/// One clone attempt into `dest`
fn try_clone(
    url: &str,
    token: Option<&str>,
    dest: &Path,
    cancel: &Arc<AtomicBool>,
) -> Result<(), git2::Error> {
    let mut callbacks = RemoteCallbacks::new();

    // Returning false from the progress callback aborts the transfer, so
    // a raised flag stops an in-flight clone instead of waiting it out
    let cancel_cb = Arc::clone(cancel);
    callbacks.transfer_progress(move |_| !cancel_cb.load(Ordering::Relaxed));

    if let Some(token) = token {
        let token = token.to_string();
        callbacks.credentials(move |_url, _username, _allowed| {
            Cred::userpass_plaintext("x-oauth-basic", &token)
        });
    }

    let mut fetch = FetchOptions::new();
    fetch.remote_callbacks(callbacks);

    // The local transport does not negotiate shallow fetches
    if !is_local_url(url) {
        fetch.depth(1);
    }

    RepoBuilder::new().fetch_options(fetch).clone(url, dest)?;
    Ok(())
}

/// True for plain paths and file:// URLs
fn is_local_url(url: &str) -> bool {
    url.starts_with("file://") || !url.contains("://")
}

/// Remove the remains of a failed clone attempt so the next one starts
/// into an empty directory
fn clear_dir(dir: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(&path)?;
        } else {
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}
