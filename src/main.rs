//! repo-walker - Large-File Repository Scanner
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use repo_walker::config::{CliArgs, ScanConfig};
use repo_walker::error::ScanError;
use repo_walker::git;
use repo_walker::progress::{print_header, print_summary, ProgressReporter};
use repo_walker::scanner::{ScanCoordinator, ScanMatch, ScanOptions};
use serde::Serialize;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// JSON report written to stdout
#[derive(Serialize)]
struct Report<'a> {
    total_num_of_files: usize,
    files: &'a [ScanMatch],
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose);

    // Validate configuration and read the scan request
    let config = ScanConfig::from_args(&args).context("Invalid configuration")?;
    let request = args.read_request().context("Invalid scan request")?;

    // One cancellation flag covers both the clone and the scan
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || {
            eprintln!("\nInterrupt received, shutting down...");
            cancel.store(true, Ordering::SeqCst);
        })
        .context("Failed to set signal handler")?;
    }

    if config.show_progress {
        print_header(
            &request.clone_url,
            request.threshold_bytes(),
            config.worker_count,
        );
    }

    let progress = if config.show_progress {
        Some(ProgressReporter::new())
    } else {
        None
    };

    // Acquire the repository
    if let Some(ref p) = progress {
        p.set_status("Cloning repository...");
    }
    let repo = git::clone_repo(&request.clone_url, request.token.as_deref(), &cancel)
        .context("Failed to clone repository")?;

    // Scan the working tree
    if let Some(ref p) = progress {
        p.set_status("Scanning files...");
    }
    info!(
        dir = %repo.path().display(),
        threshold_mb = request.size_mb,
        "Scanning files"
    );

    let options = ScanOptions {
        threshold_bytes: request.threshold_bytes(),
        worker_count: config.worker_count,
        queue_size: config.queue_size,
    };
    let result = ScanCoordinator::with_cancel(repo.path(), options, Arc::clone(&cancel)).run();

    if let Some(ref p) = progress {
        p.finish_and_clear();
    }

    match result {
        Ok(result) => {
            let report = Report {
                total_num_of_files: result.matches.len(),
                files: &result.matches,
            };
            serde_json::to_writer_pretty(std::io::stdout().lock(), &report)
                .context("Failed to serialize report")?;
            println!();

            if config.show_progress {
                print_summary(
                    result.matches.len() as u64,
                    result.files_scanned,
                    result.skipped,
                    result.duration,
                );
            }

            Ok(())
        }
        Err(ScanError::Cancelled) => anyhow::bail!("scan stopped on user request"),
        Err(e) => {
            let partial = e.partial_matches().len();
            if partial > 0 {
                info!(partial = partial, "Matches collected before the failure");
            }
            Err(e).context("Scan failed")
        }
    }
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("repo_walker=debug,warn")
    } else {
        EnvFilter::new("repo_walker=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
