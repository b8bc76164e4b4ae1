//! Progress reporting for the scan
//!
//! Provides a spinner during clone and scan plus a styled summary once the
//! scan finishes. All of it goes to stderr so stdout stays clean JSON.

use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while cloning and scanning
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a header at the start of a run
pub fn print_header(url: &str, threshold_bytes: u64, workers: usize) {
    eprintln!();
    eprintln!(
        "{} {}",
        style("repo-walker").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Repository:").bold(), url);
    eprintln!(
        "  {} {}",
        style("Threshold:").bold(),
        format_size(threshold_bytes, BINARY)
    );
    eprintln!("  {} {}", style("Workers:").bold(), workers);
    eprintln!();
}

/// Print a summary of the scan results
pub fn print_summary(matches: u64, files: u64, skipped: u64, duration: Duration) {
    let duration_secs = duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        files as f64 / duration_secs
    } else {
        0.0
    };

    eprintln!();
    eprintln!("{}", style("Scan Complete").green().bold());
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!(
        "  {} {}",
        style("Files over threshold:").bold(),
        format_number(matches)
    );
    eprintln!("  {} {}", style("Files scanned:").bold(), format_number(files));
    eprintln!(
        "  {} {:.1}s ({:.0} files/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    if skipped > 0 {
        eprintln!(
            "  {} {}",
            style("Skipped:").yellow().bold(),
            format_number(skipped)
        );
    }
    eprintln!();
}
