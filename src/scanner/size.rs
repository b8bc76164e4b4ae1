//! Size classification
//!
//! Pure decision logic for the scan: whether a file's byte length puts it
//! over the threshold, and the human-readable rendering of that length.
//! The rendering is cosmetic and never feeds back into the decision.

/// Bytes per binary megabyte
pub const MIB: u64 = 1024 * 1024;

/// Returns true iff `size_bytes` strictly exceeds `threshold_bytes`.
///
/// Files exactly at the threshold are not reported.
pub fn exceeds_threshold(size_bytes: u64, threshold_bytes: u64) -> bool {
    size_bytes > threshold_bytes
}

/// Format a byte count as binary megabytes with two decimals, e.g. "1.50 MB".
pub fn format_mb(size_bytes: u64) -> String {
    format!("{:.2} MB", size_bytes as f64 / MIB as f64)
}
