//! Result types produced by a scan

use crate::scanner::size;
use serde::Serialize;
use std::time::Duration;

/// One file whose size exceeds the threshold
///
/// Created by a worker when a stat result qualifies; immutable afterwards.
/// The path is relative to the scan root and is unique within one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanMatch {
    /// Path relative to the scan root
    #[serde(rename = "name")]
    pub relative_path: String,

    /// Exact file size at time of stat
    #[serde(rename = "size")]
    pub size_bytes: u64,

    /// Human-readable size, e.g. "1.50 MB"; presentational only and kept
    /// out of the wire format
    #[serde(skip)]
    pub size_display: String,
}

impl ScanMatch {
    /// Create a match, deriving the display string from the byte size
    pub fn new(relative_path: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            relative_path: relative_path.into(),
            size_bytes,
            size_display: size::format_mb(size_bytes),
        }
    }
}

/// Result of a completed scan
///
/// `matches` carries no ordering guarantee; two scans of the same tree may
/// yield the same membership in a different order.
#[derive(Debug)]
pub struct ScanResult {
    /// Files exceeding the threshold
    pub matches: Vec<ScanMatch>,

    /// Files successfully statted (submitted entries whose stat failed
    /// are counted in `skipped` instead)
    pub files_scanned: u64,

    /// Directories enumerated
    pub dirs_scanned: u64,

    /// Entries skipped because their stat failed
    pub skipped: u64,

    /// Time taken for the scan
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_display_derived() {
        let m = ScanMatch::new("data/large.bin", 1_572_864);
        assert_eq!(m.relative_path, "data/large.bin");
        assert_eq!(m.size_bytes, 1_572_864);
        assert_eq!(m.size_display, "1.50 MB");
    }

    #[test]
    fn test_match_serialization() {
        let m = ScanMatch::new("large.bin", 2_097_152);
        let json = serde_json::to_value(&m).unwrap();

        // The display string stays out of the wire format
        assert_eq!(
            json,
            serde_json::json!({"name": "large.bin", "size": 2_097_152})
        );
    }
}
