//! Integration tests for repo-walker
//!
//! These exercise the public scan API against real temporary trees, plus
//! the clone-then-scan flow against a locally-initialised repository.

use repo_walker::error::ScanError;
use repo_walker::scanner::{self, ScanCoordinator, ScanOptions};
use repo_walker::{git, ScanRequest};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::TempDir;

const MIB: u64 = 1024 * 1024;

fn write_file(root: &Path, name: &str, len: usize) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, vec![0u8; len]).unwrap();
}

fn names(matches: &[repo_walker::ScanMatch]) -> BTreeSet<String> {
    matches.iter().map(|m| m.relative_path.clone()).collect()
}

#[test]
fn test_scan_nested_tree() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "README.md", 100);
    write_file(dir.path(), "assets/video.mp4", 3 * MIB as usize);
    write_file(dir.path(), "assets/icons/logo.png", 2048);
    write_file(dir.path(), "data/dumps/db.sql", 2 * MIB as usize);
    write_file(dir.path(), ".git/objects/pack/big.pack", 20 * MIB as usize);

    let result = scanner::scan(dir.path(), MIB, 4).unwrap();

    assert_eq!(
        names(&result.matches),
        BTreeSet::from([
            "assets/video.mp4".to_string(),
            "data/dumps/db.sql".to_string(),
        ])
    );
    assert_eq!(result.files_scanned, 4);
}

#[test]
fn test_scan_wide_tree_with_small_queue() {
    let dir = TempDir::new().unwrap();
    let mut expected = BTreeSet::new();
    for i in 0..300 {
        let name = format!("d{}/f{}.bin", i % 10, i);
        let len = if i % 5 == 0 { 8192 } else { 64 };
        if i % 5 == 0 {
            expected.insert(name.clone());
        }
        write_file(dir.path(), &name, len);
    }

    // A queue smaller than the file count forces producer backpressure
    let options = ScanOptions {
        threshold_bytes: 4096,
        worker_count: 8,
        queue_size: 128,
    };
    let result = ScanCoordinator::new(dir.path(), options).run().unwrap();

    assert_eq!(names(&result.matches), expected);
    assert_eq!(result.files_scanned, 300);
}

#[test]
fn test_cancellation_during_scan_terminates() {
    let dir = TempDir::new().unwrap();
    for i in 0..500 {
        write_file(dir.path(), &format!("sub{}/f{}.bin", i % 20, i), 4096);
    }

    let options = ScanOptions {
        threshold_bytes: 0,
        worker_count: 2,
        queue_size: 128,
    };
    let coordinator = ScanCoordinator::new(dir.path(), options);
    let cancel = coordinator.cancel_flag();

    let raiser = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(5));
        cancel.store(true, Ordering::SeqCst);
    });

    // The scan must terminate either complete or cancelled, never hang;
    // if it was cut short the error kind must say so
    match coordinator.run() {
        Ok(result) => assert!(result.matches.len() <= 500),
        Err(e) => assert!(e.is_cancelled()),
    }

    raiser.join().unwrap();
}

#[test]
fn test_report_json_shape() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "large.bin", 1_572_864);

    let result = scanner::scan(dir.path(), MIB, 2).unwrap();
    let json = serde_json::to_value(&result.matches).unwrap();

    assert_eq!(
        json,
        serde_json::json!([
            {"name": "large.bin", "size": 1_572_864}
        ])
    );
}

#[test]
fn test_clone_then_scan() {
    use git2::{Repository, Signature};

    let src = TempDir::new().unwrap();
    let repo = Repository::init(src.path()).unwrap();

    write_file(src.path(), "README.md", 5);
    write_file(src.path(), "dataset.bin", (MIB + 123) as usize);
    {
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("README.md")).unwrap();
        index.add_path(Path::new("dataset.bin")).unwrap();
        index.write().unwrap();

        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("test-name", "test-name@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
            .unwrap();
    }

    let cancel = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let cloned = git::clone_repo(src.path().to_str().unwrap(), None, &cancel).unwrap();

    let result = scanner::scan(cloned.path(), MIB, 4).unwrap();

    // The clone's own .git metadata must never show up in the report
    assert_eq!(
        names(&result.matches),
        BTreeSet::from(["dataset.bin".to_string()])
    );
    assert_eq!(result.matches[0].size_bytes, MIB + 123);
}

#[test]
fn test_request_round_trip_drives_scan() {
    let request =
        ScanRequest::from_json(r#"{"clone_url": "https://example.com/repo.git", "size": 1}"#)
            .unwrap();

    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "over.bin", (MIB + 1) as usize);
    write_file(dir.path(), "under.bin", (MIB - 1) as usize);

    let result = scanner::scan(dir.path(), request.threshold_bytes(), 2).unwrap();
    assert_eq!(
        names(&result.matches),
        BTreeSet::from(["over.bin".to_string()])
    );
}

#[test]
fn test_structural_error_on_missing_root() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone");

    match scanner::scan(&missing, MIB, 2) {
        Err(ScanError::Traversal { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected traversal error, got {:?}", other),
    }
}
