//! Integration tests for the pipeline module.
//!
//! These tests run the pipeline end to end on real directories:
//! - Scanning both sides and matching files or directories
//! - Snapshots standing in for scans
//! - Root rewrites, remapping and content verification
//! - Fatal input errors

use snapshot_reconcile::core::partner::MatchMode;
use snapshot_reconcile::core::pipeline::{Pipeline, Report};
use snapshot_reconcile::core::scanner::{path_string, ScanPaths};
use snapshot_reconcile::core::verify::{RemapRule, Verification};
use snapshot_reconcile::error::{FilterError, ReconcileError, ScanError};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};
use tempfile::TempDir;

fn write_file(root: &Path, relative: &str, contents: &[u8], mtime_secs: u64) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut file = File::create(&path).unwrap();
    file.write_all(contents).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(mtime_secs))
        .unwrap();
}

/// Left: docs/{a.txt, b.txt}; right: backup/{a.txt, c.txt}
fn scenario() -> (TempDir, TempDir) {
    let left = TempDir::new().unwrap();
    let right = TempDir::new().unwrap();
    write_file(left.path(), "docs/a.txt", &[b'a'; 100], 1_000_000);
    write_file(left.path(), "docs/b.txt", &[b'b'; 50], 2_000_000);
    write_file(right.path(), "backup/a.txt", &[b'a'; 100], 1_000_005);
    write_file(right.path(), "backup/c.txt", &[b'c'; 50], 5_000_000);
    (left, right)
}

fn pairs(report: &Report) -> Vec<(String, String)> {
    report
        .partners
        .iter()
        .map(|p| (p.subject.clone(), p.partner.clone()))
        .collect()
}

fn singles(report: &Report) -> Vec<String> {
    report.singles.iter().map(|s| s.display_path()).collect()
}

#[test]
fn pipeline_matches_scanned_files() {
    let (left, right) = scenario();

    let report = Pipeline::builder()
        .left(left.path())
        .right(right.path())
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(
        pairs(&report),
        vec![("docs/a.txt".to_string(), "backup/a.txt".to_string())]
    );
    assert_eq!(singles(&report), vec!["docs/b.txt"]);
    assert_eq!(report.left.before_filter.files, 2);
    assert_eq!(report.right.before_filter.total_size, 150);
    assert!(report.warnings.is_empty());
}

#[test]
fn ignoring_time_adds_partners() {
    let (left, right) = scenario();

    let report = Pipeline::builder()
        .left(left.path())
        .right(right.path())
        .ignore_time(true)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.partners.len(), 2);
    assert!(report.singles.is_empty());
}

#[test]
fn pipeline_matches_directories() {
    let left = TempDir::new().unwrap();
    let right = TempDir::new().unwrap();
    write_file(left.path(), "album/x.jpg", b"xx", 500);
    write_file(left.path(), "album/y.jpg", b"yyy", 500);
    write_file(left.path(), "lonely/z.jpg", b"z", 500);
    write_file(right.path(), "copy/album/x.jpg", b"xx", 510);
    write_file(right.path(), "copy/album/y.jpg", b"yyy", 490);

    let report = Pipeline::builder()
        .left(left.path())
        .right(right.path())
        .mode(MatchMode::Directories)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(
        pairs(&report),
        vec![("album".to_string(), "copy/album".to_string())]
    );
    assert_eq!(singles(&report), vec!["lonely/"]);
}

#[test]
fn saved_snapshot_reproduces_the_scan() {
    let (left, right) = scenario();
    let snapshots = TempDir::new().unwrap();
    let snapshot = snapshots.path().join("left.json");

    let scanned = Pipeline::builder()
        .left(left.path())
        .right(right.path())
        .save_left(&snapshot)
        .build()
        .unwrap()
        .run()
        .unwrap();
    let loaded = Pipeline::builder()
        .left(&snapshot)
        .right(right.path())
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert!(snapshot.exists());
    assert_eq!(pairs(&scanned), pairs(&loaded));
    assert_eq!(singles(&scanned), singles(&loaded));
}

#[test]
fn verification_confirms_and_refutes() {
    let (left, right) = scenario();
    write_file(left.path(), "docs/same.bin", b"12345678", 3_000_000);
    write_file(left.path(), "docs/diff.bin", b"aaaaaaaaa", 3_000_000);
    write_file(right.path(), "backup/same.bin", b"12345678", 3_000_000);
    write_file(right.path(), "backup/diff.bin", b"bbbbbbbbb", 3_000_000);

    let report = Pipeline::builder()
        .left(left.path())
        .right(right.path())
        .verify(true)
        .parallel(false)
        .build()
        .unwrap()
        .run()
        .unwrap();

    let verdict = |subject: &str| {
        report
            .partners
            .iter()
            .find(|p| p.subject == subject)
            .and_then(|p| p.verification)
    };
    assert_eq!(verdict("docs/same.bin"), Some(Verification::Confirmed));
    assert_eq!(verdict("docs/diff.bin"), Some(Verification::Refuted));
    assert_eq!(verdict("docs/a.txt"), Some(Verification::Confirmed));
    assert_eq!(report.verification_counts(), (2, 1, 0));
}

#[test]
fn remap_locates_moved_files_behind_a_snapshot() {
    let (left, right) = scenario();
    let snapshots = TempDir::new().unwrap();
    let snapshot = snapshots.path().join("left.json");
    Pipeline::builder()
        .left(left.path())
        .right(right.path())
        .save_left(&snapshot)
        .build()
        .unwrap()
        .run()
        .unwrap();

    let moved = TempDir::new().unwrap();
    let new_home = moved.path().join("relocated");
    fs::rename(left.path(), &new_home).unwrap();

    let report = Pipeline::builder()
        .left(&snapshot)
        .right(right.path())
        .rewrite_left("/virtual/left")
        .remap_left(vec![RemapRule::root(path_string(&new_home))])
        .verify(true)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.left.root, "/virtual/left");
    assert_eq!(report.partners[0].verification, Some(Verification::Confirmed));
}

#[test]
fn skip_paths_prune_both_scans() {
    let (left, right) = scenario();
    let skipped = path_string(&std::path::absolute(left.path().join("docs")).unwrap());

    let report = Pipeline::builder()
        .left(left.path())
        .right(right.path())
        .scan_paths(ScanPaths::new(Vec::<String>::new(), [skipped]).unwrap())
        .build()
        .unwrap()
        .run();

    // Nothing is left on the left side once docs is skipped
    assert!(matches!(
        report,
        Err(ReconcileError::Tree(_))
    ));
}

#[test]
fn exclude_everything_is_fatal() {
    let (left, right) = scenario();

    let result = Pipeline::builder()
        .left(left.path())
        .right(right.path())
        .exclude(vec![".".to_string()])
        .build()
        .unwrap()
        .run();

    assert!(matches!(
        result,
        Err(ReconcileError::Filter(FilterError::EmptyResult))
    ));
}

#[test]
fn pipeline_handles_nonexistent_path() {
    let (_, right) = scenario();

    let result = Pipeline::builder()
        .left("/nonexistent/path/that/does/not/exist")
        .right(right.path())
        .build()
        .unwrap()
        .run();

    assert!(matches!(
        result,
        Err(ReconcileError::Scan(ScanError::DirectoryNotFound { .. }))
    ));
}
