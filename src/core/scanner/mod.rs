//! # Scanner Module
//!
//! Turns a directory on disk into a [`Tree`].
//!
//! ## Partial Failures
//! A scan never aborts because of a single entry:
//! - an unreadable directory is kept with no children
//! - an entry whose metadata cannot be read becomes a file with
//!   `size = 0` and `modified = 0`
//!
//! Both are logged and returned as warnings. Only a missing or unreadable
//! root fails the scan.
//!
//! ## Example
//! ```rust,ignore
//! use snapshot_reconcile::core::scanner::{ScanPaths, TreeScanner, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let outcome = scanner.scan("/mnt/backup".as_ref(), &ScanPaths::all())?;
//! ```

mod filter;
mod walker;

pub use filter::ScanPaths;
pub use walker::{ScanConfig, WalkDirScanner};

use crate::core::tree::Tree;
use crate::error::ScanError;
use crate::events::EventSender;
use std::path::Path;

/// Result of a scan
#[derive(Debug)]
pub struct ScanOutcome {
    /// Entries found directly under the root, with their subtrees
    pub tree: Tree,
    /// Entries that could not be read (non-fatal)
    pub warnings: Vec<ScanError>,
    /// Number of entries visited
    pub entries_scanned: usize,
}

/// Trait for tree scanners
///
/// Implement this trait to create custom scanners (e.g., for testing).
pub trait TreeScanner: Send + Sync {
    /// Scan `root` into a tree
    fn scan(&self, root: &Path, paths: &ScanPaths) -> Result<ScanOutcome, ScanError>;

    /// Scan with progress reporting via events
    fn scan_with_events(
        &self,
        root: &Path,
        paths: &ScanPaths,
        events: &EventSender,
    ) -> Result<ScanOutcome, ScanError>;
}

/// Render a path with `/` separators
pub fn path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
