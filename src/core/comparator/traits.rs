//! Trait definitions for entry comparison.

use crate::core::tree::Entry;

/// Strategy trait for deciding whether two entries are the same
pub trait EntryComparator: Send + Sync {
    /// Whether two files agree on metadata
    fn files_equal(&self, a: &Entry, b: &Entry) -> bool;

    /// Whether two directory subtrees agree on shape and file metadata
    fn directories_equal(&self, a: &Entry, b: &Entry) -> bool;

    /// Human-readable description of the strategy
    fn description(&self) -> String;

    /// Dispatch on kind; a file never equals a directory
    fn entries_equal(&self, a: &Entry, b: &Entry) -> bool {
        match (a.is_dir, b.is_dir) {
            (true, true) => self.directories_equal(a, b),
            (false, false) => self.files_equal(a, b),
            _ => false,
        }
    }
}
