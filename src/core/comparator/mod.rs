//! # Comparator Module
//!
//! Decides whether two entries are equivalent using metadata only.
//!
//! ## Rules
//! - **Files** are equal when kind and size match and, unless time is
//!   ignored, their modification times differ by at most the tolerance
//! - **Directories** are equal when they hold the same set of
//!   `(is_dir, name)` children and every pair of same-named children is
//!   equal by the same rules, recursively
//!
//! File contents are never read, so two directories of identical shape
//! whose equally-sized files have swapped contents compare equal. Use the
//! `verify` module when that matters.

mod traits;

pub use traits::EntryComparator;

use crate::core::tree::Entry;

/// Default modification-time tolerance in seconds
pub const DEFAULT_TOLERANCE_SECS: f64 = 120.0;

/// Compares entries by size, kind and modification time
#[derive(Debug, Clone, Copy)]
pub struct MetadataComparator {
    ignore_time: bool,
    tolerance_secs: f64,
}

impl MetadataComparator {
    pub fn new(ignore_time: bool) -> Self {
        Self {
            ignore_time,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Set the accepted modification-time difference in seconds
    pub fn with_tolerance(mut self, secs: f64) -> Self {
        self.tolerance_secs = secs.abs();
        self
    }

    pub fn ignores_time(&self) -> bool {
        self.ignore_time
    }

    pub fn tolerance_secs(&self) -> f64 {
        self.tolerance_secs
    }
}

impl Default for MetadataComparator {
    fn default() -> Self {
        Self::new(false)
    }
}

impl EntryComparator for MetadataComparator {
    fn files_equal(&self, a: &Entry, b: &Entry) -> bool {
        if a.is_dir || b.is_dir {
            return false;
        }
        if a.size != b.size {
            return false;
        }
        self.ignore_time || (a.modified - b.modified).abs() <= self.tolerance_secs
    }

    fn directories_equal(&self, a: &Entry, b: &Entry) -> bool {
        if !a.is_dir || !b.is_dir {
            return false;
        }

        // Names are unique per directory, so equal counts plus every name
        // of `a` present in `b` with the same kind means equal sets.
        if a.children.len() != b.children.len() {
            return false;
        }
        let same_shape = a.children.iter().all(|(name, child)| {
            b.children
                .get(name)
                .is_some_and(|other| other.is_dir == child.is_dir)
        });
        if !same_shape {
            return false;
        }

        a.children.iter().all(|(name, child)| match b.children.get(name) {
            Some(other) if child.is_dir => self.directories_equal(child, other),
            Some(other) => self.files_equal(child, other),
            None => false,
        })
    }

    fn description(&self) -> String {
        if self.ignore_time {
            "Metadata comparison: equal size, modification time ignored".to_string()
        } else {
            format!(
                "Metadata comparison: equal size, modification time within {}s",
                self.tolerance_secs
            )
        }
    }
}
