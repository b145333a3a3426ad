//! # Fingerprint Module
//!
//! Coarse bucket keys that let file matching skip most pairwise
//! comparisons.
//!
//! ## How It Works
//! 1. Each right-hand file is filed under one key derived from
//!    `(is_dir, size)`, plus the modification time quantized into
//!    buckets unless time is ignored
//! 2. A left-hand file probes three keys: its own bucket and the two
//!    neighbours, covering drift of up to one bucket width either way
//!
//! A bucket is never narrower than the comparator's time tolerance, so
//! every pair the comparator would accept shares a probed bucket.
//! 3. Every candidate found this way still has to pass the comparator
//!
//! Collisions are expected: a key is an equivalence class, not an
//! identity.

use crate::core::comparator::DEFAULT_TOLERANCE_SECS;
use crate::core::tree::{Entry, Index};
use std::collections::HashMap;
use xxhash_rust::xxh3::xxh3_64;

/// Default bucket width in seconds
pub const DEFAULT_BUCKET_SECS: f64 = 100.0;

/// A bucket key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketKey(u64);

/// Derives bucket keys from entry metadata
#[derive(Debug, Clone, Copy)]
pub struct Fingerprinter {
    ignore_time: bool,
    bucket_secs: f64,
    tolerance_secs: f64,
}

impl Fingerprinter {
    pub fn new(ignore_time: bool) -> Self {
        Self {
            ignore_time,
            bucket_secs: DEFAULT_BUCKET_SECS,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Set the width of one time bucket (non-positive values are ignored)
    pub fn with_bucket_secs(mut self, secs: f64) -> Self {
        if secs > 0.0 {
            self.bucket_secs = secs;
        }
        self
    }

    /// Widen buckets to at least the comparator's time tolerance
    pub fn with_tolerance(mut self, secs: f64) -> Self {
        if secs.is_finite() {
            self.tolerance_secs = secs.abs();
        }
        self
    }

    /// Effective bucket width in seconds
    pub fn bucket_width(&self) -> f64 {
        self.bucket_secs.max(self.tolerance_secs)
    }

    /// The time bucket an entry falls into (saturating for extreme times)
    pub fn bucket_of(&self, entry: &Entry) -> i64 {
        (entry.modified / self.bucket_width()).floor() as i64
    }

    /// The single key an indexed entry is filed under
    pub fn index_key(&self, entry: &Entry) -> BucketKey {
        if self.ignore_time {
            key(entry.is_dir, entry.size, None)
        } else {
            key(entry.is_dir, entry.size, Some(self.bucket_of(entry)))
        }
    }

    /// Keys to probe for a subject, nearest bucket first
    pub fn probe_keys(&self, entry: &Entry) -> Vec<BucketKey> {
        if self.ignore_time {
            return vec![key(entry.is_dir, entry.size, None)];
        }

        let bucket = self.bucket_of(entry);
        let mut buckets = vec![bucket.saturating_sub(1), bucket, bucket.saturating_add(1)];
        buckets.dedup();
        buckets
            .into_iter()
            .map(|b| key(entry.is_dir, entry.size, Some(b)))
            .collect()
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new(false)
    }
}

fn key(is_dir: bool, size: u64, bucket: Option<i64>) -> BucketKey {
    let mut bytes = [0u8; 18];
    bytes[0] = is_dir as u8;
    bytes[1..9].copy_from_slice(&size.to_le_bytes());
    let len = match bucket {
        Some(b) => {
            bytes[9] = 1;
            bytes[10..18].copy_from_slice(&b.to_le_bytes());
            18
        }
        None => 9,
    };
    BucketKey(xxh3_64(&bytes[..len]))
}

/// Right-hand files grouped by bucket key
pub struct FingerprintIndex<'a> {
    fingerprinter: Fingerprinter,
    buckets: HashMap<BucketKey, Vec<&'a Entry>>,
}

impl<'a> FingerprintIndex<'a> {
    /// File every file of `index` under its key, keeping index order within a bucket
    pub fn build(fingerprinter: Fingerprinter, index: &Index<'a>) -> Self {
        let mut buckets: HashMap<BucketKey, Vec<&'a Entry>> = HashMap::new();
        for entry in index.files() {
            buckets
                .entry(fingerprinter.index_key(entry))
                .or_default()
                .push(entry);
        }

        tracing::debug!(
            buckets = buckets.len(),
            largest = buckets.values().map(Vec::len).max().unwrap_or(0),
            "built fingerprint index"
        );

        Self {
            fingerprinter,
            buckets,
        }
    }

    /// Candidates for `subject`: probe keys in order, bucket members in insertion order
    pub fn candidates<'s>(&'s self, subject: &Entry) -> impl Iterator<Item = &'a Entry> + 's {
        self.fingerprinter
            .probe_keys(subject)
            .into_iter()
            .filter_map(move |key| self.buckets.get(&key))
            .flat_map(|bucket| bucket.iter().copied())
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::Tree;

    #[test]
    fn ignoring_time_yields_one_probe_key() {
        let fp = Fingerprinter::new(true);
        let entry = Entry::file("/a", 10, 12345.0);
        assert_eq!(fp.probe_keys(&entry), vec![fp.index_key(&entry)]);
    }

    #[test]
    fn probe_keys_cover_neighbouring_buckets() {
        let fp = Fingerprinter::new(false).with_tolerance(0.0);
        let subject = Entry::file("/l/a", 10, 1099.0);
        let probes = fp.probe_keys(&subject);

        assert_eq!(probes.len(), 3);
        for modified in [950.0, 1050.0, 1150.0] {
            let target = Entry::file("/r/a", 10, modified);
            assert!(probes.contains(&fp.index_key(&target)));
        }
        let far = Entry::file("/r/a", 10, 1250.0);
        assert!(!probes.contains(&fp.index_key(&far)));
    }

    #[test]
    fn size_and_kind_separate_keys() {
        let fp = Fingerprinter::new(true);
        let a = Entry::file("/a", 10, 0.0);
        let b = Entry::file("/b", 11, 0.0);
        let mut c = Entry::file("/c", 10, 0.0);
        c.is_dir = true;

        assert_ne!(fp.index_key(&a), fp.index_key(&b));
        assert_ne!(fp.index_key(&a), fp.index_key(&c));
    }

    #[test]
    fn bucket_width_is_tunable() {
        let fp = Fingerprinter::new(false)
            .with_bucket_secs(10.0)
            .with_tolerance(0.0);
        assert_eq!(fp.bucket_of(&Entry::file("/a", 1, 125.0)), 12);
        let ignored = Fingerprinter::new(false)
            .with_bucket_secs(0.0)
            .with_tolerance(0.0);
        assert_eq!(ignored.bucket_of(&Entry::file("/a", 1, 125.0)), 1);
    }

    #[test]
    fn buckets_are_never_narrower_than_tolerance() {
        let fp = Fingerprinter::new(false).with_bucket_secs(100.0);
        assert_eq!(fp.bucket_width(), DEFAULT_TOLERANCE_SECS);

        let wide = fp.with_tolerance(300.0);
        let subject = Entry::file("/l/a", 7, 199.0);
        let target = Entry::file("/r/a", 7, 499.0);
        assert!(wide.probe_keys(&subject).contains(&wide.index_key(&target)));
    }

    #[test]
    fn extreme_timestamps_saturate() {
        let fp = Fingerprinter::new(false);
        for modified in [1e300, -1e300, f64::INFINITY, f64::NEG_INFINITY] {
            let entry = Entry::file("/a", 7, modified);
            let probes = fp.probe_keys(&entry);
            assert_eq!(probes.len(), 2);
            assert!(probes.contains(&fp.index_key(&entry)));
        }
    }

    #[test]
    fn index_returns_candidates_in_insertion_order() {
        let tree = Tree::from_entries([
            Entry::file("/r/first", 10, 1000.0),
            Entry::file("/r/other", 99, 1000.0),
            Entry::file("/r/second", 10, 1010.0),
        ]);
        let index = tree.index().unwrap();
        let fp_index = FingerprintIndex::build(Fingerprinter::new(false), &index);

        let subject = Entry::file("/l/x", 10, 1005.0);
        let names: Vec<_> = fp_index
            .candidates(&subject)
            .map(|e| e.name.as_str())
            .collect();

        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn directories_are_not_indexed() {
        let tree = Tree::from_entries([Entry::dir("/r/d", [])]);
        let index = tree.index().unwrap();
        let fp_index = FingerprintIndex::build(Fingerprinter::new(true), &index);
        assert_eq!(fp_index.bucket_count(), 0);
    }
}
