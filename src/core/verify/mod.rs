//! # Verify Module
//!
//! Optional content check for matched files.
//!
//! Metadata matching cannot tell apart two files of equal size and time
//! with different contents. The verifier hashes the real files behind a
//! partner pair and classifies the pair.
//!
//! ## Locating Files
//! Entries may carry rewritten paths. The verifier starts from the
//! entry's origin path, then applies the first matching [`RemapRule`].
//!
//! ## Memoization
//! Digests are cached by origin path, so a file partnered more than once
//! is read once. Unreadable files produce [`ContentDigest::Unknown`]
//! instead of an error.

mod remap;

pub use remap::RemapRule;

use crate::core::partner::PartnerPair;
use crate::error::VerifyError;
use crate::core::tree::Entry;
use crate::events::{Event, EventSender, ProgressTicker, VerifyEvent, DEFAULT_PROGRESS_INTERVAL};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Duration;
use xxhash_rust::xxh3::Xxh3;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Digest of a file's contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentDigest {
    Known(u64),
    /// The file could not be read
    Unknown { reason: String },
}

/// Outcome of verifying one partner pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verification {
    /// Both files hashed to the same digest
    Confirmed,
    /// Contents differ
    Refuted,
    /// At least one side could not be read
    Unknown,
}

impl std::fmt::Display for Verification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verification::Confirmed => write!(f, "confirmed"),
            Verification::Refuted => write!(f, "refuted"),
            Verification::Unknown => write!(f, "unknown"),
        }
    }
}

/// Hashes the files behind entries of one tree
pub struct ContentVerifier {
    rules: Vec<RemapRule>,
    origin_root: Option<String>,
    digests: RwLock<HashMap<String, ContentDigest>>,
}

impl ContentVerifier {
    /// Create a verifier.
    ///
    /// `origin_root` is the tree's common root before any rewrite and is
    /// what a rule without an old prefix replaces.
    pub fn new(rules: Vec<RemapRule>, origin_root: Option<String>) -> Result<Self, VerifyError> {
        validate_rules(&rules)?;
        Ok(Self {
            rules,
            origin_root,
            digests: RwLock::new(HashMap::new()),
        })
    }

    /// Where the file for `entry` is read from
    pub fn locate(&self, entry: &Entry) -> PathBuf {
        let origin = entry.origin();
        self.rules
            .iter()
            .find_map(|rule| rule.apply(origin, self.origin_root.as_deref()))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(origin))
    }

    /// Digest of the file behind `entry`, memoized by origin path
    pub fn digest(&self, entry: &Entry) -> ContentDigest {
        let key = entry.origin();
        if let Ok(digests) = self.digests.read() {
            if let Some(digest) = digests.get(key) {
                return digest.clone();
            }
        }

        let path = self.locate(entry);
        let digest = match hash_file(&path) {
            Ok(hash) => ContentDigest::Known(hash),
            Err(e) => {
                tracing::warn!("Cannot read {}: {}", path.display(), e);
                ContentDigest::Unknown {
                    reason: e.to_string(),
                }
            }
        };

        if let Ok(mut digests) = self.digests.write() {
            digests.insert(key.to_string(), digest.clone());
        }
        digest
    }

    /// Number of distinct files hashed so far
    pub fn cached(&self) -> usize {
        self.digests.read().map(|d| d.len()).unwrap_or(0)
    }
}

/// At most one rule may omit its old prefix
pub fn validate_rules(rules: &[RemapRule]) -> Result<(), VerifyError> {
    let rootless = rules.iter().filter(|r| r.old_prefix.is_none()).count();
    if rootless > 1 {
        return Err(VerifyError::AmbiguousRemap { count: rootless });
    }
    Ok(())
}

fn hash_file(path: &std::path::Path) -> std::io::Result<u64> {
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, File::open(path)?);
    let mut hasher = Xxh3::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hasher.digest())
}

/// Classifies partner pairs by content
pub struct PairVerifier<'v> {
    left: &'v ContentVerifier,
    right: &'v ContentVerifier,
    parallel: bool,
    progress_interval: Duration,
}

impl<'v> PairVerifier<'v> {
    pub fn new(left: &'v ContentVerifier, right: &'v ContentVerifier) -> Self {
        Self {
            left,
            right,
            parallel: true,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Verify every pair, returning results in pair order
    pub fn verify<'p>(&self, pairs: &[PartnerPair<'p>], events: &EventSender) -> Vec<Verification> {
        let total = pairs.len();
        events.send(Event::Verify(VerifyEvent::Started { total_pairs: total }));

        let ticker = ProgressTicker::new(self.progress_interval);
        let step = |pair: &PartnerPair<'p>| {
            let verification = self.verify_pair(pair, events);
            if let Some(completed) = ticker.tick() {
                tracing::info!("Verified {}/{} pairs", completed, total);
                events.send(Event::Verify(VerifyEvent::Progress { completed, total }));
            }
            verification
        };

        let results: Vec<Verification> = if self.parallel {
            pairs.par_iter().map(step).collect()
        } else {
            pairs.iter().map(step).collect()
        };

        let count = |wanted: Verification| results.iter().filter(|v| **v == wanted).count();
        events.send(Event::Verify(VerifyEvent::Completed {
            confirmed: count(Verification::Confirmed),
            refuted: count(Verification::Refuted),
            unknown: count(Verification::Unknown),
        }));
        results
    }

    fn verify_pair(&self, pair: &PartnerPair<'_>, events: &EventSender) -> Verification {
        let left = self.left.digest(pair.subject);
        let right = self.right.digest(pair.partner);

        for (digest, verifier, entry) in [
            (&left, self.left, pair.subject),
            (&right, self.right, pair.partner),
        ] {
            if let ContentDigest::Unknown { reason } = digest {
                events.send(Event::Verify(VerifyEvent::Unreadable {
                    path: verifier.locate(entry),
                    message: reason.clone(),
                }));
            }
        }

        match (left, right) {
            (ContentDigest::Known(a), ContentDigest::Known(b)) if a == b => Verification::Confirmed,
            (ContentDigest::Known(_), ContentDigest::Known(_)) => Verification::Refuted,
            _ => Verification::Unknown,
        }
    }
}
