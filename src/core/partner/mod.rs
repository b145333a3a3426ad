//! # Partner Module
//!
//! Finds, for each left-hand subject, the right-hand entries it
//! corresponds to.
//!
//! ## Modes
//! - **Directories** - every non-empty left directory admitted by the
//!   policy is compared against every right directory. All equal right
//!   directories are recorded, so a subject can have several partners.
//! - **Files** - every left file probes the fingerprint index and takes
//!   the first candidate that passes the comparator.
//!
//! An entry is never paired with an entry at the identical path.
//!
//! ## Parallelism
//! Subjects are independent, so they are matched on the rayon pool.
//! Results are collected in subject order, which is sorted before
//! matching starts, so output never depends on scheduling.

mod directories;
mod files;

use crate::core::comparator::EntryComparator;
use crate::core::fingerprint::Fingerprinter;
use crate::core::transform::MatchPolicy;
use crate::core::tree::{Entry, Index};
use crate::events::{
    Event, EventSender, MatchEvent, MatchProgress, ProgressTicker, DEFAULT_PROGRESS_INTERVAL,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which kind of entry is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Directories,
    Files,
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMode::Directories => write!(f, "directories"),
            MatchMode::Files => write!(f, "files"),
        }
    }
}

/// A subject and one accepted partner
#[derive(Debug, Clone, Copy)]
pub struct PartnerPair<'a> {
    pub subject: &'a Entry,
    pub partner: &'a Entry,
}

/// Result of one matching run
#[derive(Debug, Default)]
pub struct MatchOutcome<'a> {
    /// Every subject, in matching order
    pub subjects: Vec<&'a Entry>,
    /// Accepted pairs, grouped by subject in matching order
    pub partners: Vec<PartnerPair<'a>>,
    /// Subjects without any partner, in matching order
    pub singles: Vec<&'a Entry>,
}

/// The matching engine
pub struct PartnerFinder<'c> {
    comparator: &'c dyn EntryComparator,
    fingerprinter: Fingerprinter,
    policy: MatchPolicy,
    parallel: bool,
    progress_interval: Duration,
}

impl<'c> PartnerFinder<'c> {
    pub fn new(comparator: &'c dyn EntryComparator) -> Self {
        Self {
            comparator,
            fingerprinter: Fingerprinter::default(),
            policy: MatchPolicy::allow_all(),
            parallel: true,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Bucket key settings for file mode
    pub fn fingerprinter(mut self, fingerprinter: Fingerprinter) -> Self {
        self.fingerprinter = fingerprinter;
        self
    }

    /// Policy restricting which left directories become subjects
    pub fn policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Match subjects on the rayon pool
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Minimum time between progress events
    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Run the requested mode
    pub fn find<'a>(
        &self,
        mode: MatchMode,
        left: &Index<'a>,
        right: &Index<'a>,
        events: &EventSender,
    ) -> MatchOutcome<'a> {
        match mode {
            MatchMode::Directories => self.find_directories(left, right, events),
            MatchMode::Files => self.find_files(left, right, events),
        }
    }

    /// Match every subject with `partners_of` and assemble the outcome
    fn match_subjects<'a, F>(
        &self,
        subjects: Vec<&'a Entry>,
        events: &EventSender,
        partners_of: F,
    ) -> MatchOutcome<'a>
    where
        F: Fn(&'a Entry) -> Vec<&'a Entry> + Sync,
    {
        let total = subjects.len();
        events.send(Event::Match(MatchEvent::Started {
            total_subjects: total,
        }));

        let ticker = ProgressTicker::new(self.progress_interval);
        let step = |subject: &&'a Entry| {
            let found = partners_of(*subject);
            if let Some(completed) = ticker.tick() {
                tracing::info!("{}/{}...", completed, total);
                events.send(Event::Match(MatchEvent::Progress(MatchProgress {
                    completed,
                    total,
                })));
            }
            found
        };

        let found: Vec<Vec<&'a Entry>> = if self.parallel {
            subjects.par_iter().map(step).collect()
        } else {
            subjects.iter().map(step).collect()
        };

        let mut partners = Vec::new();
        let mut singles = Vec::new();
        for (subject, found) in subjects.iter().copied().zip(found) {
            if found.is_empty() {
                singles.push(subject);
            }
            partners.extend(
                found
                    .into_iter()
                    .map(|partner| PartnerPair { subject, partner }),
            );
        }
        let outcome = MatchOutcome {
            subjects,
            partners,
            singles,
        };

        events.send(Event::Match(MatchEvent::Completed {
            partners: outcome.partners.len(),
            singles: outcome.singles.len(),
        }));
        outcome
    }
}
