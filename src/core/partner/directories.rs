//! Directory-mode matching.

use super::{MatchOutcome, PartnerFinder};
use crate::core::tree::{Entry, Index};
use crate::events::EventSender;

impl<'c> PartnerFinder<'c> {
    /// Pair every non-empty left directory with every equal right directory
    pub fn find_directories<'a>(
        &self,
        left: &Index<'a>,
        right: &Index<'a>,
        events: &EventSender,
    ) -> MatchOutcome<'a> {
        let mut subjects: Vec<&'a Entry> = left
            .directories()
            .filter(|dir| dir.is_non_empty_dir() && self.policy.admits(&dir.path))
            .collect();
        subjects.sort_by_cached_key(|dir| dir.name.to_lowercase());

        let targets: Vec<&'a Entry> = right.directories().collect();
        tracing::info!(
            "Comparing {} directories against {}",
            subjects.len(),
            targets.len()
        );

        self.match_subjects(subjects, events, |subject| {
            targets
                .iter()
                .copied()
                .filter(|target| target.path != subject.path)
                .filter(|target| self.comparator.directories_equal(subject, target))
                .collect()
        })
    }
}
