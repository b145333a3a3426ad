//! File-mode matching.

use super::{MatchOutcome, PartnerFinder};
use crate::core::fingerprint::FingerprintIndex;
use crate::core::tree::{Entry, Index};
use crate::events::EventSender;

impl<'c> PartnerFinder<'c> {
    /// Pair every left file with the first equal right file from its buckets
    pub fn find_files<'a>(
        &self,
        left: &Index<'a>,
        right: &Index<'a>,
        events: &EventSender,
    ) -> MatchOutcome<'a> {
        let mut subjects: Vec<&'a Entry> = left.files().collect();
        subjects.sort_by_cached_key(|file| file.path.to_lowercase());

        let buckets = FingerprintIndex::build(self.fingerprinter, right);
        tracing::info!(
            "Matching {} files against {} buckets",
            subjects.len(),
            buckets.bucket_count()
        );

        self.match_subjects(subjects, events, |subject| {
            buckets
                .candidates(subject)
                .find(|candidate| {
                    candidate.path != subject.path
                        && self.comparator.files_equal(subject, candidate)
                })
                .into_iter()
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::core::comparator::MetadataComparator;
    use crate::core::fingerprint::Fingerprinter;
    use crate::core::partner::PartnerFinder;
    use crate::core::tree::{Entry, Tree};
    use crate::events::null_sender;
    use std::collections::BTreeSet;

    fn left_docs() -> Tree {
        Tree::from_entries([Entry::dir(
            "/l/docs",
            [
                Entry::file("/l/docs/a.txt", 100, 1000.0),
                Entry::file("/l/docs/b.txt", 50, 2000.0),
            ],
        )])
    }

    fn right_backup() -> Tree {
        Tree::from_entries([Entry::dir(
            "/r/backup",
            [
                Entry::file("/r/backup/a.txt", 100, 1005.0),
                Entry::file("/r/backup/c.txt", 50, 5000.0),
            ],
        )])
    }

    #[test]
    fn pairs_within_tolerance_and_reports_left_singles() {
        let (left, right) = (left_docs(), right_backup());
        let (li, ri) = (left.index().unwrap(), right.index().unwrap());
        let cmp = MetadataComparator::new(false).with_tolerance(5.0);

        let outcome = PartnerFinder::new(&cmp)
            .fingerprinter(Fingerprinter::new(false))
            .find_files(&li, &ri, &null_sender());

        assert_eq!(outcome.partners.len(), 1);
        assert_eq!(outcome.partners[0].subject.path, "/l/docs/a.txt");
        assert_eq!(outcome.partners[0].partner.path, "/r/backup/a.txt");
        let singles: Vec<_> = outcome.singles.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(singles, vec!["/l/docs/b.txt"]);
    }

    #[test]
    fn ignoring_time_finds_a_superset() {
        let (left, right) = (left_docs(), right_backup());
        let (li, ri) = (left.index().unwrap(), right.index().unwrap());
        let pairs = |ignore_time: bool| -> BTreeSet<(String, String)> {
            let cmp = MetadataComparator::new(ignore_time).with_tolerance(5.0);
            PartnerFinder::new(&cmp)
                .fingerprinter(Fingerprinter::new(ignore_time))
                .find_files(&li, &ri, &null_sender())
                .partners
                .iter()
                .map(|p| (p.subject.path.clone(), p.partner.path.clone()))
                .collect()
        };

        let strict = pairs(false);
        let relaxed = pairs(true);

        assert!(strict.is_subset(&relaxed));
        assert!(relaxed.contains(&("/l/docs/b.txt".to_string(), "/r/backup/c.txt".to_string())));
    }

    #[test]
    fn same_partner_set_when_timestamps_agree() {
        let left = Tree::from_entries([
            Entry::file("/l/x", 1, 500.0),
            Entry::file("/l/y", 2, 800.0),
        ]);
        let right = Tree::from_entries([
            Entry::file("/r/x", 1, 510.0),
            Entry::file("/r/y", 2, 790.0),
        ]);
        let (li, ri) = (left.index().unwrap(), right.index().unwrap());
        let count = |ignore_time: bool| {
            let cmp = MetadataComparator::new(ignore_time);
            PartnerFinder::new(&cmp)
                .fingerprinter(Fingerprinter::new(ignore_time))
                .find_files(&li, &ri, &null_sender())
                .partners
                .len()
        };

        assert_eq!(count(false), 2);
        assert_eq!(count(true), 2);
    }

    #[test]
    fn first_candidate_in_insertion_order_wins() {
        let left = Tree::from_entries([Entry::file("/l/a", 7, 0.0)]);
        let right = Tree::from_entries([
            Entry::file("/r/first", 7, 0.0),
            Entry::file("/r/second", 7, 0.0),
        ]);
        let (li, ri) = (left.index().unwrap(), right.index().unwrap());
        let cmp = MetadataComparator::default();

        let outcome = PartnerFinder::new(&cmp).find_files(&li, &ri, &null_sender());

        assert_eq!(outcome.partners.len(), 1);
        assert_eq!(outcome.partners[0].partner.name, "first");
    }

    #[test]
    fn pairs_two_default_buckets_apart_within_tolerance() {
        // 102 s apart: buckets 1 and 3 at the 100 s default width
        let left = Tree::from_entries([Entry::file("/l/a", 7, 199.0)]);
        let right = Tree::from_entries([Entry::file("/r/a", 7, 301.0)]);
        let (li, ri) = (left.index().unwrap(), right.index().unwrap());
        let count = |ignore_time: bool| {
            let cmp = MetadataComparator::new(ignore_time);
            PartnerFinder::new(&cmp)
                .fingerprinter(
                    Fingerprinter::new(ignore_time).with_tolerance(cmp.tolerance_secs()),
                )
                .find_files(&li, &ri, &null_sender())
                .partners
                .len()
        };

        assert_eq!(count(false), 1);
        assert_eq!(count(true), 1);
    }

    #[test]
    fn extreme_timestamps_still_match() {
        let left = Tree::from_entries([Entry::file("/l/a", 7, 1e300)]);
        let right = Tree::from_entries([
            Entry::file("/r/a", 7, 1e300),
            Entry::file("/r/b", 7, -1e300),
        ]);
        let (li, ri) = (left.index().unwrap(), right.index().unwrap());
        let cmp = MetadataComparator::default();

        let outcome = PartnerFinder::new(&cmp).find_files(&li, &ri, &null_sender());

        assert_eq!(outcome.partners.len(), 1);
        assert_eq!(outcome.partners[0].partner.path, "/r/a");
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let left = Tree::from_entries(
            (0..50).map(|i| Entry::file(format!("/l/f{i:02}"), i % 7, 1000.0)),
        );
        let right = Tree::from_entries(
            (0..50).map(|i| Entry::file(format!("/r/g{i:02}"), i % 5, 1000.0)),
        );
        let (li, ri) = (left.index().unwrap(), right.index().unwrap());
        let cmp = MetadataComparator::default();
        let run = |parallel: bool| -> Vec<(String, String)> {
            PartnerFinder::new(&cmp)
                .parallel(parallel)
                .find_files(&li, &ri, &null_sender())
                .partners
                .iter()
                .map(|p| (p.subject.path.clone(), p.partner.path.clone()))
                .collect()
        };

        assert_eq!(run(true), run(false));
    }

    #[test]
    fn never_pairs_a_file_with_itself() {
        let tree = Tree::from_entries([Entry::file("/same/a", 3, 0.0)]);
        let index = tree.index().unwrap();
        let cmp = MetadataComparator::default();

        let outcome = PartnerFinder::new(&cmp).find_files(&index, &index, &null_sender());

        assert!(outcome.partners.is_empty());
        assert_eq!(outcome.singles.len(), 1);
    }
}
