//! Owned result of a reconciliation run.

use crate::core::partner::MatchMode;
use crate::core::tree::TreeStats;
use crate::core::verify::Verification;
use serde::{Deserialize, Serialize};

/// A subject and its partner, as paths relative to their tree roots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerRecord {
    pub subject: String,
    pub partner: String,
    pub is_dir: bool,
    /// Content check result when verification ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<Verification>,
}

/// A reported unmatched item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleRecord {
    /// Path relative to the left root
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
}

impl SingleRecord {
    /// Relative path, with a trailing `/` for directories
    pub fn display_path(&self) -> String {
        if self.is_dir {
            format!("{}/", self.path)
        } else {
            self.path.clone()
        }
    }
}

/// Root and counts of one side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideSummary {
    /// Common root after any rewrite
    pub root: String,
    pub before_filter: TreeStats,
    pub after_filter: TreeStats,
}

/// Which parts of a report to show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFilter {
    #[default]
    All,
    PartnersOnly,
    SinglesOnly,
}

impl ReportFilter {
    pub fn shows_partners(self) -> bool {
        self != ReportFilter::SinglesOnly
    }

    pub fn shows_singles(self) -> bool {
        self != ReportFilter::PartnersOnly
    }
}

/// Result of a reconciliation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub mode: MatchMode,
    /// Accepted pairs in subject order
    pub partners: Vec<PartnerRecord>,
    /// Unmatched items, rolled up in file mode
    pub singles: Vec<SingleRecord>,
    pub left: SideSummary,
    pub right: SideSummary,
    /// Non-fatal problems met while loading the trees
    pub warnings: Vec<String>,
    pub duration_ms: u64,
}

impl Report {
    /// Copy of this report with the hidden sections emptied
    pub fn filtered(&self, filter: ReportFilter) -> Report {
        let mut report = self.clone();
        if !filter.shows_partners() {
            report.partners.clear();
        }
        if !filter.shows_singles() {
            report.singles.clear();
        }
        report
    }

    /// One line per reported path: partners as `subject -> partner`
    pub fn minimal_lines(&self, filter: ReportFilter) -> Vec<String> {
        let mut lines = Vec::new();
        if filter.shows_partners() {
            lines.extend(
                self.partners
                    .iter()
                    .map(|p| format!("{} -> {}", p.subject, p.partner)),
            );
        }
        if filter.shows_singles() {
            lines.extend(self.singles.iter().map(SingleRecord::display_path));
        }
        lines
    }

    /// Pair counts by verification result: (confirmed, refuted, unknown)
    pub fn verification_counts(&self) -> (usize, usize, usize) {
        self.partners
            .iter()
            .fold((0, 0, 0), |(c, r, u), p| match p.verification {
                Some(Verification::Confirmed) => (c + 1, r, u),
                Some(Verification::Refuted) => (c, r + 1, u),
                Some(Verification::Unknown) => (c, r, u + 1),
                None => (c, r, u),
            })
    }
}
