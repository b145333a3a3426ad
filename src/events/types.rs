//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the reconciliation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
    /// Matching phase events
    Match(MatchEvent),
    /// Content verification events
    Verify(VerifyEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { root: PathBuf },
    /// Periodic progress update
    Progress { entries_scanned: usize },
    /// An entry could not be read but scanning continues
    Warning { path: PathBuf, message: String },
    /// Scanning completed
    Completed { entries_scanned: usize },
}

/// Events during partner matching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MatchEvent {
    /// Matching has started
    Started { total_subjects: usize },
    /// Periodic progress update
    Progress(MatchProgress),
    /// Matching completed
    Completed { partners: usize, singles: usize },
}

/// Progress information during matching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchProgress {
    /// Number of subjects processed so far
    pub completed: usize,
    /// Total number of subjects
    pub total: usize,
}

/// Events during content verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VerifyEvent {
    /// Verification has started
    Started { total_pairs: usize },
    /// Periodic progress update
    Progress { completed: usize, total: usize },
    /// A file could not be read; its digest is unknown
    Unreadable { path: PathBuf, message: String },
    /// Verification completed
    Completed { confirmed: usize, refuted: usize, unknown: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Loading,
    Filtering,
    Indexing,
    Matching,
    Verifying,
    Reporting,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Number of partner pairs found
    pub partners: usize,
    /// Number of reported single items (after rollup)
    pub singles: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Loading => write!(f, "Loading"),
            PipelinePhase::Filtering => write!(f, "Filtering"),
            PipelinePhase::Indexing => write!(f, "Indexing"),
            PipelinePhase::Matching => write!(f, "Matching"),
            PipelinePhase::Verifying => write!(f, "Verifying"),
            PipelinePhase::Reporting => write!(f, "Reporting"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Match(MatchEvent::Progress(MatchProgress {
            completed: 10,
            total: 50,
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Match(MatchEvent::Progress(p)) => {
                assert_eq!(p.completed, 10);
                assert_eq!(p.total, 50);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn phase_display_is_human_readable() {
        assert_eq!(PipelinePhase::Matching.to_string(), "Matching");
    }
}
