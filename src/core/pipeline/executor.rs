//! Pipeline execution implementation.

use super::config::{PipelineBuilder, ReconcileConfig, SideConfig};
use super::report::{PartnerRecord, Report, SideSummary, SingleRecord};
use crate::core::comparator::MetadataComparator;
use crate::core::fingerprint::Fingerprinter;
use crate::core::partner::{MatchMode, PartnerFinder, PartnerPair};
use crate::core::persist::{load_snapshot, save_snapshot, TreeSource};
use crate::core::rollup::roll_up;
use crate::core::scanner::{ScanConfig, ScanPaths, TreeScanner, WalkDirScanner};
use crate::core::transform::{filter_tree, rewrite_root, MatchPolicy};
use crate::core::tree::{relative_path, Entry, Tree, TreeStats};
use crate::core::verify::{validate_rules, ContentVerifier, PairVerifier, Verification};
use crate::error::{ReconcileError, ScanError, TreeError};
use crate::events::{
    null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary,
};
use std::path::Path;
use std::time::Instant;

/// A tree after filtering and rewriting, with its counts
struct PreparedTree {
    tree: Tree,
    /// Common root before any rewrite
    origin_root: String,
    before: TreeStats,
    after: TreeStats,
}

/// The reconciliation pipeline
pub struct Pipeline {
    config: ReconcileConfig,
    policy: MatchPolicy,
}

impl Pipeline {
    /// Validate `config` and create a pipeline
    pub fn new(config: ReconcileConfig) -> Result<Self, ReconcileError> {
        if !(config.tolerance_secs >= 0.0) {
            return Err(ReconcileError::Config(format!(
                "time tolerance must be a non-negative number of seconds, got {}",
                config.tolerance_secs
            )));
        }
        if !(config.bucket_secs > 0.0) {
            return Err(ReconcileError::Config(format!(
                "bucket width must be positive, got {}",
                config.bucket_secs
            )));
        }
        let policy = MatchPolicy::new(&config.include, &config.exclude)?;
        validate_rules(&config.left.remap)?;
        validate_rules(&config.right.remap)?;

        Ok(Self { config, policy })
    }

    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<Report, ReconcileError> {
        self.run_with_events(&null_sender())
    }

    /// Load both sides and compare them, reporting progress on `events`
    pub fn run_with_events(&self, events: &EventSender) -> Result<Report, ReconcileError> {
        let start_time = Instant::now();
        events.send(Event::Pipeline(PipelineEvent::Started));

        let result = self.load_and_compare(start_time, events);
        if let Err(e) = &result {
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }));
        }
        result
    }

    /// Compare two trees that are already in memory
    pub fn compare_trees(
        &self,
        left: Tree,
        right: Tree,
        events: &EventSender,
    ) -> Result<Report, ReconcileError> {
        self.compare(left, right, Vec::new(), Instant::now(), events)
    }

    fn load_and_compare(
        &self,
        start_time: Instant,
        events: &EventSender,
    ) -> Result<Report, ReconcileError> {
        send_phase(events, PipelinePhase::Loading);

        let (left, mut warnings) = self.load_side("left", &self.config.left, events)?;
        let (right, right_warnings) = self.load_side("right", &self.config.right, events)?;
        warnings.extend(right_warnings);

        self.compare(left, right, warnings, start_time, events)
    }

    fn load_side(
        &self,
        name: &str,
        side: &SideConfig,
        events: &EventSender,
    ) -> Result<(Tree, Vec<String>), ReconcileError> {
        let source = side
            .source
            .as_deref()
            .ok_or_else(|| ReconcileError::Config(format!("no {name} directory or snapshot given")))?;

        let loaded = load_tree(source, &self.config.scan_config, &self.config.scan_paths, events)?;
        if let (true, Some(save_to)) = (loaded.scanned, &side.save_to) {
            save_snapshot(&loaded.tree, save_to)?;
        }

        let warnings = loaded
            .warnings
            .iter()
            .map(|warning| format!("{name}: {warning}"))
            .collect();
        Ok((loaded.tree, warnings))
    }

    fn compare(
        &self,
        left: Tree,
        right: Tree,
        warnings: Vec<String>,
        start_time: Instant,
        events: &EventSender,
    ) -> Result<Report, ReconcileError> {
        send_phase(events, PipelinePhase::Filtering);
        let left = self.prepare("left", left, &self.config.left)?;
        let right = self.prepare("right", right, &self.config.right)?;

        send_phase(events, PipelinePhase::Indexing);
        let left_index = left.tree.index()?;
        let right_index = right.tree.index()?;
        let left_root = left.tree.common_root()?;
        let right_root = right.tree.common_root()?;

        send_phase(events, PipelinePhase::Matching);
        let mode = self.config.mode;
        let comparator = MetadataComparator::new(self.config.ignore_time)
            .with_tolerance(self.config.tolerance_secs);
        let fingerprinter = Fingerprinter::new(self.config.ignore_time)
            .with_bucket_secs(self.config.bucket_secs)
            .with_tolerance(self.config.tolerance_secs);
        let outcome = PartnerFinder::new(&comparator)
            .fingerprinter(fingerprinter)
            .policy(self.policy.clone())
            .parallel(self.config.parallel)
            .progress_interval(self.config.progress_interval)
            .find(mode, &left_index, &right_index, events);
        tracing::info!(
            "{} partners found, {} subjects without partner",
            outcome.partners.len(),
            outcome.singles.len()
        );

        let verifications = self.verify(mode, &left, &right, &outcome.partners, events)?;

        send_phase(events, PipelinePhase::Reporting);
        let singles: Vec<&Entry> = match mode {
            MatchMode::Files => roll_up(&left.tree, &outcome.singles),
            MatchMode::Directories => outcome.singles.clone(),
        };

        let partners = outcome
            .partners
            .iter()
            .enumerate()
            .map(|(i, pair)| PartnerRecord {
                subject: relative_path(&left_root, &pair.subject.path).to_string(),
                partner: relative_path(&right_root, &pair.partner.path).to_string(),
                is_dir: pair.subject.is_dir,
                verification: verifications.as_ref().and_then(|v| v.get(i).copied()),
            })
            .collect::<Vec<_>>();
        let singles = singles
            .into_iter()
            .map(|entry| SingleRecord {
                path: relative_path(&left_root, &entry.path).to_string(),
                is_dir: entry.is_dir,
                size: entry.size,
            })
            .collect::<Vec<_>>();

        let duration_ms = start_time.elapsed().as_millis() as u64;
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                partners: partners.len(),
                singles: singles.len(),
                duration_ms,
            },
        }));

        Ok(Report {
            mode,
            partners,
            singles,
            left: SideSummary {
                root: left_root,
                before_filter: left.before,
                after_filter: left.after,
            },
            right: SideSummary {
                root: right_root,
                before_filter: right.before,
                after_filter: right.after,
            },
            warnings,
            duration_ms,
        })
    }

    /// Reduce sizes, filter, then rewrite one side
    fn prepare(
        &self,
        name: &str,
        mut tree: Tree,
        side: &SideConfig,
    ) -> Result<PreparedTree, ReconcileError> {
        if tree.is_empty() {
            return Err(TreeError::EmptyTree.into());
        }

        tree.reduce_sizes();
        let origin_root = tree.common_root()?;
        let before = TreeStats::from_index(&tree.index()?);

        if !self.policy.is_empty() {
            tracing::info!("Filtering {}", name);
            tree = filter_tree(&tree, &self.policy)?;
            tree.reduce_sizes();
        }
        let after = TreeStats::from_index(&tree.index()?);

        if let Some(root) = &side.rewrite_root {
            tree = rewrite_root(tree, root)?;
        }

        tracing::info!("{} root: {}", name, tree.common_root()?);
        tracing::info!("{}: {} found", name, after);

        Ok(PreparedTree {
            tree,
            origin_root,
            before,
            after,
        })
    }

    fn verify(
        &self,
        mode: MatchMode,
        left: &PreparedTree,
        right: &PreparedTree,
        partners: &[PartnerPair<'_>],
        events: &EventSender,
    ) -> Result<Option<Vec<Verification>>, ReconcileError> {
        if !self.config.verify {
            return Ok(None);
        }
        if mode == MatchMode::Directories {
            tracing::warn!("Content verification only applies to file matching, skipped");
            return Ok(None);
        }

        send_phase(events, PipelinePhase::Verifying);
        let left_verifier =
            ContentVerifier::new(self.config.left.remap.clone(), Some(left.origin_root.clone()))?;
        let right_verifier =
            ContentVerifier::new(self.config.right.remap.clone(), Some(right.origin_root.clone()))?;

        let results = PairVerifier::new(&left_verifier, &right_verifier)
            .parallel(self.config.parallel)
            .progress_interval(self.config.progress_interval)
            .verify(partners, events);
        Ok(Some(results))
    }
}

fn send_phase(events: &EventSender, phase: PipelinePhase) {
    tracing::debug!("Phase: {}", phase);
    events.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
}

/// A tree read from a directory or a snapshot
#[derive(Debug)]
pub struct LoadedTree {
    pub tree: Tree,
    /// Non-fatal scan problems
    pub warnings: Vec<ScanError>,
    /// Whether the tree came from a fresh scan
    pub scanned: bool,
}

/// Scan `source` if it is a directory, load it if it is a snapshot
pub fn load_tree(
    source: &Path,
    scan_config: &ScanConfig,
    scan_paths: &ScanPaths,
    events: &EventSender,
) -> Result<LoadedTree, ReconcileError> {
    match TreeSource::detect(source)? {
        TreeSource::Directory(path) => {
            let outcome =
                WalkDirScanner::new(scan_config.clone()).scan_with_events(&path, scan_paths, events)?;
            Ok(LoadedTree {
                tree: outcome.tree,
                warnings: outcome.warnings,
                scanned: true,
            })
        }
        TreeSource::Snapshot(path) => Ok(LoadedTree {
            tree: load_snapshot(&path)?,
            warnings: Vec::new(),
            scanned: false,
        }),
    }
}
