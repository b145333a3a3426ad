//! Pipeline configuration and its builder.

use super::Pipeline;
use crate::core::comparator::DEFAULT_TOLERANCE_SECS;
use crate::core::fingerprint::DEFAULT_BUCKET_SECS;
use crate::core::partner::MatchMode;
use crate::core::scanner::{ScanConfig, ScanPaths};
use crate::core::verify::RemapRule;
use crate::error::ReconcileError;
use crate::events::DEFAULT_PROGRESS_INTERVAL;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for one side of a comparison
#[derive(Debug, Clone, Default)]
pub struct SideConfig {
    /// Directory to scan or snapshot to load
    pub source: Option<PathBuf>,
    /// Where to save the snapshot when `source` is scanned
    pub save_to: Option<PathBuf>,
    /// Virtual root replacing the tree's common root before matching
    pub rewrite_root: Option<String>,
    /// Rules locating files on disk for content verification
    pub remap: Vec<RemapRule>,
}

/// Configuration for a reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// The tree whose entries look for partners
    pub left: SideConfig,
    /// The tree partners are searched in
    pub right: SideConfig,
    pub mode: MatchMode,
    /// Compare sizes only
    pub ignore_time: bool,
    /// Accepted modification-time difference in seconds
    pub tolerance_secs: f64,
    /// Width of one fingerprint time bucket in seconds
    pub bucket_secs: f64,
    /// Regex patterns an entry must match (any)
    pub include: Vec<String>,
    /// Regex patterns that drop an entry
    pub exclude: Vec<String>,
    /// Exact paths restricting directory scans on both sides
    pub scan_paths: ScanPaths,
    /// Hash matched files after file matching
    pub verify: bool,
    /// Match and verify on the rayon pool
    pub parallel: bool,
    pub scan_config: ScanConfig,
    /// Minimum time between progress events
    pub progress_interval: Duration,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            left: SideConfig::default(),
            right: SideConfig::default(),
            mode: MatchMode::Files,
            ignore_time: false,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
            bucket_secs: DEFAULT_BUCKET_SECS,
            include: Vec::new(),
            exclude: Vec::new(),
            scan_paths: ScanPaths::all(),
            verify: false,
            parallel: true,
            scan_config: ScanConfig::default(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: ReconcileConfig,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: ReconcileConfig::default(),
        }
    }

    /// Directory or snapshot for the left side
    pub fn left(mut self, source: impl Into<PathBuf>) -> Self {
        self.config.left.source = Some(source.into());
        self
    }

    /// Directory or snapshot for the right side
    pub fn right(mut self, source: impl Into<PathBuf>) -> Self {
        self.config.right.source = Some(source.into());
        self
    }

    pub fn mode(mut self, mode: MatchMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn ignore_time(mut self, ignore: bool) -> Self {
        self.config.ignore_time = ignore;
        self
    }

    pub fn tolerance_secs(mut self, secs: f64) -> Self {
        self.config.tolerance_secs = secs;
        self
    }

    pub fn bucket_secs(mut self, secs: f64) -> Self {
        self.config.bucket_secs = secs;
        self
    }

    pub fn include(mut self, patterns: Vec<String>) -> Self {
        self.config.include = patterns;
        self
    }

    pub fn exclude(mut self, patterns: Vec<String>) -> Self {
        self.config.exclude = patterns;
        self
    }

    pub fn scan_paths(mut self, paths: ScanPaths) -> Self {
        self.config.scan_paths = paths;
        self
    }

    pub fn save_left(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.left.save_to = Some(path.into());
        self
    }

    pub fn save_right(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.right.save_to = Some(path.into());
        self
    }

    pub fn rewrite_left(mut self, root: impl Into<String>) -> Self {
        self.config.left.rewrite_root = Some(root.into());
        self
    }

    pub fn rewrite_right(mut self, root: impl Into<String>) -> Self {
        self.config.right.rewrite_root = Some(root.into());
        self
    }

    pub fn remap_left(mut self, rules: Vec<RemapRule>) -> Self {
        self.config.left.remap = rules;
        self
    }

    pub fn remap_right(mut self, rules: Vec<RemapRule>) -> Self {
        self.config.right.remap = rules;
        self
    }

    pub fn verify(mut self, verify: bool) -> Self {
        self.config.verify = verify;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.config.progress_interval = interval;
        self.config.scan_config.progress_interval = interval;
        self
    }

    /// Validate the configuration and build the pipeline
    pub fn build(self) -> Result<Pipeline, ReconcileError> {
        Pipeline::new(self.config)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
