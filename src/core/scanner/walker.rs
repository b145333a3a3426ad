//! Directory walking implementation using walkdir.

use super::{path_string, ScanOutcome, ScanPaths, TreeScanner};
use crate::core::tree::{Entry, Tree};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ProgressTicker, ScanEvent, DEFAULT_PROGRESS_INTERVAL};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Maximum directory depth below the root (None = unlimited)
    pub max_depth: Option<usize>,
    /// Minimum time between progress events
    pub progress_interval: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
            max_depth: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }
}

impl Default for WalkDirScanner {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

impl TreeScanner for WalkDirScanner {
    fn scan(&self, root: &Path, paths: &ScanPaths) -> Result<ScanOutcome, ScanError> {
        self.scan_with_events(root, paths, &crate::events::null_sender())
    }

    fn scan_with_events(
        &self,
        root: &Path,
        paths: &ScanPaths,
        events: &EventSender,
    ) -> Result<ScanOutcome, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }
        let root = std::path::absolute(root).map_err(|source| ScanError::ReadDirectory {
            path: root.to_path_buf(),
            source,
        })?;

        events.send(Event::Scan(ScanEvent::Started { root: root.clone() }));
        tracing::info!("Scanning {}", root.display());

        let mut walker = WalkDir::new(&root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let ticker = ProgressTicker::new(self.config.progress_interval);
        let mut builder = TreeBuilder::default();
        let mut warnings = Vec::new();

        let walk = walker.into_iter().filter_entry(|entry| {
            entry.depth() == 0 || paths.keeps(&path_string(entry.path()), entry.file_type().is_dir())
        });

        for result in walk {
            match result {
                Ok(entry) if entry.depth() == 0 => continue,
                Ok(entry) => {
                    let path = path_string(entry.path());
                    let node = match entry.metadata() {
                        Ok(metadata) => entry_from_metadata(path, &metadata),
                        Err(e) => {
                            let warning = ScanError::ReadMetadata {
                                path: entry.path().to_path_buf(),
                                source: e.into(),
                            };
                            record(&mut warnings, events, warning);
                            Entry::file(path, 0, 0.0)
                        }
                    };
                    builder.push(entry.depth(), node);
                }
                Err(e) if e.depth() == 0 => {
                    return Err(root_error(&root, e));
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    let is_open_dir = builder.is_open(&path_string(&path));

                    if e.loop_ancestor().is_none() && !is_open_dir {
                        // Metadata could not be read, e.g. a dangling link
                        builder.push(e.depth(), Entry::file(path_string(&path), 0, 0.0));
                    }
                    record(&mut warnings, events, walk_error(path, e));
                }
            }

            if let Some(count) = ticker.tick() {
                tracing::info!("{}...", count);
                events.send(Event::Scan(ScanEvent::Progress {
                    entries_scanned: count,
                }));
            }
        }

        let entries_scanned = ticker.count();
        events.send(Event::Scan(ScanEvent::Completed { entries_scanned }));
        tracing::info!(
            "Scanned {} entries with {} warnings",
            entries_scanned,
            warnings.len()
        );

        Ok(ScanOutcome {
            tree: builder.finish(),
            warnings,
            entries_scanned,
        })
    }
}

fn entry_from_metadata(path: String, metadata: &Metadata) -> Entry {
    if metadata.is_dir() {
        return Entry::dir(path, []);
    }

    let modified = metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|since| since.as_secs_f64())
        .unwrap_or(0.0);
    Entry::file(path, metadata.len(), modified)
}

fn record(warnings: &mut Vec<ScanError>, events: &EventSender, warning: ScanError) {
    tracing::warn!("{}", warning);
    if let ScanError::ReadDirectory { path, .. }
    | ScanError::ReadMetadata { path, .. }
    | ScanError::PermissionDenied { path } = &warning
    {
        events.send(Event::Scan(ScanEvent::Warning {
            path: path.clone(),
            message: warning.to_string(),
        }));
    }
    warnings.push(warning);
}

fn walk_error(path: PathBuf, e: walkdir::Error) -> ScanError {
    if e.io_error().map(|e| e.kind()) == Some(std::io::ErrorKind::PermissionDenied) {
        ScanError::PermissionDenied { path }
    } else {
        ScanError::ReadDirectory {
            path,
            source: std::io::Error::other(e.to_string()),
        }
    }
}

fn root_error(root: &Path, e: walkdir::Error) -> ScanError {
    walk_error(root.to_path_buf(), e)
}

/// Assembles a tree from a pre-order walk
#[derive(Default)]
struct TreeBuilder {
    tree: Tree,
    /// Directories whose subtree is still being walked, outermost first
    open: Vec<Entry>,
}

impl TreeBuilder {
    /// Add an entry found at `depth` (1 = directly under the root)
    fn push(&mut self, depth: usize, entry: Entry) {
        self.close_to(depth.saturating_sub(1));
        if entry.is_dir {
            self.open.push(entry);
        } else {
            self.attach(entry);
        }
    }

    /// Whether `path` is the innermost directory still being walked
    fn is_open(&self, path: &str) -> bool {
        self.open.last().is_some_and(|dir| dir.path == path)
    }

    fn close_to(&mut self, depth: usize) {
        while self.open.len() > depth {
            if let Some(dir) = self.open.pop() {
                self.attach(dir);
            }
        }
    }

    fn attach(&mut self, entry: Entry) {
        match self.open.last_mut() {
            Some(parent) => {
                parent.children.insert(entry.name.clone(), entry);
            }
            None => self.tree.insert(entry),
        }
    }

    fn finish(mut self) -> Tree {
        self.close_to(0);
        self.tree
    }
}
