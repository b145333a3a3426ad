//! Exact-path include and skip sets for the scanner.

use crate::error::ScanError;
use std::collections::BTreeSet;

/// Absolute paths restricting what a scan descends into.
///
/// Unlike [`MatchPolicy`](crate::core::transform::MatchPolicy) these are
/// exact paths, not patterns, and they prune the walk itself.
#[derive(Debug, Clone, Default)]
pub struct ScanPaths {
    only: BTreeSet<String>,
    skip: BTreeSet<String>,
}

impl ScanPaths {
    /// Scan everything
    pub fn all() -> Self {
        Self::default()
    }

    /// Build the sets; a path may not be both kept and skipped
    pub fn new<O, S>(only: O, skip: S) -> Result<Self, ScanError>
    where
        O: IntoIterator,
        O::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let only: BTreeSet<String> = only.into_iter().map(|p| trim(p.into())).collect();
        let skip: BTreeSet<String> = skip.into_iter().map(|p| trim(p.into())).collect();

        let common: Vec<String> = only.intersection(&skip).cloned().collect();
        if !common.is_empty() {
            return Err(ScanError::ConflictingScanPaths { paths: common });
        }

        Ok(Self { only, skip })
    }

    pub fn is_unrestricted(&self) -> bool {
        self.only.is_empty() && self.skip.is_empty()
    }

    /// Whether the walk keeps the entry at `path`.
    ///
    /// Skipped paths are dropped with their subtree. With a non-empty
    /// `only` set, an entry is kept when it is listed, lies below a listed
    /// path, or is a directory on the way to one.
    pub fn keeps(&self, path: &str, is_dir: bool) -> bool {
        if self.skip.contains(path) {
            return false;
        }
        if self.only.is_empty() || self.only.contains(path) {
            return true;
        }

        self.only.iter().any(|only| {
            let leads_to = is_dir && is_below(only, path);
            leads_to || is_below(path, only)
        })
    }
}

/// Whether `path` lies strictly below `ancestor`
fn is_below(path: &str, ancestor: &str) -> bool {
    path.strip_prefix(ancestor)
        .is_some_and(|rest| rest.starts_with('/'))
}

fn trim(path: String) -> String {
    match path.trim_end_matches('/') {
        "" => path,
        trimmed => trimmed.to_string(),
    }
}
