//! # Tree Module
//!
//! In-memory model of one scanned hierarchy.
//!
//! A scan is not single-rooted: it yields every entry found directly
//! under the scanned directory, keyed by name. All top-level entries share
//! one parent directory, the tree's *common root*.
//!
//! ## Invariants
//! - A directory's `size` is the sum of its children's sizes once
//!   [`Tree::reduce_sizes`] has run; file sizes are never modified.
//! - `path` is the common root plus the name chain down to the entry.
//! - Child names are unique per directory.

mod index;
mod stats;

pub use index::Index;
pub use stats::{format_bytes, TreeStats};

use crate::error::TreeError;
use hashlink::LinkedHashMap;
use serde::{Deserialize, Serialize};

/// Children of a directory, in scan order
pub type Children = LinkedHashMap<String, Entry>;

/// One filesystem object of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Final path component
    pub name: String,
    /// Absolute path, possibly rewritten to a virtual root
    pub path: String,
    /// Whether this entry is a directory
    pub is_dir: bool,
    /// Modification time in seconds since the epoch (ignored for directories)
    #[serde(alias = "modifiedTime")]
    pub modified: f64,
    /// Byte length for files, reduced subtree size for directories
    pub size: u64,
    /// Child entries keyed by name
    #[serde(default)]
    pub children: Children,
    /// Path on disk before a root rewrite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_path: Option<String>,
}

impl Entry {
    /// Create a file entry; the name is the last component of `path`
    pub fn file(path: impl Into<String>, size: u64, modified: f64) -> Self {
        let path = path.into();
        Self {
            name: last_component(&path).to_string(),
            path,
            is_dir: false,
            modified,
            size,
            children: Children::new(),
            origin_path: None,
        }
    }

    /// Create a directory entry holding `children`
    pub fn dir(path: impl Into<String>, children: impl IntoIterator<Item = Entry>) -> Self {
        let path = path.into();
        Self {
            name: last_component(&path).to_string(),
            path,
            is_dir: true,
            modified: 0.0,
            size: 0,
            children: children
                .into_iter()
                .map(|child| (child.name.clone(), child))
                .collect(),
            origin_path: None,
        }
    }

    /// Whether this is a directory with at least one child
    pub fn is_non_empty_dir(&self) -> bool {
        self.is_dir && !self.children.is_empty()
    }

    /// Path of the file on disk, ignoring any root rewrite
    pub fn origin(&self) -> &str {
        self.origin_path.as_deref().unwrap_or(&self.path)
    }
}

/// A scanned hierarchy: top-level entries keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    entries: Children,
}

impl Tree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from top-level entries
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.name.clone(), entry))
                .collect(),
        }
    }

    /// Add a top-level entry, replacing one with the same name
    pub fn insert(&mut self, entry: Entry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn entries(&self) -> &Children {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut Children {
        &mut self.entries
    }

    pub fn into_entries(self) -> Children {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The directory every top-level entry lives in, without a trailing `/`.
    ///
    /// Derived from the first entry as `path` minus `name`; every other
    /// top-level entry must agree.
    pub fn common_root(&self) -> Result<String, TreeError> {
        let mut entries = self.entries.values();
        let first = entries.next().ok_or(TreeError::EmptyTree)?;
        let root = parent_of(first)?;

        for entry in entries {
            let other = parent_of(entry)?;
            if other != root {
                return Err(TreeError::InconsistentRoot {
                    first: root.to_string(),
                    other: other.to_string(),
                });
            }
        }

        Ok(root.to_string())
    }

    /// Recompute every directory size bottom-up and return the total.
    ///
    /// Directory sizes are overwritten unconditionally, so running this
    /// again without mutation changes nothing.
    pub fn reduce_sizes(&mut self) -> u64 {
        reduce_children(&mut self.entries)
    }

    /// Build the flat path index of this tree
    pub fn index(&self) -> Result<Index<'_>, TreeError> {
        Index::build(self)
    }
}

fn reduce_children(children: &mut Children) -> u64 {
    let mut total = 0;
    for entry in children.values_mut() {
        if entry.is_dir {
            entry.size = reduce_children(&mut entry.children);
        }
        total += entry.size;
    }
    total
}

fn parent_of(entry: &Entry) -> Result<&str, TreeError> {
    entry
        .path
        .strip_suffix(entry.name.as_str())
        .map(|parent| parent.strip_suffix('/').unwrap_or(parent))
        .ok_or_else(|| TreeError::NameMismatch {
            path: entry.path.clone(),
            name: entry.name.clone(),
        })
}

fn last_component(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Path of `path` relative to `root`, without a leading separator
pub fn relative_path<'p>(root: &str, path: &'p str) -> &'p str {
    path.strip_prefix(root)
        .map(|rest| rest.trim_start_matches('/'))
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Tree {
        Tree::from_entries([
            Entry::dir(
                "/data/docs",
                [
                    Entry::file("/data/docs/a.txt", 100, 1000.0),
                    Entry::dir(
                        "/data/docs/nested",
                        [Entry::file("/data/docs/nested/b.txt", 50, 2000.0)],
                    ),
                    Entry::dir("/data/docs/empty", []),
                ],
            ),
            Entry::file("/data/readme", 7, 10.0),
        ])
    }

    #[test]
    fn entry_name_is_last_component() {
        let entry = Entry::file("/data/docs/a.txt", 1, 0.0);
        assert_eq!(entry.name, "a.txt");
    }

    #[test]
    fn common_root_strips_name_and_separator() {
        assert_eq!(sample_tree().common_root().unwrap(), "/data");
    }

    #[test]
    fn common_root_of_filesystem_root_is_empty() {
        let tree = Tree::from_entries([Entry::file("/a", 1, 0.0)]);
        assert_eq!(tree.common_root().unwrap(), "");
    }

    #[test]
    fn common_root_rejects_disagreeing_entries() {
        let tree = Tree::from_entries([
            Entry::file("/data/a", 1, 0.0),
            Entry::file("/other/b", 1, 0.0),
        ]);
        assert!(matches!(
            tree.common_root(),
            Err(TreeError::InconsistentRoot { .. })
        ));
    }

    #[test]
    fn common_root_of_empty_tree_fails() {
        assert!(matches!(Tree::new().common_root(), Err(TreeError::EmptyTree)));
    }

    #[test]
    fn reduce_sizes_sums_descendants() {
        let mut tree = sample_tree();
        let total = tree.reduce_sizes();

        assert_eq!(total, 157);
        let docs = &tree.entries()["docs"];
        assert_eq!(docs.size, 150);
        assert_eq!(docs.children["nested"].size, 50);
        assert_eq!(docs.children["empty"].size, 0);
    }

    #[test]
    fn reduce_sizes_is_idempotent() {
        let mut tree = sample_tree();
        tree.reduce_sizes();
        let once = tree.clone();
        tree.reduce_sizes();
        assert_eq!(tree, once);
    }

    #[test]
    fn reduce_sizes_overwrites_stale_directory_sizes() {
        let mut tree = sample_tree();
        tree.entries_mut().get_mut("docs").unwrap().size = 999_999;
        tree.reduce_sizes();
        assert_eq!(tree.entries()["docs"].size, 150);
    }

    #[test]
    fn relative_path_strips_root() {
        assert_eq!(relative_path("/data", "/data/docs/a.txt"), "docs/a.txt");
        assert_eq!(relative_path("", "/a"), "a");
    }

    #[test]
    fn origin_falls_back_to_path() {
        let mut entry = Entry::file("/virtual/a", 1, 0.0);
        assert_eq!(entry.origin(), "/virtual/a");
        entry.origin_path = Some("/real/a".to_string());
        assert_eq!(entry.origin(), "/real/a");
    }
}
