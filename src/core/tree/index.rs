//! Flat path index over a tree.

use super::{Children, Entry, Tree};
use crate::error::TreeError;
use hashlink::LinkedHashMap;

/// Read-only mapping from absolute path to entry, in pre-order.
///
/// Borrows the tree it was built from, so it cannot outlive a filter or
/// rewrite of that tree; rebuild it afterwards.
#[derive(Debug)]
pub struct Index<'a> {
    entries: LinkedHashMap<&'a str, &'a Entry>,
}

impl<'a> Index<'a> {
    /// Flatten `tree` recursively.
    ///
    /// Fails if any path is reachable twice, which a well-formed scan never
    /// produces but a hand-edited snapshot can.
    pub fn build(tree: &'a Tree) -> Result<Self, TreeError> {
        let mut entries = LinkedHashMap::new();
        visit(tree.entries(), &mut entries)?;
        Ok(Self { entries })
    }

    pub fn get(&self, path: &str) -> Option<&'a Entry> {
        self.entries.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in pre-order
    pub fn iter(&self) -> impl Iterator<Item = &'a Entry> + '_ {
        self.entries.values().copied()
    }

    pub fn files(&self) -> impl Iterator<Item = &'a Entry> + '_ {
        self.iter().filter(|entry| !entry.is_dir)
    }

    pub fn directories(&self) -> impl Iterator<Item = &'a Entry> + '_ {
        self.iter().filter(|entry| entry.is_dir)
    }
}

fn visit<'a>(
    children: &'a Children,
    entries: &mut LinkedHashMap<&'a str, &'a Entry>,
) -> Result<(), TreeError> {
    for entry in children.values() {
        if entries.insert(entry.path.as_str(), entry).is_some() {
            return Err(TreeError::MalformedTree {
                path: entry.path.clone(),
            });
        }
        visit(&entry.children, entries)?;
    }
    Ok(())
}
