//! # Rollup Module
//!
//! Reports unmatched items at the coarsest granularity: a subtree in
//! which every file is a single is reported once instead of file by file.
//!
//! ## Algorithm
//! 1. Files start as [`Tag::AllFalse`], directories as [`Tag::None`]
//! 2. Every single becomes [`Tag::AllTrue`]
//! 3. Post-order, a directory folds its children: the first child's tag is
//!    adopted, any later child with a different tag turns it into
//!    [`Tag::Conflict`]
//! 4. Top-down, an `AllTrue` entry is reported whole; any other directory
//!    is descended into
//!
//! Tags live in a map owned by [`Rollup`], never on the entries.

use crate::core::tree::{Children, Entry, Tree};
use std::collections::{HashMap, HashSet};

/// Summary of a subtree's single status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Nothing to summarize (empty directory)
    None,
    /// Every file below is a single
    AllTrue,
    /// No file below is a single
    AllFalse,
    /// Mixed
    Conflict,
}

/// Tags computed for one tree
#[derive(Debug)]
pub struct Rollup<'a> {
    tags: HashMap<&'a str, Tag>,
}

impl<'a> Rollup<'a> {
    /// Tag every entry of `tree` given the singles found by matching
    pub fn compute(tree: &'a Tree, singles: &[&Entry]) -> Self {
        let singles: HashSet<&str> = singles.iter().map(|e| e.path.as_str()).collect();
        let mut tags = HashMap::new();
        fold(tree.entries(), &singles, &mut tags);
        Self { tags }
    }

    pub fn tag_of(&self, path: &str) -> Option<Tag> {
        self.tags.get(path).copied()
    }

    /// The minimal disjoint set of fully unmatched entries, in tree order
    pub fn items(&self, tree: &'a Tree) -> Vec<&'a Entry> {
        let mut items = Vec::new();
        self.collect(tree.entries(), &mut items);
        items
    }

    fn collect(&self, children: &'a Children, items: &mut Vec<&'a Entry>) {
        for entry in children.values() {
            if self.tag_of(&entry.path) == Some(Tag::AllTrue) {
                items.push(entry);
            } else if entry.is_dir {
                self.collect(&entry.children, items);
            }
        }
    }
}

fn fold<'a>(
    children: &'a Children,
    singles: &HashSet<&str>,
    tags: &mut HashMap<&'a str, Tag>,
) -> Tag {
    let mut running = Tag::None;
    for entry in children.values() {
        let tag = if entry.is_dir {
            fold(&entry.children, singles, tags)
        } else if singles.contains(entry.path.as_str()) {
            Tag::AllTrue
        } else {
            Tag::AllFalse
        };
        tags.insert(entry.path.as_str(), tag);

        if running == Tag::None {
            running = tag;
        } else if running != tag {
            running = Tag::Conflict;
        }
    }
    running
}

/// Roll `singles` up into report items for `tree`
pub fn roll_up<'a>(tree: &'a Tree, singles: &[&Entry]) -> Vec<&'a Entry> {
    Rollup::compute(tree, singles).items(tree)
}
