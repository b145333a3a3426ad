//! Structure-preserving pruning of a tree.

use super::MatchPolicy;
use crate::core::tree::{Children, Entry, Tree};
use crate::error::FilterError;

/// Return a copy of `tree` holding only entries the policy keeps.
///
/// An excluded entry is dropped together with its subtree. Any other
/// entry survives if it is included itself or if at least one descendant
/// survives, so the directories leading to an included file are kept.
/// Directory sizes are stale afterwards; run `reduce_sizes` again.
pub fn filter_tree(tree: &Tree, policy: &MatchPolicy) -> Result<Tree, FilterError> {
    let entries = filter_children(tree.entries(), policy);
    if entries.is_empty() {
        return Err(FilterError::EmptyResult);
    }
    Ok(Tree::from_entries(entries.into_iter().map(|(_, entry)| entry)))
}

fn filter_children(children: &Children, policy: &MatchPolicy) -> Children {
    let mut kept = Children::new();
    for (name, entry) in children {
        if policy.excludes(&entry.path) {
            continue;
        }

        let included = policy.includes(&entry.path);
        let surviving = filter_children(&entry.children, policy);
        if !included && surviving.is_empty() {
            continue;
        }

        kept.insert(
            name.clone(),
            Entry {
                children: surviving,
                ..shallow_copy(entry)
            },
        );
    }
    kept
}

fn shallow_copy(entry: &Entry) -> Entry {
    Entry {
        name: entry.name.clone(),
        path: entry.path.clone(),
        is_dir: entry.is_dir,
        modified: entry.modified,
        size: entry.size,
        children: Children::new(),
        origin_path: entry.origin_path.clone(),
    }
}
