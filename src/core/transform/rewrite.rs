//! Relocating a tree under a virtual root.

use crate::core::tree::{Children, Tree};
use crate::error::TreeError;

/// Replace the common root of every path in `tree` with `new_root`.
///
/// Every descendant is rewritten, not only the top-level entries. The
/// path an entry had on disk is kept in `origin_path` so content can
/// still be read after the rewrite; rewriting twice keeps the first
/// origin.
pub fn rewrite_root(mut tree: Tree, new_root: &str) -> Result<Tree, TreeError> {
    let old_root = tree.common_root()?;
    let new_root = normalize_root(new_root);

    tracing::debug!(from = %old_root, to = %new_root, "rewriting tree root");
    rewrite_children(tree.entries_mut(), &old_root, new_root);
    Ok(tree)
}

fn rewrite_children(children: &mut Children, old_root: &str, new_root: &str) {
    for entry in children.values_mut() {
        match entry.path.strip_prefix(old_root) {
            Some(rest) => {
                let rewritten = format!("{}{}", new_root, rest);
                let original = std::mem::replace(&mut entry.path, rewritten);
                entry.origin_path.get_or_insert(original);
            }
            None => tracing::warn!(path = %entry.path, root = %old_root, "entry outside common root left unchanged"),
        }
        rewrite_children(&mut entry.children, old_root, new_root);
    }
}

/// Strip trailing separators so `/backup/` and `/backup` are equal
fn normalize_root(root: &str) -> &str {
    root.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::Entry;

    fn sample_tree() -> Tree {
        Tree::from_entries([
            Entry::dir(
                "/mnt/old/docs",
                [Entry::dir(
                    "/mnt/old/docs/deep",
                    [Entry::file("/mnt/old/docs/deep/a.txt", 1, 0.0)],
                )],
            ),
            Entry::file("/mnt/old/b.txt", 2, 0.0),
        ])
    }

    #[test]
    fn rewrites_every_descendant() {
        let tree = rewrite_root(sample_tree(), "/virtual").unwrap();
        let index = tree.index().unwrap();

        let paths: Vec<_> = index.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/virtual/docs",
                "/virtual/docs/deep",
                "/virtual/docs/deep/a.txt",
                "/virtual/b.txt"
            ]
        );
        assert_eq!(tree.common_root().unwrap(), "/virtual");
    }

    #[test]
    fn keeps_origin_paths() {
        let tree = rewrite_root(sample_tree(), "/virtual/").unwrap();
        let index = tree.index().unwrap();

        let file = index.get("/virtual/docs/deep/a.txt").unwrap();
        assert_eq!(file.origin(), "/mnt/old/docs/deep/a.txt");
    }

    #[test]
    fn second_rewrite_keeps_first_origin() {
        let once = rewrite_root(sample_tree(), "/v1").unwrap();
        let twice = rewrite_root(once, "/v2").unwrap();
        let index = twice.index().unwrap();

        assert_eq!(index.get("/v2/b.txt").unwrap().origin(), "/mnt/old/b.txt");
    }

    #[test]
    fn empty_tree_cannot_be_rewritten() {
        assert!(matches!(
            rewrite_root(Tree::new(), "/v"),
            Err(TreeError::EmptyTree)
        ));
    }
}
