//! # Search Module
//!
//! Regex search over the paths of an indexed tree.
//!
//! Each hit remembers the byte spans of the capture groups that took part
//! in the match, or of the whole match when the pattern has no groups, so
//! a front end can highlight them.

use crate::core::tree::Index;
use crate::events::{ProgressTicker, DEFAULT_PROGRESS_INTERVAL};
use regex::Regex;
use serde::Serialize;

/// One matching entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub path: String,
    pub is_dir: bool,
    /// File size, or reduced subtree size for directories
    pub size: u64,
    /// Byte ranges of the path to highlight
    pub spans: Vec<(usize, usize)>,
}

/// A piece of a hit's path and whether it matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'h> {
    pub text: &'h str,
    pub highlighted: bool,
}

impl SearchHit {
    /// Whether the pattern matched the whole path
    pub fn matches_whole_path(&self) -> bool {
        self.spans.first() == Some(&(0, self.path.len()))
    }

    /// Split the path for display, hiding the first `root_len` bytes
    /// unless a highlighted span starts inside them
    pub fn segments(&self, root_len: usize) -> Vec<Segment<'_>> {
        let mut segments = Vec::new();
        let mut cursor = root_len.min(self.path.len());

        if !self.matches_whole_path() {
            if self.spans.first().is_some_and(|(start, _)| *start < cursor) {
                cursor = 0;
            }
            for &(start, end) in &self.spans {
                if cursor < start {
                    segments.push(Segment {
                        text: &self.path[cursor..start],
                        highlighted: false,
                    });
                }
                segments.push(Segment {
                    text: &self.path[start..end],
                    highlighted: true,
                });
                cursor = end;
            }
        }

        if cursor < self.path.len() {
            segments.push(Segment {
                text: &self.path[cursor..],
                highlighted: false,
            });
        }
        segments
    }
}

/// All hits of one search with their totals
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchReport {
    /// Hits sorted case-insensitively by path
    pub hits: Vec<SearchHit>,
    pub files: usize,
    pub directories: usize,
    /// Size of all hits, counting entries inside a matched directory once
    pub total_size: u64,
    /// Size of matched files only
    pub files_size: u64,
}

/// Find every entry of `index` whose path matches `pattern`
pub fn search(index: &Index<'_>, pattern: &Regex) -> SearchReport {
    let total = index.len();
    let ticker = ProgressTicker::new(DEFAULT_PROGRESS_INTERVAL);
    let mut hits = Vec::new();

    for entry in index.iter() {
        if let Some(captures) = pattern.captures(&entry.path) {
            let mut spans: Vec<(usize, usize)> = captures
                .iter()
                .skip(1)
                .flatten()
                .map(|m| (m.start(), m.end()))
                .collect();
            if spans.is_empty() {
                if let Some(whole) = captures.get(0) {
                    spans.push((whole.start(), whole.end()));
                }
            }

            hits.push(SearchHit {
                path: entry.path.clone(),
                is_dir: entry.is_dir,
                size: entry.size,
                spans,
            });
        }

        if let Some(count) = ticker.tick() {
            tracing::info!("{}/{}...", count, total);
        }
    }

    hits.sort_by_cached_key(|hit| hit.path.to_lowercase());
    summarize(hits)
}

fn summarize(hits: Vec<SearchHit>) -> SearchReport {
    let matched_dirs: Vec<String> = hits
        .iter()
        .filter(|hit| hit.is_dir)
        .map(|hit| format!("{}/", hit.path))
        .collect();

    let mut report = SearchReport::default();
    for hit in &hits {
        if hit.is_dir {
            report.directories += 1;
        } else {
            report.files += 1;
            report.files_size += hit.size;
        }

        let inside_matched_dir = matched_dirs.iter().any(|dir| hit.path.starts_with(dir.as_str()));
        if !inside_matched_dir {
            report.total_size += hit.size;
        }
    }

    tracing::debug!(hits = hits.len(), "search finished");
    report.hits = hits;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::{Entry, Tree};

    fn tree() -> Tree {
        let mut tree = Tree::from_entries([
            Entry::dir(
                "/r/Photos",
                [
                    Entry::file("/r/Photos/a.jpg", 10, 0.0),
                    Entry::file("/r/Photos/b.png", 20, 0.0),
                ],
            ),
            Entry::file("/r/c.jpg", 5, 0.0),
            Entry::file("/r/notes.txt", 1, 0.0),
        ]);
        tree.reduce_sizes();
        tree
    }

    #[test]
    fn finds_and_sorts_case_insensitively() {
        let tree = tree();
        let index = tree.index().unwrap();

        let report = search(&index, &Regex::new(r"\.jpg$").unwrap());

        let paths: Vec<_> = report.hits.iter().map(|h| h.path.as_str()).collect();
        assert_eq!(paths, vec!["/r/c.jpg", "/r/Photos/a.jpg"]);
        assert_eq!(report.files, 2);
        assert_eq!(report.files_size, 15);
    }

    #[test]
    fn directory_size_is_not_counted_twice() {
        let tree = tree();
        let index = tree.index().unwrap();

        let report = search(&index, &Regex::new("Photos|c.jpg").unwrap());

        assert_eq!(report.directories, 1);
        assert_eq!(report.files, 3);
        assert_eq!(report.total_size, 30 + 5);
        assert_eq!(report.files_size, 10 + 20 + 5);
    }

    #[test]
    fn capture_groups_become_spans() {
        let tree = tree();
        let index = tree.index().unwrap();

        let report = search(&index, &Regex::new(r"(notes)\.(txt)").unwrap());

        assert_eq!(report.hits[0].spans, vec![(3, 8), (9, 12)]);
    }

    #[test]
    fn segments_highlight_spans_below_root() {
        let hit = SearchHit {
            path: "/r/notes.txt".to_string(),
            is_dir: false,
            size: 1,
            spans: vec![(3, 8)],
        };

        let segments = hit.segments(3);

        assert_eq!(
            segments,
            vec![
                Segment { text: "notes", highlighted: true },
                Segment { text: ".txt", highlighted: false },
            ]
        );
    }

    #[test]
    fn whole_path_match_is_shown_plain() {
        let hit = SearchHit {
            path: "/r/x".to_string(),
            is_dir: false,
            size: 1,
            spans: vec![(0, 4)],
        };

        assert!(hit.matches_whole_path());
        assert_eq!(hit.segments(3), vec![Segment { text: "x", highlighted: false }]);
    }
}
