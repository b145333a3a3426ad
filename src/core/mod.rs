//! # Core Module
//!
//! The presentation-agnostic reconciliation engine.
//!
//! ## Modules
//! - `tree` - Entries, trees, the flat path index and aggregate counts
//! - `transform` - Include/exclude filtering and root rewriting
//! - `fingerprint` - Bucket keys that prune file-matching candidates
//! - `comparator` - Metadata equality of files and directory subtrees
//! - `partner` - Directory-mode and file-mode partner finding
//! - `rollup` - Collapses unmatched subtrees into single report items
//! - `verify` - Optional content hashing of matched files
//! - `scanner` - Builds a tree from a directory on disk
//! - `persist` - JSON snapshots of trees
//! - `search` - Regex search over indexed paths
//! - `pipeline` - Orchestrates the full workflow

pub mod comparator;
pub mod fingerprint;
pub mod partner;
pub mod persist;
pub mod pipeline;
pub mod rollup;
pub mod scanner;
pub mod search;
pub mod transform;
pub mod tree;
pub mod verify;

// Re-export commonly used types
pub use partner::{MatchMode, PartnerPair};
pub use pipeline::{Pipeline, Report, ReportFilter};
pub use tree::{Entry, Index, Tree, TreeStats};
