//! # Error Module
//!
//! Error types for snapshot reconciliation.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, patterns, what went wrong
//! - **Fatal vs. partial** - input and structural errors abort the run,
//!   per-entry scan and hashing problems are recorded and the run continues

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Snapshot error: {0}")]
    Persist(#[from] PersistError),

    #[error("Verification error: {0}")]
    Verify(#[from] VerifyError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while scanning a directory into a tree
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read metadata of {path}: {source}")]
    ReadMetadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Include and exclude scan lists have common items: {}", paths.join(", "))]
    ConflictingScanPaths { paths: Vec<String> },
}

/// Structural problems with a tree
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Malformed tree: {path} is reachable more than once")]
    MalformedTree { path: String },

    #[error("Top-level entries disagree on their common root: {first} vs {other}")]
    InconsistentRoot { first: String, other: String },

    #[error("Entry {path} does not end with its name {name}")]
    NameMismatch { path: String, name: String },

    #[error("Tree has no entries")]
    EmptyTree,
}

/// Errors from include/exclude filtering
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Filtering removed every entry. Check the include and exclude patterns.")]
    EmptyResult,

    #[error("Invalid pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Pattern {pattern} is both included and excluded")]
    ConflictingPatterns { pattern: String },
}

/// Errors from saving or loading snapshot files
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Failed to open snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot {path} is not a valid tree: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from content verification setup
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("At most one remap rule may omit the old prefix, found {count}")]
    AmbiguousRemap { count: usize },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ReconcileError>;
