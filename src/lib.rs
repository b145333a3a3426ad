//! # Snapshot Reconcile
//!
//! Compares two snapshots of a filesystem hierarchy and reports which
//! entries on the left have a counterpart on the right.
//!
//! ## Core Philosophy
//! - **Metadata first** - size, kind and modification time decide a match;
//!   contents are only read on request
//! - **Coarsest report** - a subtree with no partner anywhere is reported
//!   once, not file by file
//! - **Never touch the data** - snapshots are read, never modified
//!
//! ## Architecture
//! The library is split into a core engine and presentation layers:
//! - `core` - Scanning, matching, rollup and verification
//! - `events` - Event-driven progress reporting
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{ReconcileError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG`
/// takes precedence; otherwise warnings are shown, or debug output when
/// `verbose` is set.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
