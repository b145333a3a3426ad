//! # Pipeline Module
//!
//! Orchestrates a full reconciliation run.
//!
//! ## Pipeline Stages
//! 1. **Load** - Scan each side's directory or load its snapshot
//! 2. **Filter** - Reduce sizes, apply include/exclude patterns, rewrite roots
//! 3. **Index** - Flatten both trees
//! 4. **Match** - Find partners in directory or file mode
//! 5. **Verify** - Optionally hash matched files
//! 6. **Report** - Roll singles up and produce an owned [`Report`]
//!
//! ## Parallelism
//! Uses rayon for matching subjects and hashing pairs across CPU cores.

mod config;
mod executor;
mod report;

pub use config::{PipelineBuilder, ReconcileConfig, SideConfig};
pub use executor::{load_tree, LoadedTree, Pipeline};
pub use report::{PartnerRecord, Report, ReportFilter, SideSummary, SingleRecord};
