//! # Transform Module
//!
//! Path-level transformations applied to a tree before matching.
//!
//! - `policy` - regex include/exclude rules ([`MatchPolicy`])
//! - `filter` - structure-preserving pruning by a policy
//! - `rewrite` - moving a tree under a virtual root for relocated comparisons

mod filter;
mod policy;
mod rewrite;

pub use filter::filter_tree;
pub use policy::MatchPolicy;
pub use rewrite::rewrite_root;
