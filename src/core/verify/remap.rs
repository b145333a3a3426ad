//! Path remapping from snapshot paths to readable files.

use serde::{Deserialize, Serialize};

/// Replace `old_prefix` with `new_prefix` at the start of a path.
///
/// A rule without an old prefix replaces the tree's original common root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapRule {
    pub old_prefix: Option<String>,
    pub new_prefix: String,
}

impl RemapRule {
    pub fn new(old_prefix: impl Into<String>, new_prefix: impl Into<String>) -> Self {
        Self {
            old_prefix: Some(old_prefix.into()),
            new_prefix: new_prefix.into(),
        }
    }

    /// A rule that replaces the common root
    pub fn root(new_prefix: impl Into<String>) -> Self {
        Self {
            old_prefix: None,
            new_prefix: new_prefix.into(),
        }
    }

    /// Parse `OLD=NEW`, or a bare `NEW` for a root rule
    pub fn parse(rule: &str) -> Self {
        match rule.split_once('=') {
            Some((old, new)) if !old.is_empty() => Self::new(old, new),
            Some((_, new)) => Self::root(new),
            None => Self::root(rule),
        }
    }

    /// Apply this rule, `root` standing in for a missing old prefix
    pub fn apply(&self, path: &str, root: Option<&str>) -> Option<String> {
        let old = self.old_prefix.as_deref().or(root)?;
        let rest = path.strip_prefix(old.trim_end_matches('/'))?;
        if !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }
        Some(format!("{}{}", self.new_prefix, rest))
    }
}

impl std::str::FromStr for RemapRule {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
