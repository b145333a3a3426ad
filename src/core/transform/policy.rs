//! Include/exclude pattern policy.

use crate::error::FilterError;
use regex::Regex;

/// Regex include and exclude sets applied to absolute paths.
///
/// Patterns are searched anywhere in the path. Exclusion always wins:
/// a path matching any exclude pattern is rejected even if an include
/// pattern also matches.
#[derive(Debug, Clone, Default)]
pub struct MatchPolicy {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl MatchPolicy {
    /// A policy that admits every path
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Compile include and exclude patterns
    pub fn new<I, E>(include: I, exclude: E) -> Result<Self, FilterError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let include = compile(include)?;
        let exclude = compile(exclude)?;

        if let Some(pattern) = include
            .iter()
            .find(|inc| exclude.iter().any(|exc| exc.as_str() == inc.as_str()))
        {
            return Err(FilterError::ConflictingPatterns {
                pattern: pattern.as_str().to_string(),
            });
        }

        Ok(Self { include, exclude })
    }

    /// Whether no pattern is configured at all
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// True when no include pattern is set or at least one matches
    pub fn includes(&self, path: &str) -> bool {
        self.include.is_empty() || self.include.iter().any(|re| re.is_match(path))
    }

    /// True when any exclude pattern matches
    pub fn excludes(&self, path: &str) -> bool {
        self.exclude.iter().any(|re| re.is_match(path))
    }

    /// Included and not excluded
    pub fn admits(&self, path: &str) -> bool {
        !self.excludes(path) && self.includes(path)
    }
}

fn compile<P>(patterns: P) -> Result<Vec<Regex>, FilterError>
where
    P: IntoIterator,
    P::Item: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|pattern| {
            let pattern = pattern.as_ref();
            Regex::new(pattern).map_err(|source| FilterError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
        })
        .collect()
}
