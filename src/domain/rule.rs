use regex::Regex;
use serde::Deserialize;

use crate::domain::tag::TagSpec;
use crate::domain::one_or_many;
use crate::error::{ReleaserError, Result};

/// Pattern that matches any commit message
pub const MATCH_ALL: &str = "*";

/// Number of recent commit subjects inspected by default
pub const DEFAULT_DEPTH: usize = 20;

fn default_depth() -> usize {
    DEFAULT_DEPTH
}

/// A commit-message match condition plus the tags to emit when it matches.
///
/// Patterns are evaluated in order and the first match wins. A pattern
/// equal to `"*"` matches unconditionally; any other pattern is a regular
/// expression anchored at the start of the commit subject.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rule {
    #[serde(rename = "match", deserialize_with = "one_or_many")]
    pub patterns: Vec<String>,

    pub tags: Vec<TagSpec>,

    /// Restricts which commit of the history is considered
    #[serde(default)]
    pub filter: Option<String>,

    #[serde(default = "default_depth")]
    pub depth: usize,
}

impl Rule {
    /// Create a rule with the default depth and no filter
    pub fn new<I, S>(patterns: I, tags: Vec<TagSpec>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule {
            patterns: patterns.into_iter().map(Into::into).collect(),
            tags,
            filter: None,
            depth: DEFAULT_DEPTH,
        }
    }

    /// Only consider the first commit subject matching `filter`
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Inspect up to `depth` recent commit subjects
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Compile the history filter, if any, as an anchored expression
    pub fn filter_regex(&self) -> Result<Option<Regex>> {
        self.filter
            .as_deref()
            .map(|filter| {
                anchored(filter).map_err(|source| ReleaserError::InvalidPattern {
                    pattern: filter.to_string(),
                    patterns: vec![filter.to_string()],
                    source,
                })
            })
            .transpose()
    }

    /// Check whether a commit subject satisfies any of the rule's patterns.
    ///
    /// Patterns are compiled lazily, so an invalid expression placed after
    /// a matching one is never reported.
    pub fn matches(&self, subject: &str) -> Result<bool> {
        for pattern in &self.patterns {
            if pattern == MATCH_ALL {
                return Ok(true);
            }
            let regex = anchored(pattern).map_err(|source| ReleaserError::InvalidPattern {
                pattern: pattern.clone(),
                patterns: self.patterns.clone(),
                source,
            })?;
            if regex.is_match(subject) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Compile `pattern` so that it only matches at the start of the input
pub fn anchored(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})", pattern))
}
