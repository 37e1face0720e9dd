//! Review configuration.

use crate::error::{Error, Result};
use std::collections::BTreeSet;

/// Options governing review-state changes.
#[derive(Debug, Clone, Default)]
pub struct ReviewConfig {
    /// Recognized portfolio tags (`None` = any tag is accepted)
    pub portfolio_tags: Option<BTreeSet<String>>,
}

impl ReviewConfig {
    /// Create a configuration with an open tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict portfolio tags to a recognized set.
    pub fn with_portfolio_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.portfolio_tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Parse a comma-separated tag list (e.g. "Equity, Fixed Income").
    ///
    /// An empty list leaves the tag set open.
    pub fn with_tag_list(self, list: &str) -> Self {
        let tags: Vec<&str> = list
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        if tags.is_empty() {
            self
        } else {
            self.with_portfolio_tags(tags)
        }
    }

    /// Check a tag against the recognized set. Clearing the tag is always allowed.
    pub fn validate_portfolio(&self, tag: Option<&str>) -> Result<()> {
        match (tag, &self.portfolio_tags) {
            (Some(tag), Some(known)) if !known.contains(tag) => Err(Error::Validation(format!(
                "unknown portfolio tag {:?} (expected one of: {})",
                tag,
                known.iter().cloned().collect::<Vec<_>>().join(", ")
            ))),
            _ => Ok(()),
        }
    }
}
