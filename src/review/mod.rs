//! Review progress tracking.
//!
//! [`ReviewState`] is the source of truth for QC progress: one
//! [`ReviewStatus`] per page plus the document-level portfolio tag. It is a
//! plain value; durability is handled by the session, which writes the full
//! state after every change.

mod config;

pub use config::ReviewConfig;

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// QC state of a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    /// Not reviewed yet
    #[default]
    Pending,
    /// Reviewed and accepted
    Approved,
    /// Reviewed and set aside for another look
    Flagged,
}

impl ReviewStatus {
    /// Lowercase name as used in persisted files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Flagged => "flagged",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ReviewStatus::Pending),
            "approved" => Ok(ReviewStatus::Approved),
            "flagged" => Ok(ReviewStatus::Flagged),
            other => Err(Error::Validation(format!("unknown review status {:?}", other))),
        }
    }
}

/// Per-page statuses plus document-level review data.
///
/// Holds exactly one status for every index in `0..total_pages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ReviewStateFile", into = "ReviewStateFile")]
pub struct ReviewState {
    statuses: BTreeMap<usize, ReviewStatus>,
    portfolio: Option<String>,
    last_updated: DateTime<Utc>,
    total_pages: usize,
}

impl ReviewState {
    /// Create a state with every page `pending`.
    pub fn new(total_pages: usize) -> Self {
        Self {
            statuses: (0..total_pages).map(|i| (i, ReviewStatus::Pending)).collect(),
            portfolio: None,
            last_updated: Utc::now(),
            total_pages,
        }
    }

    /// Set the initial portfolio tag and return self.
    pub fn with_portfolio(mut self, portfolio: Option<String>) -> Self {
        self.portfolio = portfolio;
        self
    }

    /// Number of pages this state tracks.
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Time of the last change.
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Document-level portfolio tag.
    pub fn portfolio(&self) -> Option<&str> {
        self.portfolio.as_deref()
    }

    /// Status of a page, if the index is tracked.
    pub fn status(&self, index: usize) -> Option<ReviewStatus> {
        self.statuses.get(&index).copied()
    }

    /// All statuses in page order.
    pub fn statuses(&self) -> impl Iterator<Item = (usize, ReviewStatus)> + '_ {
        self.statuses.iter().map(|(i, s)| (*i, *s))
    }

    /// Overwrite a page's status. Last write wins; every transition is allowed.
    pub fn set_status(&mut self, index: usize, status: ReviewStatus) -> Result<()> {
        if index >= self.total_pages {
            return Err(Error::PageOutOfRange(index, self.total_pages));
        }
        self.statuses.insert(index, status);
        self.touch();
        Ok(())
    }

    /// Overwrite the portfolio tag.
    ///
    /// Membership in a recognized tag set is checked by [`ReviewConfig`].
    pub fn set_portfolio(&mut self, tag: Option<String>) {
        self.portfolio = tag;
        self.touch();
    }

    /// Record that something changed (e.g. a committed edit).
    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    /// Count pages per status.
    pub fn summary(&self) -> ReviewSummary {
        let mut summary = ReviewSummary {
            total: self.total_pages,
            ..Default::default()
        };
        for status in self.statuses.values() {
            match status {
                ReviewStatus::Approved => summary.approved += 1,
                ReviewStatus::Flagged => summary.flagged += 1,
                ReviewStatus::Pending => summary.pending += 1,
            }
        }
        let counted = summary.approved + summary.flagged + summary.pending;
        if counted != summary.total {
            log::error!(
                "review state holds {} statuses for {} pages",
                self.statuses.len(),
                self.total_pages
            );
        }
        debug_assert_eq!(counted, summary.total);
        summary
    }

    /// Check whether this state was recorded for a different page count.
    pub fn is_stale(&self, document_pages: usize) -> bool {
        self.total_pages != document_pages
    }

    /// Align the state with a new page count.
    ///
    /// Statuses beyond the new total are dropped, newly covered indices start
    /// `pending`, and the rest are kept. Returns `true` if anything changed.
    pub fn reconcile(&mut self, new_total_pages: usize) -> bool {
        if new_total_pages == self.total_pages {
            return false;
        }
        self.statuses.retain(|i, _| *i < new_total_pages);
        for i in self.total_pages..new_total_pages {
            self.statuses.insert(i, ReviewStatus::Pending);
        }
        self.total_pages = new_total_pages;
        self.touch();
        true
    }

    /// Indices with the given status, ascending.
    pub fn pages_with(&self, status: ReviewStatus) -> Vec<usize> {
        self.statuses
            .iter()
            .filter(|(_, s)| **s == status)
            .map(|(i, _)| *i)
            .collect()
    }

    /// Flagged indices, ascending.
    pub fn flagged_pages(&self) -> Vec<usize> {
        self.pages_with(ReviewStatus::Flagged)
    }
}

/// Page counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    /// Approved pages
    pub approved: usize,
    /// Flagged pages
    pub flagged: usize,
    /// Pending pages
    pub pending: usize,
    /// Total pages (always the sum of the three above)
    pub total: usize,
}

impl ReviewSummary {
    /// Pages that have been looked at (approved or flagged).
    pub fn reviewed(&self) -> usize {
        self.approved + self.flagged
    }

    /// Share of reviewed pages in percent; 0 for an empty document.
    pub fn progress_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.reviewed() as f64 / self.total as f64 * 100.0
        }
    }
}

/// On-disk shape of the review state.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReviewStateFile {
    #[serde(default)]
    page_statuses: BTreeMap<usize, ReviewStatus>,
    #[serde(default)]
    flagged_pages: Vec<usize>,
    #[serde(default)]
    portfolio: Option<String>,
    #[serde(default = "Utc::now")]
    last_updated: DateTime<Utc>,
    #[serde(default)]
    total_pages: Option<usize>,
}

impl From<ReviewStateFile> for ReviewState {
    fn from(file: ReviewStateFile) -> Self {
        let total_pages = file.total_pages.unwrap_or_else(|| {
            file.page_statuses
                .keys()
                .chain(file.flagged_pages.iter())
                .max()
                .map_or(0, |i| i + 1)
        });

        let mut statuses: BTreeMap<usize, ReviewStatus> =
            (0..total_pages).map(|i| (i, ReviewStatus::Pending)).collect();

        // Older files list flagged pages only in `flagged_pages`.
        for index in &file.flagged_pages {
            if !file.page_statuses.contains_key(index) {
                statuses.insert(*index, ReviewStatus::Flagged);
            }
        }
        for (index, status) in &file.page_statuses {
            statuses.insert(*index, *status);
        }

        let before = statuses.len();
        statuses.retain(|i, _| *i < total_pages);
        if statuses.len() != before {
            log::warn!(
                "dropped {} review statuses outside 0..{}",
                before - statuses.len(),
                total_pages
            );
        }

        Self {
            statuses,
            portfolio: file.portfolio,
            last_updated: file.last_updated,
            total_pages,
        }
    }
}

impl From<ReviewState> for ReviewStateFile {
    fn from(state: ReviewState) -> Self {
        let flagged_pages = state.flagged_pages();
        Self {
            page_statuses: state.statuses,
            flagged_pages,
            portfolio: state.portfolio,
            last_updated: state.last_updated,
            total_pages: Some(state.total_pages),
        }
    }
}
