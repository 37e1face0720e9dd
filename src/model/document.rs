//! Document-level types.

use super::Page;
use crate::detect::PdfFormat;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A processed PDF and its derived pages.
///
/// Pages are stored 0-indexed; everything shown to a reviewer or written to an
/// export uses 1-indexed page numbers via [`Document::page_number`].
#[derive(Debug, Clone)]
pub struct Document {
    /// Document name
    pub name: String,

    /// Folder the document was loaded from
    pub root: PathBuf,

    /// Pages in order
    pub pages: Vec<Page>,

    /// Portfolio tag assigned by the pipeline, if any
    pub portfolio: Option<String>,

    /// When the pipeline produced this document
    pub processed_at: DateTime<Utc>,

    /// The original source artifact
    pub source: SourceArtifact,

    /// Location of the processing metadata file
    pub metadata_path: PathBuf,

    /// Parsed processing metadata (passthrough)
    pub processing_metadata: Value,
}

impl Document {
    /// Create a new empty document.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: PathBuf::new(),
            pages: Vec::new(),
            portfolio: None,
            processed_at: Utc::now(),
            source: SourceArtifact::new(PathBuf::new()),
            metadata_path: PathBuf::new(),
            processing_metadata: Value::Object(Default::default()),
        }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Get a page by index (0-indexed).
    pub fn get_page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Fail with [`Error::PageOutOfRange`] unless `index` names a page.
    pub fn check_index(&self, index: usize) -> Result<()> {
        if index < self.pages.len() {
            Ok(())
        } else {
            Err(Error::PageOutOfRange(index, self.pages.len()))
        }
    }

    /// Display number (1-indexed) of the page at `index`.
    pub fn page_number(index: usize) -> usize {
        index + 1
    }

    /// Index (0-indexed) of a display page number, if it exists.
    pub fn page_index(&self, number: usize) -> Option<usize> {
        if number == 0 || number > self.pages.len() {
            None
        } else {
            Some(number - 1)
        }
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total number of tables across all pages.
    pub fn total_tables(&self) -> usize {
        self.pages.iter().map(|p| p.tables.len()).sum()
    }

    /// Sorted, deduplicated union of every page's keywords.
    pub fn keywords(&self) -> Vec<String> {
        self.pages
            .iter()
            .flat_map(|p| p.keywords.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// File name of the source artifact, if it has one.
    pub fn source_file_name(&self) -> Option<String> {
        self.source
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }
}

/// The original source artifact (a PDF), passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArtifact {
    /// Location on disk
    pub path: PathBuf,

    /// Detected format, if the header was recognized
    pub format: Option<PdfFormat>,
}

impl SourceArtifact {
    /// Create an artifact reference without format information.
    pub fn new(path: PathBuf) -> Self {
        Self { path, format: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Table;

    fn sample() -> Document {
        let mut doc = Document::new("sample");
        let mut first = Page::new("p1", "One").with_keywords(["revenue", "costs"]);
        first.add_table(Table::new("t1", "A"));
        first.add_table(Table::new("t2", "B"));
        doc.add_page(first);
        doc.add_page(Page::new("p2", "Two").with_keywords(["costs", "assets"]));
        doc
    }

    #[test]
    fn test_page_index_mapping() {
        let doc = sample();
        assert_eq!(Document::page_number(0), 1);
        assert_eq!(doc.page_index(1), Some(0));
        assert_eq!(doc.page_index(2), Some(1));
        assert_eq!(doc.page_index(0), None);
        assert_eq!(doc.page_index(3), None);
    }

    #[test]
    fn test_check_index() {
        let doc = sample();
        assert!(doc.check_index(1).is_ok());
        assert!(matches!(doc.check_index(2), Err(Error::PageOutOfRange(2, 2))));
    }

    #[test]
    fn test_totals_and_keywords() {
        let doc = sample();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.total_tables(), 2);
        assert_eq!(doc.keywords(), vec!["assets", "costs", "revenue"]);
    }
}
