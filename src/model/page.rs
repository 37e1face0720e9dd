//! Page-level types.

use super::Table;
use serde::Serialize;
use serde_json::Value;

/// A single reviewable page of a document.
///
/// Pages do not know their own position; the owning [`super::Document`]
/// maps 0-based indices to 1-based page numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// Identifier, unique within the document
    pub page_id: String,

    /// Page title
    pub title: String,

    /// Short summary produced by the pipeline
    pub summary: String,

    /// Ordered keywords
    pub keywords: Vec<String>,

    /// Tables extracted from the page
    pub tables: Vec<Table>,

    /// Markdown text content
    #[serde(rename = "raw_content")]
    pub text: String,

    /// Opaque pipeline metadata (passthrough)
    pub processing_metadata: Value,
}

impl Page {
    /// Create an empty page.
    pub fn new(page_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            title: title.into(),
            summary: String::new(),
            keywords: Vec::new(),
            tables: Vec::new(),
            text: String::new(),
            processing_metadata: Value::Object(Default::default()),
        }
    }

    /// Set the summary and return self.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Set the keywords and return self.
    pub fn with_keywords<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the text content and return self.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Add a table to the page.
    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// Get a table by id.
    pub fn table(&self, table_id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.table_id == table_id)
    }

    /// Position of a table by id.
    pub fn table_position(&self, table_id: &str) -> Option<usize> {
        self.tables.iter().position(|t| t.table_id == table_id)
    }

    /// Check if the page has neither tables nor text.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.text.trim().is_empty()
    }
}
