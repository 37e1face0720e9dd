//! Document model types for extracted content under review.
//!
//! This module defines the in-memory representation of a processed
//! document: its pages, and the tables extracted from each page. The model
//! is presentation-agnostic; the `render` module provides views over it.

mod document;
mod page;
mod table;

pub use document::{Document, SourceArtifact};
pub use page::Page;
pub use table::{cell_text, check_rows, rows_from_json, OrderedRow, Row, Table, TableMetadata};
