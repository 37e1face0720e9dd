//! # pdfqc
//!
//! Quality control for machine-extracted PDF content.
//!
//! An extraction pipeline turns each PDF into a document folder holding
//! per-page tables and markdown. This library lets a reviewer go through
//! those pages, correct tables and text, mark each page approved or flagged,
//! and finally consolidate everything into one export bundle.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfqc::{open_session, EditField, ReviewStatus};
//!
//! fn main() -> pdfqc::Result<()> {
//!     let mut session = open_session("processed/report_20240501")?;
//!
//!     session.set_status(0, ReviewStatus::Approved)?;
//!     session.commit_edit(1, &EditField::table("t1"), r#"[{"Year": "2024", "Amount": "12"}]"#)?;
//!     session.set_status(1, ReviewStatus::Flagged)?;
//!
//!     let bundle = session.export()?;
//!     println!("exported to {}", bundle.dir.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Write-through review state**: every status change is persisted atomically
//! - **Validated edits**: table edits are checked against the table's columns
//! - **Atomic exports**: a bundle folder is either complete or absent
//! - **Parallel loading**: uses Rayon to parse page files

pub mod detect;
pub mod edit;
pub mod error;
pub mod export;
pub mod model;
pub mod render;
pub mod review;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf_bytes, PdfFormat};
pub use edit::{EditField, EditValidator};
pub use error::{Error, ExportError, Result};
pub use export::{ExportBundle, ExportConsolidator, ExportOptions, ExportReport};
pub use model::{Document, Page, Row, SourceArtifact, Table, TableMetadata};
pub use render::JsonFormat;
pub use review::{ReviewConfig, ReviewState, ReviewStatus, ReviewSummary};
pub use session::{ReviewSession, SessionOptions};
pub use store::{find_documents, LoadOptions, PageStore};

use std::path::Path;

/// Load a document folder with default options.
///
/// # Example
///
/// ```no_run
/// use pdfqc::load_document;
///
/// let doc = load_document("processed/report_20240501").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn load_document<P: AsRef<Path>>(dir: P) -> Result<Document> {
    PageStore::new().load(dir)
}

/// Open a review session on a document folder with default options.
pub fn open_session<P: AsRef<Path>>(dir: P) -> Result<ReviewSession> {
    ReviewSession::open(dir, SessionOptions::default())
}

/// Open a review session with custom options.
pub fn open_session_with_options<P: AsRef<Path>>(
    dir: P,
    options: SessionOptions,
) -> Result<ReviewSession> {
    ReviewSession::open(dir, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(load_document(&missing), Err(Error::NotFound(_))));
        assert!(matches!(open_session(&missing), Err(Error::NotFound(_))));
    }
}
