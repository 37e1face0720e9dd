//! Error types for pdfqc library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdfqc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading, reviewing, editing or exporting a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An expected file or folder of the document layout is missing.
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Structured content could not be parsed into the page/table model.
    #[error("Malformed data in {location}: {message}")]
    MalformedData {
        /// Offending page file and field (e.g. `page 2 tables[0].data`)
        location: String,
        /// What was wrong with it
        message: String,
    },

    /// A proposed edit violates the table shape rules.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Page index is out of range (0-indexed index, page count).
    #[error("Page index {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// Export could not be produced.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// JSON serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Build a [`Error::MalformedData`] for a location.
    pub fn malformed(location: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedData {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Reasons an export request fails.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The review state covers a different number of pages than the live document.
    #[error("review state is stale: it tracks {review_pages} pages but the document has {document_pages}; reconcile first")]
    StaleState {
        /// Page count recorded in the review state
        review_pages: usize,
        /// Page count of the loaded document
        document_pages: usize,
    },

    /// Writing or publishing the staging directory failed.
    #[error("failed to write bundle at {}: {source}", path.display())]
    Staging {
        /// Path being written when the failure happened
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page index 10 is out of range (document has 5 pages)"
        );

        let err = Error::malformed("page 2 tables[0].data", "expected an array");
        assert_eq!(
            err.to_string(),
            "Malformed data in page 2 tables[0].data: expected an array"
        );
    }

    #[test]
    fn test_stale_state_display() {
        let err: Error = ExportError::StaleState {
            review_pages: 3,
            document_pages: 2,
        }
        .into();
        assert!(matches!(
            err,
            Error::Export(ExportError::StaleState { .. })
        ));
        assert!(err.to_string().contains("reconcile first"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
