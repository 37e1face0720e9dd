//! Document folder layout.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Folder holding per-page files.
pub const PAGES_DIR: &str = "pages";

/// Opaque pipeline metadata file.
pub const METADATA_FILE: &str = "processing_metadata.json";

/// Persisted review state file.
pub const REVIEW_STATE_FILE: &str = "review_state.json";

/// Preferred source artifact name.
pub const SOURCE_FILE: &str = "original.pdf";

/// Paths of one document folder.
///
/// ```text
/// <root>/
///   original.pdf
///   processing_metadata.json
///   review_state.json
///   pages/page_001.json
///   pages/page_001.md
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLayout {
    root: PathBuf,
}

impl DocumentLayout {
    /// Layout rooted at a document folder.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Document folder.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder of per-page files.
    pub fn pages_dir(&self) -> PathBuf {
        self.root.join(PAGES_DIR)
    }

    /// Structured content file of a page (1-indexed number).
    pub fn page_json(&self, page_number: usize) -> PathBuf {
        self.pages_dir().join(format!("{}.json", page_stem(page_number)))
    }

    /// Text content file of a page (1-indexed number).
    pub fn page_text(&self, page_number: usize) -> PathBuf {
        self.pages_dir().join(format!("{}.md", page_stem(page_number)))
    }

    /// Processing metadata file.
    pub fn metadata(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    /// Review state file.
    pub fn review_state(&self) -> PathBuf {
        self.root.join(REVIEW_STATE_FILE)
    }

    /// Locate the source artifact: `original.pdf`, else the first `*.pdf`
    /// (by name) in the folder root.
    pub fn find_source(&self) -> Result<Option<PathBuf>> {
        let preferred = self.root.join(SOURCE_FILE);
        if preferred.is_file() {
            return Ok(Some(preferred));
        }

        let mut candidates: Vec<PathBuf> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
            })
            .collect();
        candidates.sort();

        if candidates.len() > 1 {
            log::warn!(
                "{} PDF files in {}, using {}",
                candidates.len(),
                self.root.display(),
                candidates[0].display()
            );
        }
        Ok(candidates.into_iter().next())
    }

    /// Page numbers present in the pages folder, ascending.
    ///
    /// Fails with [`Error::NotFound`] if the folder is missing, holds no
    /// page files, or skips a number.
    pub fn page_numbers(&self) -> Result<Vec<usize>> {
        let pages_dir = self.pages_dir();
        if !pages_dir.is_dir() {
            return Err(Error::NotFound(pages_dir));
        }

        let mut numbers: Vec<usize> = fs::read_dir(&pages_dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| parse_page_file_name(&entry.file_name().to_string_lossy()))
            .collect();
        numbers.sort_unstable();
        numbers.dedup();

        if numbers.is_empty() {
            return Err(Error::NotFound(self.page_json(1)));
        }
        for (index, number) in numbers.iter().enumerate() {
            let expected = index + 1;
            if *number != expected {
                return Err(Error::NotFound(self.page_json(expected)));
            }
        }
        Ok(numbers)
    }
}

/// File stem of a page's files, e.g. `page_007`.
pub fn page_stem(page_number: usize) -> String {
    format!("page_{:03}", page_number)
}

/// Page number of a `page_<n>.json` file name.
fn parse_page_file_name(name: &str) -> Option<usize> {
    name.strip_prefix("page_")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}
