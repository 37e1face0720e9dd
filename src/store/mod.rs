//! Loading and saving document folders produced by the extraction pipeline.
//!
//! [`PageStore`] is a read-only view over pipeline output: loading never
//! touches the folder. Writes happen only through [`PageStore::save_page`]
//! and [`PageStore::save_review_state`], which replace files atomically.

mod atomic;
mod layout;
mod options;
mod record;

pub use atomic::write_atomic;
pub use layout::{
    page_stem, DocumentLayout, METADATA_FILE, PAGES_DIR, REVIEW_STATE_FILE, SOURCE_FILE,
};
pub use options::LoadOptions;

use crate::detect::detect_format_from_path;
use crate::error::{Error, Result};
use crate::model::{Document, Page, SourceArtifact};
use crate::review::ReviewState;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Loader for document folders.
#[derive(Debug, Clone, Default)]
pub struct PageStore {
    options: LoadOptions,
}

impl PageStore {
    /// Create a store with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with custom options.
    pub fn with_options(options: LoadOptions) -> Self {
        Self { options }
    }

    /// Load a whole document folder.
    ///
    /// Every page is parsed before the document is returned.
    ///
    /// # Errors
    ///
    /// * [`Error::NotFound`] if the folder, its processing metadata, its
    ///   source artifact or any page file is missing
    /// * [`Error::MalformedData`] if metadata or a page file cannot be parsed
    pub fn load<P: AsRef<Path>>(&self, dir: P) -> Result<Document> {
        let layout = DocumentLayout::new(dir.as_ref());
        let root = layout.root();
        if !root.is_dir() {
            return Err(Error::NotFound(root.to_path_buf()));
        }

        let metadata_path = layout.metadata();
        if !metadata_path.is_file() {
            return Err(Error::NotFound(metadata_path));
        }
        let processing_metadata: Value = serde_json::from_str(&fs::read_to_string(&metadata_path)?)
            .map_err(|e| Error::malformed(METADATA_FILE, e.to_string()))?;

        let source_path = layout
            .find_source()?
            .ok_or_else(|| Error::NotFound(root.join(SOURCE_FILE)))?;
        let format = detect_format_from_path(&source_path)?;
        if format.is_none() {
            log::warn!(
                "{} does not start with a PDF header; passing it through as-is",
                source_path.display()
            );
        }

        let numbers = layout.page_numbers()?;
        let load_one = |number: &usize| load_page(&layout, *number);
        let pages: Vec<Page> = if self.options.parallel {
            numbers.par_iter().map(load_one).collect::<Result<_>>()?
        } else {
            numbers.iter().map(load_one).collect::<Result<_>>()?
        };

        let name = processing_metadata
            .get("document_name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| folder_name(root));
        let portfolio = processing_metadata
            .get("portfolio")
            .and_then(Value::as_str)
            .map(str::to_string);
        let processed_at = match processing_metadata
            .get("processed_at")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        {
            Some(ts) => ts.with_timezone(&Utc),
            None => DateTime::<Utc>::from(fs::metadata(&metadata_path)?.modified()?),
        };

        log::info!("loaded {:?} with {} pages from {}", name, pages.len(), root.display());

        Ok(Document {
            name,
            root: root.to_path_buf(),
            pages,
            portfolio,
            processed_at,
            source: SourceArtifact {
                path: source_path,
                format,
            },
            metadata_path,
            processing_metadata,
        })
    }

    /// Persist one page (0-indexed) of a document folder.
    ///
    /// Writes the page's JSON file and its text file. If the text file cannot
    /// be written, the previous JSON file is put back so both stay in step.
    pub fn save_page(&self, root: &Path, index: usize, page: &Page) -> Result<()> {
        let layout = DocumentLayout::new(root);
        let number = Document::page_number(index);
        let json_path = layout.page_json(number);
        let previous = fs::read(&json_path).ok();

        write_atomic(&json_path, record::page_to_json(page)?.as_bytes())?;
        if let Err(e) = write_atomic(&layout.page_text(number), page.text.as_bytes()) {
            if let Some(previous) = previous {
                if let Err(rollback) = write_atomic(&json_path, &previous) {
                    log::warn!(
                        "could not restore {} after failed text write: {}",
                        json_path.display(),
                        rollback
                    );
                }
            }
            return Err(e);
        }

        log::info!("saved page {} to {}", number, json_path.display());
        Ok(())
    }

    /// Load the persisted review state of a document folder, if any.
    pub fn load_review_state(&self, root: &Path) -> Result<Option<ReviewState>> {
        let path = DocumentLayout::new(root).review_state();
        if !path.is_file() {
            return Ok(None);
        }
        let state = serde_json::from_str(&fs::read_to_string(&path)?)
            .map_err(|e| Error::malformed(REVIEW_STATE_FILE, e.to_string()))?;
        Ok(Some(state))
    }

    /// Persist the full review state of a document folder.
    pub fn save_review_state(&self, root: &Path, state: &ReviewState) -> Result<()> {
        let path = DocumentLayout::new(root).review_state();
        let json =
            serde_json::to_string_pretty(state).map_err(|e| Error::Serialization(e.to_string()))?;
        write_atomic(&path, json.as_bytes())?;
        log::debug!("saved review state to {}", path.display());
        Ok(())
    }
}

fn load_page(layout: &DocumentLayout, number: usize) -> Result<Page> {
    let json_path = layout.page_json(number);
    let json = fs::read_to_string(&json_path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(json_path.clone()),
        _ => Error::Io(e),
    })?;
    let mut page = record::parse_page(number, &json)?;

    let text_path = layout.page_text(number);
    if text_path.is_file() {
        page.text = fs::read_to_string(&text_path)?;
    }

    log::debug!("loaded page {} ({} tables)", number, page.tables.len());
    Ok(page)
}

fn folder_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// List processed document folders for a PDF, newest first.
///
/// A folder matches when its name starts with the PDF's file stem and it
/// contains a `pages/` folder. A missing `processed_root` yields no results.
pub fn find_documents<P: AsRef<Path>>(processed_root: P, pdf_name: &str) -> Result<Vec<PathBuf>> {
    let processed_root = processed_root.as_ref();
    if !processed_root.is_dir() {
        return Ok(Vec::new());
    }

    let stem = Path::new(pdf_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| pdf_name.to_string());

    let mut matches = Vec::new();
    for entry in fs::read_dir(processed_root)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if path.is_dir() && name.starts_with(&stem) && path.join(PAGES_DIR).is_dir() {
            let modified = entry.metadata()?.modified()?;
            matches.push((modified, path));
        }
    }

    matches.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
    Ok(matches.into_iter().map(|(_, path)| path).collect())
}
