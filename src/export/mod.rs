//! Consolidation of a reviewed document into a final export bundle.
//!
//! Every piece of the bundle is built in memory first. The files are then
//! written into a hidden staging folder next to the destination, which is
//! renamed into place in one step, so a bundle folder is either absent or
//! complete.

mod bundle;
mod options;

pub use bundle::{ExportBundle, ExportReport};
pub use options::{ExportOptions, DEFAULT_EXPORT_DIR};

use crate::error::{Error, ExportError, Result};
use crate::model::Document;
use crate::render::{consolidate_text, page_to_markdown, summary_to_markdown, to_json};
use crate::review::ReviewState;
use crate::store::METADATA_FILE;
use bundle::FinalDocument;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Name of the report file inside a bundle.
pub const REPORT_FILE: &str = "export_report.json";

/// Longest page title kept in a per-page file name.
const MAX_TITLE_LEN: usize = 50;

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w.-]+").unwrap())
}

/// Replace characters that are unsafe in file names with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned = unsafe_chars().replace_all(name.trim(), "_");
    let cleaned = cleaned.trim_matches(|c| c == '_' || c == '.');
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned.to_string()
    }
}

/// One file of a bundle, relative to the bundle folder.
#[derive(Debug)]
struct StagedFile {
    path: String,
    content: Content,
}

#[derive(Debug)]
enum Content {
    Bytes(Vec<u8>),
    CopyOf(PathBuf),
}

impl StagedFile {
    fn bytes(path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: Content::Bytes(bytes.into()),
        }
    }

    fn copy(path: impl Into<String>, source: &Path) -> Self {
        Self {
            path: path.into(),
            content: Content::CopyOf(source.to_path_buf()),
        }
    }
}

/// Produces export bundles from a document and its review state.
#[derive(Debug, Clone, Default)]
pub struct ExportConsolidator {
    options: ExportOptions,
}

impl ExportConsolidator {
    /// Create a consolidator.
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Export options in use.
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Export a document, timestamped now.
    pub fn export(&self, doc: &Document, state: &ReviewState) -> Result<ExportBundle> {
        self.export_at(doc, state, Utc::now())
    }

    /// Export a document with an explicit timestamp.
    ///
    /// Neither the document nor the review state is changed. A new bundle
    /// folder is created on every call; existing folders are never reused.
    ///
    /// # Errors
    ///
    /// * [`ExportError::StaleState`] if the review state tracks a different
    ///   page count than the document
    /// * [`ExportError::Staging`] if the bundle cannot be written
    pub fn export_at(
        &self,
        doc: &Document,
        state: &ReviewState,
        exported_at: DateTime<Utc>,
    ) -> Result<ExportBundle> {
        if state.is_stale(doc.page_count()) {
            log::warn!(
                "refusing to export {:?}: review state tracks {} pages, document has {}",
                doc.name,
                state.total_pages(),
                doc.page_count()
            );
            return Err(ExportError::StaleState {
                review_pages: state.total_pages(),
                document_pages: doc.page_count(),
            }
            .into());
        }

        let base = sanitize_file_name(&doc.name);
        let (files, report) = self.build(doc, state, &base, exported_at)?;

        let output_dir = &self.options.output_dir;
        fs::create_dir_all(output_dir).map_err(staging_error(output_dir))?;
        let stem = format!("{}_final_{}", base, exported_at.format("%Y%m%d_%H%M%S_%3f"));
        let dir = unique_dir(output_dir, &stem);
        publish(&dir, &files)?;

        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(stem);
        log::info!("exported {:?} to {}", doc.name, dir.display());
        Ok(ExportBundle {
            files: files.iter().map(|f| dir.join(&f.path)).collect(),
            dir,
            name,
            exported_at,
            report,
        })
    }

    /// Export on the blocking thread pool.
    #[cfg(feature = "async")]
    pub async fn export_async(&self, doc: Document, state: ReviewState) -> Result<ExportBundle> {
        let consolidator = self.clone();
        tokio::task::spawn_blocking(move || consolidator.export(&doc, &state))
            .await
            .map_err(|e| Error::Io(io::Error::other(e)))?
    }

    /// Build every file of the bundle in memory.
    fn build(
        &self,
        doc: &Document,
        state: &ReviewState,
        base: &str,
        exported_at: DateTime<Utc>,
    ) -> Result<(Vec<StagedFile>, ExportReport)> {
        let format = self.options.json_format;
        let summary = state.summary();
        let mut files = Vec::new();

        let final_doc = FinalDocument::new(doc, state, &summary, exported_at);
        files.push(StagedFile::bytes(
            format!("{}_final.json", base),
            to_json(&final_doc, format)?,
        ));

        if self.options.write_page_files {
            for (index, page) in doc.pages.iter().enumerate() {
                let number = Document::page_number(index);
                files.push(StagedFile::bytes(
                    page_file_name(number, &page.title),
                    page_to_markdown(page, number),
                ));
            }
        }
        files.push(StagedFile::bytes(
            format!("{}_content.md", base),
            consolidate_text(doc),
        ));

        if self.options.write_summary {
            files.push(StagedFile::bytes(
                format!("{}_summary.md", base),
                summary_to_markdown(doc, state, exported_at),
            ));
        }

        files.push(StagedFile::copy(format!("{}.pdf", base), &doc.source.path));
        if doc.metadata_path.is_file() {
            files.push(StagedFile::copy(METADATA_FILE, &doc.metadata_path));
        }

        let names = files.iter().map(|f| f.path.clone()).collect();
        let report = ExportReport::new(doc, state, &summary, exported_at, names);
        files.push(StagedFile::bytes(REPORT_FILE, to_json(&report, format)?));

        Ok((files, report))
    }
}

/// Per-page file name, e.g. `pages/page_03_Balance_Sheet.md`.
fn page_file_name(page_number: usize, title: &str) -> String {
    let title: String = sanitize_file_name(title).chars().take(MAX_TITLE_LEN).collect();
    format!("pages/page_{:02}_{}.md", page_number, title)
}

/// First of `stem`, `stem_2`, `stem_3`, ... that does not exist yet.
fn unique_dir(root: &Path, stem: &str) -> PathBuf {
    let mut candidate = root.join(stem);
    let mut suffix = 2;
    while candidate.exists() {
        candidate = root.join(format!("{}_{}", stem, suffix));
        suffix += 1;
    }
    candidate
}

fn staging_error(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
    move |source| {
        ExportError::Staging {
            path: path.to_path_buf(),
            source,
        }
        .into()
    }
}

/// Write `files` into a staging folder and rename it to `target`.
fn publish(target: &Path, files: &[StagedFile]) -> Result<()> {
    let mut staging_name = std::ffi::OsString::from(".");
    staging_name.push(target.file_name().unwrap_or_default());
    staging_name.push(".partial");
    let staging = target.with_file_name(staging_name);

    if staging.exists() {
        log::warn!("removing leftover staging folder {}", staging.display());
        fs::remove_dir_all(&staging).map_err(staging_error(&staging))?;
    }

    let result = write_staging(&staging, files)
        .and_then(|_| fs::rename(&staging, target).map_err(staging_error(target)));
    if result.is_err() {
        let _ = fs::remove_dir_all(&staging);
    }
    result
}

fn write_staging(staging: &Path, files: &[StagedFile]) -> Result<()> {
    for file in files {
        let path = staging.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(staging_error(parent))?;
        }
        match &file.content {
            Content::Bytes(bytes) => {
                let mut out = File::create(&path).map_err(staging_error(&path))?;
                out.write_all(bytes).map_err(staging_error(&path))?;
                out.sync_all().map_err(staging_error(&path))?;
            }
            Content::CopyOf(source) => {
                fs::copy(source, &path).map_err(staging_error(source))?;
            }
        }
    }
    Ok(())
}
