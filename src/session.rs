//! Session-scoped review context.
//!
//! A [`ReviewSession`] owns one loaded document and its review state for the
//! lifetime of a reviewer's session. Every change goes through the session,
//! which validates it, writes it to disk and only then updates memory, so a
//! failed write never leaves the in-memory view ahead of the files.

use crate::edit::{EditField, EditValidator};
use crate::error::Result;
use crate::export::{ExportBundle, ExportConsolidator, ExportOptions};
use crate::model::{Document, Page};
use crate::review::{ReviewConfig, ReviewState, ReviewStatus, ReviewSummary};
use crate::store::{LoadOptions, PageStore};
use std::path::{Path, PathBuf};

/// Options for a review session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// How the document folder is loaded
    pub load: LoadOptions,

    /// Rules for review-state changes
    pub review: ReviewConfig,

    /// Where and how exports are written
    pub export: ExportOptions,
}

impl SessionOptions {
    /// Create new session options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the load options.
    pub fn with_load(mut self, load: LoadOptions) -> Self {
        self.load = load;
        self
    }

    /// Set the review configuration.
    pub fn with_review(mut self, review: ReviewConfig) -> Self {
        self.review = review;
        self
    }

    /// Set the export options.
    pub fn with_export(mut self, export: ExportOptions) -> Self {
        self.export = export;
        self
    }
}

/// An open document under review.
#[derive(Debug)]
pub struct ReviewSession {
    root: PathBuf,
    store: PageStore,
    validator: EditValidator,
    options: SessionOptions,
    document: Document,
    state: ReviewState,
}

impl ReviewSession {
    /// Open a document folder for review.
    ///
    /// Loads the document and its persisted review state. If the folder has
    /// no review state yet, an all-`pending` state is created and written.
    /// A state recorded for a different page count is kept as-is; check
    /// [`ReviewSession::is_stale`] and call [`ReviewSession::reconcile`].
    pub fn open<P: AsRef<Path>>(dir: P, options: SessionOptions) -> Result<Self> {
        let root = dir.as_ref().to_path_buf();
        let store = PageStore::with_options(options.load.clone());
        let document = store.load(&root)?;

        let state = match store.load_review_state(&root)? {
            Some(state) => {
                if state.is_stale(document.page_count()) {
                    log::warn!(
                        "review state of {} tracks {} pages but the document has {}",
                        root.display(),
                        state.total_pages(),
                        document.page_count()
                    );
                }
                state
            }
            None => {
                let state = ReviewState::new(document.page_count())
                    .with_portfolio(document.portfolio.clone());
                store.save_review_state(&root, &state)?;
                log::info!("started review of {:?}", document.name);
                state
            }
        };

        Ok(Self {
            root,
            store,
            validator: EditValidator::new(),
            options,
            document,
            state,
        })
    }

    /// Document folder.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The loaded document, including committed edits.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Current review state.
    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    /// Session options.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Page at `index` (0-indexed).
    pub fn page(&self, index: usize) -> Result<&Page> {
        self.document.check_index(index)?;
        Ok(&self.document.pages[index])
    }

    /// Status counts.
    pub fn summary(&self) -> ReviewSummary {
        self.state.summary()
    }

    /// Whether the review state tracks a different page count than the document.
    pub fn is_stale(&self) -> bool {
        self.state.is_stale(self.document.page_count())
    }

    /// Set and persist the status of a page (0-indexed).
    pub fn set_status(&mut self, index: usize, status: ReviewStatus) -> Result<()> {
        self.document.check_index(index)?;
        self.update_state(|state| state.set_status(index, status))?;
        log::info!("page {} marked {}", Document::page_number(index), status);
        Ok(())
    }

    /// Set (or clear) and persist the portfolio tag.
    pub fn set_portfolio(&mut self, tag: Option<String>) -> Result<()> {
        self.options.review.validate_portfolio(tag.as_deref())?;
        self.update_state(|state| {
            state.set_portfolio(tag);
            Ok(())
        })
    }

    /// Align the review state with the document's page count.
    ///
    /// Returns `true` if the state changed (and was persisted).
    pub fn reconcile(&mut self) -> Result<bool> {
        let pages = self.document.page_count();
        let mut next = self.state.clone();
        if !next.reconcile(pages) {
            return Ok(false);
        }
        self.store.save_review_state(&self.root, &next)?;
        log::info!(
            "reconciled review state from {} to {} pages",
            self.state.total_pages(),
            pages
        );
        self.state = next;
        Ok(true)
    }

    /// Validate an edit to a page (0-indexed), persist it, then swap it in.
    ///
    /// A rejected edit leaves both memory and disk untouched.
    pub fn commit_edit(&mut self, index: usize, field: &EditField, new_value: &str) -> Result<()> {
        self.document.check_index(index)?;
        let page = self
            .validator
            .apply_edit(&self.document.pages[index], field, new_value)?;

        self.store.save_page(&self.root, index, &page)?;
        self.document.pages[index] = page;

        self.update_state(|state| {
            state.touch();
            Ok(())
        })
    }

    /// Export with the session's export options.
    pub fn export(&self) -> Result<ExportBundle> {
        self.export_with(self.options.export.clone())
    }

    /// Export with explicit options.
    pub fn export_with(&self, options: ExportOptions) -> Result<ExportBundle> {
        ExportConsolidator::new(options).export(&self.document, &self.state)
    }

    /// Mutate a copy of the state, persist it, then swap it in.
    fn update_state<F>(&mut self, change: F) -> Result<()>
    where
        F: FnOnce(&mut ReviewState) -> Result<()>,
    {
        let mut next = self.state.clone();
        change(&mut next)?;
        self.store.save_review_state(&self.root, &next)?;
        self.state = next;
        Ok(())
    }
}
