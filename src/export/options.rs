//! Export options and configuration.

use crate::render::JsonFormat;
use std::path::PathBuf;

/// Default folder that export bundles are written under.
pub const DEFAULT_EXPORT_DIR: &str = "final_outputs";

/// Options for producing an export bundle.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Folder new bundles are created in
    pub output_dir: PathBuf,

    /// Layout of the JSON files in the bundle
    pub json_format: JsonFormat,

    /// Whether to write one text file per page
    pub write_page_files: bool,

    /// Whether to write the review summary
    pub write_summary: bool,
}

impl ExportOptions {
    /// Create new export options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the folder bundles are created in.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Write compact JSON.
    pub fn compact(mut self) -> Self {
        self.json_format = JsonFormat::Compact;
        self
    }

    /// Enable or disable per-page text files.
    pub fn with_page_files(mut self, enabled: bool) -> Self {
        self.write_page_files = enabled;
        self
    }

    /// Enable or disable the review summary.
    pub fn with_summary(mut self, enabled: bool) -> Self {
        self.write_summary = enabled;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            json_format: JsonFormat::Pretty,
            write_page_files: true,
            write_summary: true,
        }
    }
}
