//! Document folder fixtures shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Builder for a document folder as written by the extraction pipeline.
pub struct DocumentFolder {
    root: PathBuf,
    name: String,
    pages: Vec<String>,
}

impl DocumentFolder {
    pub fn new(root: &Path, name: &str) -> Self {
        Self {
            root: root.join(name),
            name: name.to_string(),
            pages: Vec::new(),
        }
    }

    /// Add a page with one two-column table and some text.
    pub fn page(mut self, title: &str) -> Self {
        let n = self.pages.len() + 1;
        self.pages.push(format!(
            r#"{{
                "page_id": "page_{n}",
                "title": "{title}",
                "summary": "Summary of {title}",
                "keywords": ["{title}", "finance"],
                "tables": [{{
                    "table_id": "t1",
                    "title": "{title} figures",
                    "description": "",
                    "data": [{{"Item": "Revenue", "Value": "{n}00"}}, {{"Item": "Costs", "Value": "{n}0"}}],
                    "metadata": {{"row_count": 2, "column_count": 2}}
                }}],
                "raw_content": "Text of page {n}",
                "processing_metadata": {{"model": "extractor"}}
            }}"#
        ));
        self
    }

    /// Add a page from raw JSON.
    pub fn raw_page(mut self, json: &str) -> Self {
        self.pages.push(json.to_string());
        self
    }

    pub fn write(self) -> PathBuf {
        let pages_dir = self.root.join("pages");
        fs::create_dir_all(&pages_dir).unwrap();
        fs::write(self.root.join("original.pdf"), b"%PDF-1.7\n%fixture\n").unwrap();
        fs::write(
            self.root.join("processing_metadata.json"),
            format!(
                r#"{{"document_name": "{}", "processed_at": "2024-05-01T09:30:00Z", "pipeline": {{"version": 3}}}}"#,
                self.name
            ),
        )
        .unwrap();
        for (i, json) in self.pages.iter().enumerate() {
            fs::write(pages_dir.join(format!("page_{:03}.json", i + 1)), json).unwrap();
        }
        self.root
    }
}

/// Three-page document named `sample`.
pub fn sample(root: &Path) -> PathBuf {
    DocumentFolder::new(root, "sample")
        .page("Cover")
        .page("Balance Sheet")
        .page("Notes")
        .write()
}
