//! Shapes written into an export bundle.

use crate::model::{Document, OrderedRow, Page, Table};
use crate::review::{ReviewState, ReviewSummary};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A completed export.
#[derive(Debug, Clone)]
pub struct ExportBundle {
    /// Bundle folder
    pub dir: PathBuf,

    /// Bundle folder name, e.g. `sample_final_20240501_101500_123`
    pub name: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Contents of `export_report.json`
    pub report: ExportReport,

    /// Every file in the bundle
    pub files: Vec<PathBuf>,
}

/// `export_report.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReport {
    pub export_date: String,
    pub total_pages: usize,
    pub approved_pages: usize,
    pub flagged_pages: usize,
    pub pending_pages: usize,
    pub total_tables: usize,
    pub portfolio: Option<String>,
    /// Flagged pages, 1-indexed
    pub flagged_page_numbers: Vec<usize>,
    /// Bundle-relative paths of the other files
    pub files: Vec<String>,
}

impl ExportReport {
    pub(crate) fn new(
        doc: &Document,
        state: &ReviewState,
        summary: &ReviewSummary,
        exported_at: DateTime<Utc>,
        files: Vec<String>,
    ) -> Self {
        Self {
            export_date: timestamp(exported_at),
            total_pages: summary.total,
            approved_pages: summary.approved,
            flagged_pages: summary.flagged,
            pending_pages: summary.pending,
            total_tables: doc.total_tables(),
            portfolio: state.portfolio().map(str::to_string),
            flagged_page_numbers: state
                .flagged_pages()
                .into_iter()
                .map(Document::page_number)
                .collect(),
            files,
        }
    }
}

/// `<name>_final.json`.
#[derive(Debug, Serialize)]
pub(crate) struct FinalDocument<'a> {
    document_info: DocumentInfo<'a>,
    pages: Vec<PageEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct DocumentInfo<'a> {
    document_name: &'a str,
    original_pdf: Option<String>,
    processed_at: String,
    export_date: String,
    portfolio: Option<&'a str>,
    total_pages: usize,
    total_tables: usize,
    review_status: ReviewCounts,
}

#[derive(Debug, Serialize)]
struct ReviewCounts {
    approved_pages: usize,
    flagged_pages: usize,
}

#[derive(Debug, Serialize)]
struct PageEntry<'a> {
    page_number: usize,
    title: &'a str,
    summary: &'a str,
    keywords: &'a [String],
    tables: Vec<TableEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct TableEntry<'a> {
    title: &'a str,
    rows: Vec<OrderedRow<'a>>,
}

impl<'a> FinalDocument<'a> {
    pub(crate) fn new(
        doc: &'a Document,
        state: &'a ReviewState,
        summary: &ReviewSummary,
        exported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            document_info: DocumentInfo {
                document_name: &doc.name,
                original_pdf: doc.source_file_name(),
                processed_at: timestamp(doc.processed_at),
                export_date: timestamp(exported_at),
                portfolio: state.portfolio(),
                total_pages: doc.page_count(),
                total_tables: doc.total_tables(),
                review_status: ReviewCounts {
                    approved_pages: summary.approved,
                    flagged_pages: summary.flagged,
                },
            },
            pages: doc
                .pages
                .iter()
                .enumerate()
                .map(|(index, page)| PageEntry::new(Document::page_number(index), page))
                .collect(),
        }
    }
}

impl<'a> PageEntry<'a> {
    fn new(page_number: usize, page: &'a Page) -> Self {
        Self {
            page_number,
            title: &page.title,
            summary: &page.summary,
            keywords: &page.keywords,
            tables: page.tables.iter().map(TableEntry::new).collect(),
        }
    }
}

impl<'a> TableEntry<'a> {
    fn new(table: &'a Table) -> Self {
        Self {
            title: &table.title,
            rows: table.ordered_rows().collect(),
        }
    }
}

/// RFC 3339 with millisecond precision, UTC.
pub(crate) fn timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;
    use crate::review::ReviewStatus;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    #[test]
    fn test_final_document_shape() {
        let mut doc = Document::new("sample");
        doc.processed_at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let row: Row = [("b", "2"), ("a", "1")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut page = Page::new("p1", "One").with_keywords(["x"]);
        page.add_table(Table::new("t1", "T").with_data(vec!["b".into(), "a".into()], vec![row]));
        doc.add_page(page);

        let mut state = ReviewState::new(1);
        state.set_status(0, ReviewStatus::Approved).unwrap();
        let summary = state.summary();
        let exported_at = Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap();

        let value = serde_json::to_value(FinalDocument::new(&doc, &state, &summary, exported_at))
            .unwrap();
        assert_eq!(
            value["document_info"]["review_status"],
            json!({"approved_pages": 1, "flagged_pages": 0})
        );
        assert_eq!(value["document_info"]["export_date"], "2024-05-02T08:30:00.000Z");
        assert_eq!(value["document_info"]["processed_at"], "2024-05-01T10:00:00.000Z");
        assert_eq!(value["pages"][0]["page_number"], 1);

        let rows = &value["pages"][0]["tables"][0]["rows"][0];
        let keys: Vec<&String> = rows.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert!(value["pages"][0]["tables"][0].get("table_id").is_none());
        assert_eq!(value["pages"][0].get("status"), None::<&Value>);
    }

    #[test]
    fn test_report_uses_page_numbers() {
        let mut doc = Document::new("sample");
        for i in 0..3 {
            doc.add_page(Page::new(format!("p{}", i), "t"));
        }
        let mut state = ReviewState::new(3).with_portfolio(Some("Equity".into()));
        state.set_status(2, ReviewStatus::Flagged).unwrap();
        let summary = state.summary();

        let report = ExportReport::new(&doc, &state, &summary, Utc::now(), vec![]);
        assert_eq!(report.flagged_page_numbers, vec![3]);
        assert_eq!(report.pending_pages, 2);
        assert_eq!(report.portfolio.as_deref(), Some("Equity"));
    }
}
