//! Conversion between page files and the document model.

use crate::error::{Error, Result};
use crate::model::{check_rows, rows_from_json, Page, Table, TableMetadata};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Page file as written by the extraction pipeline.
#[derive(Debug, Deserialize)]
struct PageRecord {
    page_id: Option<String>,
    title: Option<String>,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    tables: Vec<TableRecord>,
    #[serde(default)]
    raw_content: String,
    #[serde(default)]
    processing_metadata: Value,
}

#[derive(Debug, Deserialize)]
struct TableRecord {
    table_id: Option<String>,
    title: Option<String>,
    #[serde(default)]
    description: String,
    columns: Option<Vec<String>>,
    #[serde(alias = "rows")]
    data: Option<Value>,
    #[serde(default)]
    metadata: TableMetadata,
}

/// Build a page from the text of its JSON file (1-indexed page number).
pub(crate) fn parse_page(page_number: usize, json: &str) -> Result<Page> {
    let location = format!("page {}", page_number);
    let record: PageRecord =
        serde_json::from_str(json).map_err(|e| Error::malformed(&location, e.to_string()))?;

    let mut seen_ids = BTreeSet::new();
    let mut tables = Vec::with_capacity(record.tables.len());
    for (i, table) in record.tables.into_iter().enumerate() {
        let table = build_table(page_number, i, table)?;
        if !seen_ids.insert(table.table_id.clone()) {
            return Err(Error::malformed(
                format!("{} tables[{}].table_id", location, i),
                format!("duplicate table id {:?}", table.table_id),
            ));
        }
        tables.push(table);
    }

    Ok(Page {
        page_id: record
            .page_id
            .unwrap_or_else(|| format!("page_{}", page_number)),
        title: record.title.unwrap_or_else(|| format!("Page {}", page_number)),
        summary: record.summary,
        keywords: record.keywords,
        tables,
        text: record.raw_content,
        processing_metadata: record.processing_metadata,
    })
}

fn build_table(page_number: usize, index: usize, record: TableRecord) -> Result<Table> {
    let location = format!("page {} tables[{}].data", page_number, index);

    let (rows, first_row_keys) = match &record.data {
        None | Some(Value::Null) => (Vec::new(), Vec::new()),
        Some(data) => rows_from_json(data).map_err(|m| Error::malformed(&location, m))?,
    };

    // Declared columns only bound the keys; without them rows must be uniform.
    let (columns, uniform) = match record.columns {
        Some(columns) => (columns, false),
        None => (first_row_keys, true),
    };
    check_rows(&columns, &rows, uniform).map_err(|m| Error::malformed(&location, m))?;

    let declared = (record.metadata.row_count, record.metadata.column_count);
    let mut table = Table {
        table_id: record
            .table_id
            .unwrap_or_else(|| format!("table_{}", index)),
        title: record.title.unwrap_or_else(|| "Untitled Table".to_string()),
        description: record.description,
        columns,
        rows,
        metadata: record.metadata,
    };

    if table.recompute_metadata() && (declared.0.is_some() || declared.1.is_some()) {
        log::warn!(
            "page {} table {:?}: metadata said {:?} rows x {:?} columns, data has {} x {}",
            page_number,
            table.table_id,
            declared.0,
            declared.1,
            table.row_count(),
            table.column_count()
        );
    }

    Ok(table)
}

/// Serialize a page back into its file format.
pub(crate) fn page_to_json(page: &Page) -> Result<String> {
    serde_json::to_string_pretty(page).map_err(|e| Error::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "page_id": "p-1",
        "title": "Income Statement",
        "summary": "Revenue by year",
        "keywords": ["revenue", "income"],
        "tables": [{
            "table_id": "t1",
            "title": "Revenue",
            "description": "In millions",
            "data": [{"Year": "2023", "Amount": 10}, {"Year": "2024", "Amount": 12.5}],
            "metadata": {"row_count": 5, "column_count": 2, "source": "llm"}
        }],
        "raw_content": "body",
        "processing_metadata": {"model": "x"}
    }"#;

    #[test]
    fn test_parse_page() {
        let page = parse_page(1, PAGE).unwrap();
        assert_eq!(page.page_id, "p-1");
        assert_eq!(page.keywords, vec!["revenue", "income"]);
        assert_eq!(page.text, "body");

        let table = &page.tables[0];
        assert_eq!(table.columns, vec!["Year", "Amount"]);
        assert_eq!(table.rows[1]["Amount"], "12.5");
        assert_eq!(table.metadata.row_count, Some(2));
        assert_eq!(table.metadata.extra["source"], "llm");
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let page = parse_page(4, "{}").unwrap();
        assert_eq!(page.page_id, "page_4");
        assert_eq!(page.title, "Page 4");
        assert!(page.tables.is_empty());

        let page = parse_page(1, r#"{"tables": [{}]}"#).unwrap();
        assert_eq!(page.tables[0].table_id, "table_0");
        assert_eq!(page.tables[0].title, "Untitled Table");
        assert!(page.tables[0].is_empty());
    }

    #[test]
    fn test_rows_alias_and_declared_columns() {
        let json = r#"{"tables": [{
            "columns": ["a", "b", "c"],
            "rows": [{"a": "1"}, {"b": "2", "c": "3"}]
        }]}"#;
        let page = parse_page(1, json).unwrap();
        assert_eq!(page.tables[0].column_count(), 3);
        assert_eq!(page.tables[0].row_count(), 2);
    }

    #[test]
    fn test_malformed_tables() {
        let cases = [
            r#"{"tables": [{"data": {"a": 1}}]}"#,
            r#"{"tables": [{"data": [1, 2]}]}"#,
            r#"{"tables": [{"data": [{"a": "1"}, {"b": "2"}]}]}"#,
            r#"{"tables": [{"columns": ["a"], "data": [{"b": "2"}]}]}"#,
            r#"{"tables": [{"data": [{"a": [1]}]}]}"#,
        ];
        for json in cases {
            match parse_page(2, json) {
                Err(Error::MalformedData { location, .. }) => {
                    assert_eq!(location, "page 2 tables[0].data", "for {}", json)
                }
                other => panic!("expected malformed data for {}, got {:?}", json, other),
            }
        }
    }

    #[test]
    fn test_malformed_page_fields() {
        assert!(matches!(
            parse_page(1, r#"{"keywords": "not a list"}"#),
            Err(Error::MalformedData { .. })
        ));
        assert!(matches!(parse_page(1, "not json"), Err(Error::MalformedData { .. })));
        assert!(matches!(
            parse_page(1, r#"{"tables": [{"table_id": "t"}, {"table_id": "t"}]}"#),
            Err(Error::MalformedData { .. })
        ));
    }

    #[test]
    fn test_written_page_parses_back() {
        let page = parse_page(1, PAGE).unwrap();
        let json = page_to_json(&page).unwrap();
        let again = parse_page(1, &json).unwrap();
        assert_eq!(again, page);
    }
}
