//! JSON rendering and the raw structured-text view of tables.

use crate::error::{Error, Result};
use crate::model::{rows_from_json, Row, Table};
use serde::Serialize;
use serde_json::Value;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize any value to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Serialization(format!("JSON serialization error: {}", e)))
}

/// Render a table as editable JSON text.
pub fn table_to_json(table: &Table, format: JsonFormat) -> Result<String> {
    to_json(table, format)
}

/// Table content parsed from raw JSON text.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePayload {
    /// Columns supplied with the payload, if any
    pub columns: Option<Vec<String>>,

    /// Parsed rows
    pub rows: Vec<Row>,
}

/// Parse raw JSON text back into table content.
///
/// Accepts either a bare array of row objects, or an object with a `data`
/// (or `rows`) array and an optional `columns` array, i.e. the shape
/// produced by [`table_to_json`]. Any `metadata` in the payload is ignored;
/// counts are always recomputed from the rows.
pub fn parse_table_json(text: &str) -> Result<TablePayload> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::Validation(format!("table edit is not valid JSON: {}", e)))?;

    let (columns, data) = match &value {
        Value::Array(_) => (None, &value),
        Value::Object(object) => {
            let data = object
                .get("data")
                .or_else(|| object.get("rows"))
                .ok_or_else(|| {
                    Error::Validation("table edit object needs a \"data\" array".to_string())
                })?;
            let columns = match object.get("columns") {
                None | Some(Value::Null) => None,
                Some(Value::Array(items)) => Some(
                    items
                        .iter()
                        .map(|c| {
                            c.as_str().map(str::to_string).ok_or_else(|| {
                                Error::Validation(format!("column name {} is not a string", c))
                            })
                        })
                        .collect::<Result<Vec<_>>>()?,
                ),
                Some(other) => {
                    return Err(Error::Validation(format!(
                        "\"columns\" must be an array of strings, found {}",
                        other
                    )))
                }
            };
            (columns, data)
        }
        _ => {
            return Err(Error::Validation(
                "table edit must be an array of rows or a table object".to_string(),
            ))
        }
    };

    let (rows, _) = rows_from_json(data).map_err(Error::Validation)?;
    Ok(TablePayload { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let row: Row = [("Year", "2023"), ("Amount", "10")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Table::new("t1", "Revenue").with_data(vec!["Year".into(), "Amount".into()], vec![row])
    }

    #[test]
    fn test_to_json_formats() {
        let table = sample_table();
        let pretty = table_to_json(&table, JsonFormat::Pretty).unwrap();
        assert!(pretty.contains('\n'));
        let compact = table_to_json(&table, JsonFormat::Compact).unwrap();
        assert!(!compact.contains('\n'));
    }

    #[test]
    fn test_raw_view_parses_back() {
        let table = sample_table();
        let raw = table_to_json(&table, JsonFormat::Pretty).unwrap();
        let payload = parse_table_json(&raw).unwrap();
        assert_eq!(payload.columns, Some(table.columns.clone()));
        assert_eq!(payload.rows, table.rows);
    }

    #[test]
    fn test_parse_bare_array() {
        let payload = parse_table_json(r#"[{"b": "1", "a": 2}]"#).unwrap();
        assert_eq!(payload.columns, None);
        assert_eq!(payload.rows[0]["a"], "2");
        assert_eq!(payload.rows[0]["b"], "1");
    }

    #[test]
    fn test_parse_rejects_bad_payloads() {
        for bad in [
            "not json",
            r#""just a string""#,
            r#"{"columns": ["a"]}"#,
            r#"{"columns": "a", "data": []}"#,
            r#"{"columns": [1], "data": []}"#,
            r#"[1, 2]"#,
            r#"{"data": {"a": "1"}}"#,
        ] {
            let err = parse_table_json(bad).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "accepted {}", bad);
        }
    }
}
