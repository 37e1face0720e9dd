//! Table types.

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// One table row: column name to cell text.
pub type Row = BTreeMap<String, String>;

/// A structured grid of extracted data.
///
/// Columns are an explicit attribute. Every row's key set is a subset of
/// `columns`, and `metadata` counts always reflect the actual data.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Identifier, unique within the page
    pub table_id: String,

    /// Table title
    pub title: String,

    /// Free-form description (passthrough)
    pub description: String,

    /// Ordered column names
    pub columns: Vec<String>,

    /// Ordered rows
    pub rows: Vec<Row>,

    /// Row/column counts plus any passthrough metadata
    pub metadata: TableMetadata,
}

impl Table {
    /// Create a new empty table.
    pub fn new(table_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            title: title.into(),
            description: String::new(),
            columns: Vec::new(),
            rows: Vec::new(),
            metadata: TableMetadata::default(),
        }
    }

    /// Set the description and return self.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replace columns and rows, recomputing the counts.
    ///
    /// No shape checking happens here; see [`check_rows`].
    pub fn with_data(mut self, columns: Vec<String>, rows: Vec<Row>) -> Self {
        self.columns = columns;
        self.rows = rows;
        self.recompute_metadata();
        self
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of declared columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Overwrite `row_count`/`column_count` from the actual data.
    ///
    /// Returns `true` if either stored count was wrong.
    pub fn recompute_metadata(&mut self) -> bool {
        let stale = self.metadata.row_count != Some(self.row_count())
            || self.metadata.column_count != Some(self.column_count());
        self.metadata.row_count = Some(self.row_count());
        self.metadata.column_count = Some(self.column_count());
        stale
    }

    /// Rows in declared column order, ready for serialization.
    pub fn ordered_rows(&self) -> impl Iterator<Item = OrderedRow<'_>> {
        self.rows.iter().map(move |row| OrderedRow {
            columns: &self.columns,
            row,
        })
    }

    /// Get plain text representation of the table (tab-separated, header first).
    pub fn plain_text(&self) -> String {
        let mut lines = vec![self.columns.join("\t")];
        for row in &self.rows {
            lines.push(
                self.columns
                    .iter()
                    .map(|c| row.get(c).map(String::as_str).unwrap_or(""))
                    .collect::<Vec<_>>()
                    .join("\t"),
            );
        }
        lines.join("\n")
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<OrderedRow<'_>> = self.ordered_rows().collect();
        let mut state = serializer.serialize_struct("Table", 6)?;
        state.serialize_field("table_id", &self.table_id)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("columns", &self.columns)?;
        state.serialize_field("data", &rows)?;
        state.serialize_field("metadata", &self.metadata)?;
        state.end()
    }
}

/// Table metadata as found in page files.
///
/// The counts are recomputed after every load and edit; unknown keys are
/// carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Number of rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,

    /// Number of columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_count: Option<usize>,

    /// Passthrough keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A row borrowed together with its table's column order.
#[derive(Debug, Clone, Copy)]
pub struct OrderedRow<'a> {
    columns: &'a [String],
    row: &'a Row,
}

impl OrderedRow<'_> {
    /// Cell values in column order; missing cells are empty.
    pub fn cells(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(|c| self.row.get(c).map(String::as_str).unwrap_or(""))
    }
}

impl Serialize for OrderedRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present = self
            .columns
            .iter()
            .filter(|c| self.row.contains_key(c.as_str()));
        let mut map = serializer.serialize_map(Some(present.clone().count()))?;
        for column in present {
            map.serialize_entry(column, &self.row[column.as_str()])?;
        }
        map.end()
    }
}

/// Convert one JSON cell into its text form.
///
/// Strings are kept, numbers and booleans are stringified, `null` is empty.
/// Nested arrays and objects are rejected.
pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Convert a JSON array of objects into rows, keeping the key order of the
/// first row as the inferred column order.
pub fn rows_from_json(value: &Value) -> Result<(Vec<Row>, Vec<String>), String> {
    let items = value
        .as_array()
        .ok_or_else(|| format!("expected an array of row objects, found {}", kind(value)))?;

    let mut rows = Vec::with_capacity(items.len());
    let mut first_keys = Vec::new();

    for (i, item) in items.iter().enumerate() {
        let object = item
            .as_object()
            .ok_or_else(|| format!("row {} is {}, not an object", i, kind(item)))?;

        let mut row = Row::new();
        for (key, cell) in object {
            let text = cell_text(cell)
                .ok_or_else(|| format!("row {} column {:?} holds a nested value", i, key))?;
            row.insert(key.clone(), text);
        }
        if i == 0 {
            first_keys = object.keys().cloned().collect();
        }
        rows.push(row);
    }

    Ok((rows, first_keys))
}

/// Check that columns and rows form a valid table.
///
/// - column names are unique
/// - zero columns is only allowed with zero rows
/// - every row's keys are declared columns
/// - with `uniform`, every row has the same key set
pub fn check_rows(columns: &[String], rows: &[Row], uniform: bool) -> Result<(), String> {
    let declared: BTreeSet<&str> = columns.iter().map(String::as_str).collect();
    if declared.len() != columns.len() {
        let mut seen = BTreeSet::new();
        let dup = columns
            .iter()
            .find(|c| !seen.insert(c.as_str()))
            .map(String::as_str)
            .unwrap_or_default();
        return Err(format!("duplicate column {:?}", dup));
    }

    if columns.is_empty() && !rows.is_empty() {
        return Err(format!("{} rows but no columns", rows.len()));
    }

    for (i, row) in rows.iter().enumerate() {
        if let Some(key) = row.keys().find(|k| !declared.contains(k.as_str())) {
            return Err(format!("row {} has undeclared column {:?}", i, key));
        }
    }

    if uniform {
        if let Some(first) = rows.first() {
            for (i, row) in rows.iter().enumerate().skip(1) {
                if !row.keys().eq(first.keys()) {
                    return Err(format!(
                        "row {} has a different key set than row 0; redefine columns to change the shape",
                        i
                    ));
                }
            }
        }
    }

    Ok(())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
