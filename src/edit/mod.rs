//! Validation of reviewer edits to page content.
//!
//! [`EditValidator`] never mutates its input: it returns an updated copy of
//! the page, or an [`Error::Validation`] leaving the original untouched.
//! Persisting the result is the caller's job (see
//! [`crate::ReviewSession::commit_edit`]).

use crate::error::{Error, Result};
use crate::model::{check_rows, Page};
use crate::render::parse_table_json;
use std::fmt;

/// Part of a page an edit targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditField {
    /// Rows (and optionally columns) of one table
    Table {
        /// Target table id
        table_id: String,
    },
    /// Markdown text content
    Text,
}

impl EditField {
    /// Edit targeting a table.
    pub fn table(table_id: impl Into<String>) -> Self {
        EditField::Table {
            table_id: table_id.into(),
        }
    }
}

impl fmt::Display for EditField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditField::Table { table_id } => write!(f, "table {:?}", table_id),
            EditField::Text => f.write_str("text"),
        }
    }
}

/// Checks proposed edits against the table shape rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditValidator;

impl EditValidator {
    /// Create a validator.
    pub fn new() -> Self {
        Self
    }

    /// Apply `new_value` to `field` of `page`, returning the updated page.
    ///
    /// Table edits take raw JSON: either an array of row objects, or an object
    /// with a `data` array and an optional `columns` array. Without `columns`,
    /// every row must use the same keys, all drawn from the table's current
    /// columns. Supplying `columns` redefines them, after which rows only need
    /// keys drawn from the new set. Row and column counts are recomputed from
    /// the result.
    ///
    /// Text edits accept any string; surrounding whitespace is trimmed.
    pub fn apply_edit(&self, page: &Page, field: &EditField, new_value: &str) -> Result<Page> {
        let mut updated = page.clone();

        match field {
            EditField::Text => {
                updated.text = new_value.trim().to_string();
            }
            EditField::Table { table_id } => {
                let position = page.table_position(table_id).ok_or_else(|| {
                    Error::Validation(format!(
                        "page {:?} has no table {:?}",
                        page.page_id, table_id
                    ))
                })?;

                let payload = parse_table_json(new_value)?;
                let table = &mut updated.tables[position];
                let (columns, uniform) = match payload.columns {
                    Some(columns) => (columns, false),
                    None => (table.columns.clone(), true),
                };
                check_rows(&columns, &payload.rows, uniform).map_err(|message| {
                    Error::Validation(format!("table {:?}: {}", table_id, message))
                })?;

                table.columns = columns;
                table.rows = payload.rows;
                table.recompute_metadata();
            }
        }

        log::debug!("validated {} edit on page {:?}", field, page.page_id);
        Ok(updated)
    }
}
