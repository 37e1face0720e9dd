//! Markdown rendering for pages, tables and review summaries.

use crate::model::{Document, Page, Table};
use crate::review::{ReviewState, ReviewStatus};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Rows shown per table in the summary preview.
const PREVIEW_ROWS: usize = 3;

/// Render a table as a Markdown grid.
///
/// A table without columns renders as an empty string; a table without
/// rows renders its header only.
pub fn table_to_markdown(table: &Table) -> String {
    render_table(table, usize::MAX)
}

fn render_table(table: &Table, max_rows: usize) -> String {
    if table.columns.is_empty() {
        return String::new();
    }

    let mut output = String::new();
    output.push('|');
    for column in &table.columns {
        let _ = write!(output, " {} |", escape_cell(column));
    }
    output.push_str("\n|");
    for _ in &table.columns {
        output.push_str(" --- |");
    }
    output.push('\n');

    for row in table.ordered_rows().take(max_rows) {
        output.push('|');
        for cell in row.cells() {
            let _ = write!(output, " {} |", escape_cell(cell));
        }
        output.push('\n');
    }

    if table.row_count() > max_rows {
        let _ = writeln!(
            output,
            "| ... (and {} more rows) |",
            table.row_count() - max_rows
        );
    }

    output
}

/// Render one page for display: header, summary, keywords, tables, text.
pub fn page_to_markdown(page: &Page, page_number: usize) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Page {}: {}\n", page_number, page.title);
    if !page.summary.is_empty() {
        let _ = writeln!(output, "**Summary:** {}\n", page.summary);
    }
    if !page.keywords.is_empty() {
        let _ = writeln!(output, "**Keywords:** {}\n", page.keywords.join(", "));
    }

    if !page.tables.is_empty() {
        output.push_str("## Tables\n\n");
        for table in &page.tables {
            let _ = writeln!(output, "### {}\n", table.title);
            if !table.description.is_empty() {
                let _ = writeln!(output, "*{}*\n", table.description);
            }
            let grid = table_to_markdown(table);
            if !grid.is_empty() {
                output.push_str(&grid);
                output.push('\n');
            }
        }
    }

    if !page.text.trim().is_empty() {
        output.push_str("## Raw Content\n\n");
        output.push_str(page.text.trim());
        output.push('\n');
    }

    output
}

/// Render the review summary of a whole document.
pub fn summary_to_markdown(
    doc: &Document,
    state: &ReviewState,
    generated_at: DateTime<Utc>,
) -> String {
    let summary = state.summary();
    let total_tables = doc.total_tables();
    let mut output = String::new();

    let _ = writeln!(output, "# {} - Review Summary\n", doc.name);
    let _ = writeln!(
        output,
        "**Generated:** {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(portfolio) = state.portfolio() {
        let _ = writeln!(output, "**Portfolio:** {}\n", portfolio);
    }

    output.push_str("## Document Overview\n\n");
    let _ = writeln!(output, "- **Total Pages:** {}", summary.total);
    let _ = writeln!(output, "- **Total Tables:** {}", total_tables);
    let _ = writeln!(output, "- **Approved Pages:** {}", summary.approved);
    let _ = writeln!(output, "- **Flagged Pages:** {}", summary.flagged);
    let _ = writeln!(output, "- **Pending Pages:** {}", summary.pending);
    let _ = writeln!(
        output,
        "- **Review Progress:** {:.1}%\n",
        summary.progress_percent()
    );

    output.push_str("## Key Topics\n\n");
    output.push_str(&doc.keywords().join(", "));
    output.push_str("\n\n");

    output.push_str("## Page-by-Page Summary\n\n");
    for (index, page) in doc.pages.iter().enumerate() {
        let status = state.status(index).unwrap_or_default();
        let _ = writeln!(
            output,
            "### Page {}: {} [{}]\n",
            Document::page_number(index),
            page.title,
            status_label(status)
        );
        if !page.summary.is_empty() {
            let _ = writeln!(output, "**Summary:** {}\n", page.summary);
        }
        if page.tables.is_empty() {
            output.push_str("**Tables:** None\n\n");
        } else {
            let _ = writeln!(output, "**Tables ({}):**", page.tables.len());
            for table in &page.tables {
                let _ = writeln!(output, "- {}", table.title);
            }
            output.push('\n');
        }
        let _ = writeln!(output, "**Keywords:** {}\n", page.keywords.join(", "));
        output.push_str("---\n\n");
    }

    if total_tables > 0 {
        output.push_str("## Table Details\n\n");
        let tables = doc
            .pages
            .iter()
            .enumerate()
            .flat_map(|(i, p)| p.tables.iter().map(move |t| (i, t)));
        for (counter, (index, table)) in tables.enumerate() {
            let _ = writeln!(output, "### Table {}: {}\n", counter + 1, table.title);
            let _ = writeln!(output, "**Page:** {}\n", Document::page_number(index));
            if !table.description.is_empty() {
                let _ = writeln!(output, "**Description:** {}\n", table.description);
            }
            if !table.columns.is_empty() {
                let _ = writeln!(
                    output,
                    "**Structure:** {} columns x {} rows\n",
                    table.column_count(),
                    table.row_count()
                );
                let _ = writeln!(output, "**Columns:** {}\n", table.columns.join(", "));
                if !table.is_empty() {
                    output.push_str("**Sample Data:**\n\n");
                    output.push_str(&render_table(table, PREVIEW_ROWS));
                    output.push('\n');
                }
            }
            output.push_str("---\n\n");
        }
    }

    output.trim_end().to_string() + "\n"
}

fn status_label(status: ReviewStatus) -> &'static str {
    match status {
        ReviewStatus::Approved => "Approved",
        ReviewStatus::Flagged => "Flagged",
        ReviewStatus::Pending => "Pending",
    }
}

/// Escape a value for use inside a Markdown table cell.
fn escape_cell(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '|' | '\\' => {
                result.push('\\');
                result.push(c);
            }
            '\n' | '\r' => result.push(' '),
            _ => result.push(c),
        }
    }
    result.trim().to_string()
}
