//! Presentation adapters over the document model.
//!
//! Tables have a single internal representation with two views: a
//! formatted Markdown grid and a raw JSON text that can be edited and parsed
//! back.

mod json;
mod markdown;
mod text;

pub use json::{parse_table_json, table_to_json, to_json, JsonFormat, TablePayload};
pub use markdown::{page_to_markdown, summary_to_markdown, table_to_markdown};
pub use text::{consolidate_text, page_marker, split_consolidated_text};
