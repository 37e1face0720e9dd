//! Consolidated plain text with page boundary markers.
//!
//! Each page section starts with a marker line such as `<!-- page 3 -->`
//! (1-indexed), so the text of any single page can be recovered from the
//! consolidated file.

use crate::model::Document;
use regex::Regex;
use std::sync::OnceLock;

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^<!-- page (\d+) -->$").unwrap())
}

/// Marker line opening the section of a page (1-indexed number).
pub fn page_marker(page_number: usize) -> String {
    format!("<!-- page {} -->", page_number)
}

/// Concatenate every page's text in page order, each under its marker.
pub fn consolidate_text(doc: &Document) -> String {
    let mut sections = Vec::with_capacity(doc.page_count());
    for (index, page) in doc.pages.iter().enumerate() {
        let text = page.text.trim();
        let marker = page_marker(Document::page_number(index));
        if text.is_empty() {
            sections.push(marker);
        } else {
            sections.push(format!("{}\n{}", marker, text));
        }
    }
    let mut output = sections.join("\n\n");
    output.push('\n');
    output
}

/// Split consolidated text back into `(page_number, text)` sections.
///
/// Markers are only honoured in sequence (1, 2, 3, ...), so a marker-like
/// line quoted inside a page does not start a new section unless it carries
/// the next expected number.
pub fn split_consolidated_text(text: &str) -> Vec<(usize, String)> {
    let mut boundaries = Vec::new();
    let mut expected = 1;
    for caps in marker_regex().captures_iter(text) {
        let number: usize = match caps[1].parse() {
            Ok(n) => n,
            Err(_) => continue,
        };
        if number != expected {
            continue;
        }
        if let Some(whole) = caps.get(0) {
            boundaries.push((number, whole.start(), whole.end()));
            expected += 1;
        }
    }

    boundaries
        .iter()
        .enumerate()
        .map(|(i, (number, _, body_start))| {
            let body_end = boundaries
                .get(i + 1)
                .map(|(_, next_start, _)| *next_start)
                .unwrap_or(text.len());
            (*number, text[*body_start..body_end].trim().to_string())
        })
        .collect()
}
