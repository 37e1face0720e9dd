//! Source artifact format detection.
//!
//! The source PDF is never parsed; only its header is sniffed so that a
//! misplaced or truncated file can be reported to the reviewer.

use crate::error::Result;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF format information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Detect the format of a source artifact on disk.
///
/// # Returns
/// * `Ok(Some(PdfFormat))` if the file starts with a valid PDF header
/// * `Ok(None)` if it does not (including files shorter than a header)
/// * `Err(Error::Io)` if the file cannot be read
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<Option<PdfFormat>> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(16);
    file.take(16).read_to_end(&mut header)?;
    Ok(detect_format_from_bytes(&header))
}

/// Detect PDF format from the first bytes of a file.
pub fn detect_format_from_bytes(data: &[u8]) -> Option<PdfFormat> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return None;
    }

    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    is_valid_version(&version).then_some(PdfFormat { version })
}

/// Check if a version string is valid.
fn is_valid_version(version: &str) -> bool {
    if version.len() != 3 {
        return false;
    }

    let chars: Vec<char> = version.chars().collect();
    chars[0].is_ascii_digit() && chars[1] == '.' && chars[2].is_ascii_digit()
}

/// Check if bytes represent a valid PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_some()
}
