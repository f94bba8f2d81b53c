//! JSON document format.
//!
//! ```json
//! {
//!   "name": "Budget",
//!   "data": { "A1": { "value": "10" }, "B1": { "value": "10", "formula": "=SUM(A1)" } },
//!   "rowCount": 100,
//!   "colCount": 26
//! }
//! ```

use serde::{Deserialize, Serialize};
use sheetcalc_engine::engine::{Cell, CellMap};
use std::fs;
use std::path::Path;

use crate::document::{DEFAULT_COLS, DEFAULT_NAME, DEFAULT_ROWS};
use crate::error::Result;

/// Largest document file we are willing to read.
pub const MAX_DOCUMENT_BYTES: u64 = 16 * 1_048_576; // 16 MiB

/// The serialized shape of a document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFile {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub data: CellMap,
    #[serde(default = "default_rows")]
    pub row_count: usize,
    #[serde(default = "default_cols")]
    pub col_count: usize,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_rows() -> usize {
    DEFAULT_ROWS
}

fn default_cols() -> usize {
    DEFAULT_COLS
}

/// Parse a document from JSON text.
pub fn parse_document(content: &str) -> Result<DocumentFile> {
    Ok(serde_json::from_str(content)?)
}

/// Read and parse a document file, refusing oversized input.
pub fn read_document(path: &Path) -> Result<DocumentFile> {
    let meta = fs::metadata(path)?;
    if meta.len() > MAX_DOCUMENT_BYTES {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Refusing to read {}: document too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_DOCUMENT_BYTES
            ),
        )
        .into());
    }
    parse_document(&fs::read_to_string(path)?)
}

/// Serialize a document. Untouched empty cells are left out.
pub fn write_document_content(file: &DocumentFile) -> Result<String> {
    let data: CellMap = file
        .data
        .iter()
        .filter(|(_, cell)| **cell != Cell::new_empty() && **cell != Cell::default())
        .map(|(k, v)| (*k, v.clone()))
        .collect();
    let trimmed = DocumentFile {
        data,
        ..file.clone()
    };
    let mut content = serde_json::to_string_pretty(&trimmed)?;
    content.push('\n');
    Ok(content)
}

/// Write a document file.
pub fn write_document(path: &Path, file: &DocumentFile) -> Result<()> {
    fs::write(path, write_document_content(file)?)?;
    Ok(())
}
