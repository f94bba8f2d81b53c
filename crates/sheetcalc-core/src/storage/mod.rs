//! On-disk document formats.

pub mod json;

pub use json::{DocumentFile, parse_document, read_document, write_document, write_document_content};
