//! Error types for sheetcalc core.

use thiserror::Error;

use sheetcalc_engine::engine::{CellRef, EngineError};

/// Errors that can occur while editing, loading or saving a document
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    CircularDependency(#[from] EngineError),

    #[error("Cell {cell} is outside the {rows}x{cols} grid")]
    OutOfBounds {
        cell: CellRef,
        rows: usize,
        cols: usize,
    },

    #[error("A {rows}x{cols} grid exceeds the limit of {max} cells")]
    GridTooLarge { rows: usize, cols: usize, max: usize },

    #[error("No file path set")]
    NoFilePath,
}

pub type Result<T> = std::result::Result<T, SheetError>;
