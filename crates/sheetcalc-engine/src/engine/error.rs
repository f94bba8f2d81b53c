//! Error types for formula evaluation and recalculation.
//!
//! [`EvalError`] is the structured failure of a single formula. It is only
//! turned into a display sentinel (`#ERROR!`, `#NAME?`, ...) at the
//! evaluation boundary, see [`EvalError::sentinel`].

use thiserror::Error;

use super::cell_ref::CellRef;

/// Generic failure shown in a cell.
pub const ERROR_SENTINEL: &str = "#ERROR!";
/// Shown when a formula names a function that is not in the library.
pub const NAME_SENTINEL: &str = "#NAME?";
/// Shown when `CHART` is asked for an unsupported chart type.
pub const CHART_TYPE_SENTINEL: &str = "#CHART_TYPE!";
/// Written in place of a reference that was moved off the grid.
pub const REF_SENTINEL: &str = "#REF!";

/// Errors raised while evaluating one formula.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Formula syntax error: {0}")]
    Syntax(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("{function} expects at least {expected} literal argument(s), got {actual}")]
    Arity {
        function: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid chart type: {0}")]
    InvalidChartType(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

impl EvalError {
    /// The display string a cell shows for this error.
    pub fn sentinel(&self) -> &'static str {
        match self {
            EvalError::UnknownFunction(_) => NAME_SENTINEL,
            EvalError::InvalidChartType(_) => CHART_TYPE_SENTINEL,
            _ => ERROR_SENTINEL,
        }
    }
}

/// Errors raised while propagating an edit through the sheet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Circular dependency detected: {}", format_path(.0))]
    CircularReference(Vec<CellRef>),
}

fn format_path(path: &[CellRef]) -> String {
    path.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
