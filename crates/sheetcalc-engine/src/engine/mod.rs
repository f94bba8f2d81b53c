//! Spreadsheet engine API.
//!
//! This module provides the core computation engine for the spreadsheet:
//!
//! - [`Cell`], [`CellStyle`], [`CellMap`] - Data structures for cell storage
//! - [`CellRef`], [`Reference`] - Address parsing (A1 notation ↔ row/col indices, `$` markers)
//! - [`parse_range`] - Expand `A1:B2` into an ordered list of references
//! - [`evaluate_formula`] - Evaluate `=FUNC(args)` against a [`CellResolver`]
//! - [`DependencyGraph`], [`recalculate`] - Propagate an edit to dependent cells
//! - [`offset_formula_references`] - Translate relative references on copy
//! - [`format_number`] - Format numeric results for display

mod cell;
mod cell_ref;
mod cycle;
mod deps;
mod error;
mod eval;
mod format;
mod parser;
mod range;
mod translate;

pub use cell::{Cell, CellMap, CellStyle, TextAlign};
pub use cell_ref::{
    AbsoluteFlags, CellRef, Reference, address_to_position, is_absolute_reference,
    position_to_address,
};
pub use cycle::detect_cycle;
pub use deps::{DependencyGraph, RecalcMode, extract_dependencies, recalculate, recalculate_all};
pub use error::{
    CHART_TYPE_SENTINEL, ERROR_SENTINEL, EngineError, EvalError, NAME_SENTINEL, REF_SENTINEL,
};
pub use eval::{CellResolver, evaluate_formula, try_evaluate};
pub use format::{format_number, parse_leading_number, parse_number};
pub use parser::{ParsedFormula, parse_formula, split_args, unquote};
pub use range::{MAX_RANGE_CELLS, RangeRef, get_cells_from_ranges, parse_range};
pub use translate::offset_formula_references;
