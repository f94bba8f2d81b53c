use super::cell::{Cell, CellMap};
use super::cell_ref::CellRef;
use super::error::EvalError;
use super::parser::{parse_formula, unquote};
use super::range::get_cells_from_ranges;
use crate::builtins;

/// Supplies cells to the evaluator. Must not fail: absent cells resolve to
/// an empty cell. Positions arrive with `$` markers already stripped.
pub trait CellResolver {
    fn resolve(&self, cell: &CellRef) -> Cell;
}

impl<F> CellResolver for F
where
    F: Fn(&CellRef) -> Cell,
{
    fn resolve(&self, cell: &CellRef) -> Cell {
        self(cell)
    }
}

impl CellResolver for CellMap {
    fn resolve(&self, cell: &CellRef) -> Cell {
        self.get(cell).cloned().unwrap_or_else(Cell::new_empty)
    }
}

/// Evaluate a formula, keeping the structured error.
///
/// Text that does not start with `=` is returned unchanged.
pub fn try_evaluate<R>(formula: &str, resolver: &R) -> Result<String, EvalError>
where
    R: CellResolver + ?Sized,
{
    if !formula.starts_with('=') {
        return Ok(formula.to_string());
    }

    let parsed = parse_formula(formula)?;
    let builtin = builtins::lookup(&parsed.name)
        .ok_or_else(|| EvalError::UnknownFunction(parsed.name.clone()))?;

    let (ranges, literals) = builtin.args.split(&parsed.args);
    let cells = get_cells_from_ranges(ranges, resolver)?;
    let literals: Vec<String> = literals.iter().map(|a| unquote(a)).collect();

    (builtin.eval)(&cells, &literals)
}

/// Evaluate a formula to its display string. Never fails: errors become
/// sentinels such as `#ERROR!` and `#NAME?`.
pub fn evaluate_formula<R>(formula: &str, resolver: &R) -> String
where
    R: CellResolver + ?Sized,
{
    match try_evaluate(formula, resolver) {
        Ok(value) => value,
        Err(err) => {
            log::debug!("Formula evaluation error for {formula:?}: {err}");
            err.sentinel().to_string()
        }
    }
}
