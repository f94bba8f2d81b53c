//! Range expansion.
//!
//! Turns a `start:end` token (or a bare address) into the ordered list of
//! references it covers: rows outer, columns inner, over the inclusive
//! bounding rectangle of the two endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::cell::Cell;
use super::cell_ref::{CellRef, Reference};
use super::error::EvalError;
use super::eval::CellResolver;

/// Largest number of cells a single range argument may expand to.
pub const MAX_RANGE_CELLS: usize = 1_000_000;

/// A rectangular block of cells, stored with `start` at the top-left.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct RangeRef {
    pub start: CellRef,
    pub end: CellRef,
}

impl RangeRef {
    /// Build the bounding rectangle of two corners, in any order.
    pub fn new(a: CellRef, b: CellRef) -> RangeRef {
        RangeRef {
            start: CellRef::new(a.col.min(b.col), a.row.min(b.row)),
            end: CellRef::new(a.col.max(b.col), a.row.max(b.row)),
        }
    }

    pub fn single(cell: CellRef) -> RangeRef {
        RangeRef {
            start: cell,
            end: cell,
        }
    }

    /// Parse `A1:B2`, `$A$1:B2` or a bare `A1`.
    pub fn parse(token: &str) -> Result<RangeRef, EvalError> {
        let (start, end) = split_endpoints(token)?;
        let start = Reference::parse(start)?.cell;
        let end = match end {
            Some(end) => Reference::parse(end)?.cell,
            None => start,
        };
        Ok(RangeRef::new(start, end))
    }

    /// The same block with `start` at the top-left. Ranges built by hand or
    /// deserialized may have their corners swapped.
    pub fn normalized(self) -> RangeRef {
        RangeRef::new(self.start, self.end)
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        let r = self.normalized();
        (r.start.row..=r.end.row).contains(&cell.row)
            && (r.start.col..=r.end.col).contains(&cell.col)
    }

    /// Number of cells covered, None on overflow.
    pub fn cell_count(&self) -> Option<usize> {
        let rows = self.end.row.abs_diff(self.start.row).checked_add(1)?;
        let cols = self.end.col.abs_diff(self.start.col).checked_add(1)?;
        rows.checked_mul(cols)
    }

    /// Cells in reading order (rows outer, columns inner).
    pub fn cells(self) -> impl Iterator<Item = CellRef> {
        let r = self.normalized();
        (r.start.row..=r.end.row)
            .flat_map(move |row| (r.start.col..=r.end.col).map(move |col| CellRef::new(col, row)))
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

fn split_endpoints(range: &str) -> Result<(&str, Option<&str>), EvalError> {
    let mut parts = range.split(':').map(str::trim);
    let start = parts.next().unwrap_or_default();
    let end = parts.next();
    if parts.next().is_some() {
        return Err(EvalError::InvalidRange(range.to_string()));
    }
    Ok((start, end))
}

/// Expand a range token into references.
///
/// Every produced reference carries the absolute flags of the range: an axis
/// is absolute if either endpoint pins it.
pub fn parse_range(range: &str) -> Result<Vec<Reference>, EvalError> {
    let (start, end) = split_endpoints(range)?;
    let Some(end) = end else {
        return Ok(vec![Reference::parse(start)?]);
    };

    let start = Reference::parse(start)?;
    let end = Reference::parse(end)?;
    let absolute = start.absolute.either(end.absolute);
    let bounds = RangeRef::new(start.cell, end.cell);

    match bounds.cell_count() {
        Some(n) if n <= MAX_RANGE_CELLS => {}
        _ => return Err(EvalError::InvalidRange(range.to_string())),
    }

    Ok(bounds
        .cells()
        .map(|cell| Reference::new(cell, absolute))
        .collect())
}

/// Resolve each range in order and concatenate the cells.
pub fn get_cells_from_ranges<S, R>(ranges: &[S], resolver: &R) -> Result<Vec<Cell>, EvalError>
where
    S: AsRef<str>,
    R: CellResolver + ?Sized,
{
    let mut cells = Vec::new();
    for range in ranges {
        // A blank argument, as in `SUM(A1,)`, reads as one empty cell.
        if range.as_ref().trim().is_empty() {
            cells.push(Cell::new_empty());
            continue;
        }
        for reference in parse_range(range.as_ref())? {
            cells.push(resolver.resolve(&reference.cell));
        }
    }
    Ok(cells)
}
