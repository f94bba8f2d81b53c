use sheetcalc_engine::engine::{Cell, CellMap, CellRef, RecalcMode};
use std::path::PathBuf;

use crate::error::{Result, SheetError};

pub const DEFAULT_ROWS: usize = 100;
pub const DEFAULT_COLS: usize = 26;
pub const DEFAULT_NAME: &str = "Untitled Spreadsheet";

/// Every in-bounds cell is materialized, so the grid area is capped.
pub const MAX_GRID_CELLS: usize = 1_048_576;

/// Fail unless a `rows` x `cols` grid fits under [`MAX_GRID_CELLS`].
pub fn check_grid_size(rows: usize, cols: usize) -> Result<()> {
    match rows.checked_mul(cols) {
        Some(n) if n <= MAX_GRID_CELLS => Ok(()),
        _ => Err(SheetError::GridTooLarge {
            rows,
            cols,
            max: MAX_GRID_CELLS,
        }),
    }
}

/// UI-agnostic document state for the spreadsheet.
#[derive(Clone, Debug)]
pub struct Document {
    /// Display name, stored in the file
    pub name: String,
    /// Every cell inside the grid bounds, keyed by position
    pub cells: CellMap,
    pub row_count: usize,
    pub col_count: usize,
    /// How far an edit propagates
    pub recalc_mode: RecalcMode,
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether the document has been modified since the last load/save
    pub modified: bool,
}

impl Document {
    /// Create a new document with the default grid size.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new() -> Self {
        Self::with_size(DEFAULT_ROWS, DEFAULT_COLS)
    }

    /// Create a document whose grid holds `rows` x `cols` empty cells.
    /// Callers taking sizes from outside should pass them through
    /// [`check_grid_size`] first.
    pub fn with_size(rows: usize, cols: usize) -> Self {
        let mut doc = Document {
            name: DEFAULT_NAME.to_string(),
            cells: CellMap::new(),
            row_count: rows,
            col_count: cols,
            recalc_mode: RecalcMode::default(),
            file_path: None,
            modified: false,
        };
        doc.fill_empty();
        doc
    }

    /// Whether a position lies inside the grid.
    pub fn contains(&self, cell_ref: &CellRef) -> bool {
        cell_ref.row < self.row_count && cell_ref.col < self.col_count
    }

    /// Insert an empty cell at every in-bounds position that has none.
    pub(crate) fn fill_empty(&mut self) {
        for row in 0..self.row_count {
            for col in 0..self.col_count {
                self.cells
                    .entry(CellRef::new(col, row))
                    .or_insert_with(Cell::new_empty);
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_document_is_filled_with_empty_cells() {
        let doc = Document::new();
        assert_eq!(doc.name, "Untitled Spreadsheet");
        assert_eq!(doc.cells.len(), 100 * 26);
        assert_eq!(doc.cells[&CellRef::new(25, 99)], Cell::new_empty());
        assert!(!doc.modified);
    }

    #[test]
    fn test_contains_respects_bounds() {
        let doc = Document::with_size(3, 2);
        assert!(doc.contains(&CellRef::new(1, 2)));
        assert!(!doc.contains(&CellRef::new(2, 0)));
        assert!(!doc.contains(&CellRef::new(0, 3)));
    }

    #[test]
    fn test_grid_size_is_capped() {
        assert!(check_grid_size(1024, 1024).is_ok());
        assert!(matches!(
            check_grid_size(1_000_000_000, 1000),
            Err(SheetError::GridTooLarge { rows: 1_000_000_000, cols: 1000, .. })
        ));
        assert!(check_grid_size(usize::MAX, 2).is_err());
    }
}
