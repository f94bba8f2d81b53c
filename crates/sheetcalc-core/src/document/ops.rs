use super::{Document, check_grid_size};
use crate::error::{Result, SheetError};
use sheetcalc_engine::engine::{
    Cell, CellMap, CellRef, CellStyle, address_to_position, evaluate_formula,
    offset_formula_references, recalculate, recalculate_all,
};

impl Document {
    fn check_bounds(&self, cell_ref: &CellRef) -> Result<()> {
        if self.contains(cell_ref) {
            Ok(())
        } else {
            Err(SheetError::OutOfBounds {
                cell: *cell_ref,
                rows: self.row_count,
                cols: self.col_count,
            })
        }
    }

    /// Set cell contents from input string.
    ///
    /// Input starting with `=` is a formula. Dependent formulas are
    /// re-evaluated per [`Document::recalc_mode`]. Returns the changed cells.
    /// An edit that would create a dependency cycle leaves the document
    /// unchanged.
    pub fn set_cell_from_input(&mut self, cell_ref: CellRef, input: &str) -> Result<CellMap> {
        self.check_bounds(&cell_ref)?;
        let updates = recalculate(&self.cells, cell_ref, input, self.recalc_mode)?;
        self.cells
            .extend(updates.iter().map(|(k, v)| (*k, v.clone())));
        self.modified = true;
        Ok(updates)
    }

    /// Like [`Document::set_cell_from_input`], addressed as `"B2"` or `"$B$2"`.
    pub fn set_cell_from_address(&mut self, address: &str, input: &str) -> Result<CellMap> {
        let cell_ref = parse_address(address)?;
        self.set_cell_from_input(cell_ref, input)
    }

    /// Clear the specified cell's contents (its style is kept).
    pub fn clear_cell(&mut self, cell_ref: CellRef) -> Result<CellMap> {
        self.set_cell_from_input(cell_ref, "")
    }

    pub fn get_cell(&self, cell_ref: &CellRef) -> Option<&Cell> {
        self.cells.get(cell_ref)
    }

    /// Display value of a cell, `""` for an absent one.
    pub fn get_cell_display(&self, cell_ref: &CellRef) -> &str {
        self.cells.get(cell_ref).map(Cell::value_str).unwrap_or("")
    }

    /// Merge a partial style onto a cell. Values are not re-evaluated.
    pub fn set_style(&mut self, cell_ref: CellRef, patch: &CellStyle) -> Result<()> {
        self.check_bounds(&cell_ref)?;
        let cell = self.cells.remove(&cell_ref).unwrap_or_else(Cell::new_empty);
        self.cells.insert(cell_ref, cell.with_style(patch));
        self.modified = true;
        Ok(())
    }

    /// Copy a cell to another position.
    ///
    /// Formulas have their relative references moved by the distance between
    /// the two cells; `$`-anchored axes stay. The source style comes along.
    pub fn copy_cell(&mut self, from: CellRef, to: CellRef) -> Result<CellMap> {
        self.check_bounds(&from)?;
        let source = self.cells.get(&from).cloned().unwrap_or_else(Cell::new_empty);
        let input = match &source.formula {
            Some(formula) => {
                let delta_col = to.col as isize - from.col as isize;
                let delta_row = to.row as isize - from.row as isize;
                offset_formula_references(formula, delta_col, delta_row)
            }
            None => source.value_str().to_string(),
        };

        let mut updates = self.set_cell_from_input(to, &input)?;
        if let Some(style) = &source.style {
            self.set_style(to, style)?;
            if let Some(cell) = self.cells.get(&to) {
                updates.insert(to, cell.clone());
            }
        }
        Ok(updates)
    }

    /// Evaluate a formula against the document without storing it.
    pub fn evaluate(&self, formula: &str) -> String {
        evaluate_formula(formula, &self.cells)
    }

    /// Re-evaluate every formula cell in dependency order.
    /// Returns the number of formulas evaluated.
    pub fn recalculate_all(&mut self) -> Result<usize> {
        let updates = recalculate_all(&self.cells)?;
        let count = updates.len();
        self.cells.extend(updates);
        Ok(count)
    }

    /// Grow the grid by one row of empty cells.
    pub fn add_row(&mut self) -> Result<()> {
        check_grid_size(self.row_count + 1, self.col_count)?;
        self.row_count += 1;
        self.fill_empty();
        self.modified = true;
        Ok(())
    }

    /// Grow the grid by one column of empty cells.
    pub fn add_column(&mut self) -> Result<()> {
        check_grid_size(self.row_count, self.col_count + 1)?;
        self.col_count += 1;
        self.fill_empty();
        self.modified = true;
        Ok(())
    }

    /// Cells that hold a formula or a non-empty value, in row-major order.
    pub fn populated_cells(&self) -> impl Iterator<Item = (&CellRef, &Cell)> {
        self.cells
            .iter()
            .filter(|(_, cell)| cell.is_formula() || !cell.value_str().is_empty())
    }
}

fn parse_address(address: &str) -> Result<CellRef> {
    address_to_position(address).map_err(|_| SheetError::InvalidAddress(address.to_string()))
}
