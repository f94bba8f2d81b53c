//! Chart spec encoding and data preparation for chart cells.
//!
//! This module provides:
//! - [`ChartSpec`]: Specification for a chart (type and source range)
//! - [`ChartData`]: Prepared rows for rendering (frontend-agnostic)
//! - Encoding/decoding of chart specs to/from cell display strings
//!
//! The engine returns a tagged string for chart formulas
//! (e.g. `=CHART("line","A1:A10")` → `__CHART__line__A1:A10`).
//! Frontends detect the prefix and draw the chart themselves.

use crate::engine::{CellRef, RangeRef};

pub const CHART_PREFIX: &str = "__CHART__";
const SEPARATOR: &str = "__";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
}

impl ChartKind {
    pub fn as_tag(self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
        }
    }

    /// Exact, lower-case tags only.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "line" => Some(ChartKind::Line),
            "bar" => Some(ChartKind::Bar),
            "pie" => Some(ChartKind::Pie),
            _ => None,
        }
    }
}

/// Specification for a chart (parsed from a chart cell).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub range: RangeRef,
}

/// Encode a chart as the display string of its cell. The range is written
/// as the formula gave it.
pub fn format_chart_spec(kind: ChartKind, range: &str) -> String {
    format!("{}{}{}{}", CHART_PREFIX, kind.as_tag(), SEPARATOR, range)
}

/// Decode a cell display string. None if it is not a chart cell.
pub fn parse_chart_spec(display: &str) -> Option<ChartSpec> {
    let rest = display.strip_prefix(CHART_PREFIX)?;
    let (kind, range) = rest.split_once(SEPARATOR)?;
    Some(ChartSpec {
        kind: ChartKind::from_tag(kind)?,
        range: RangeRef::parse(range).ok()?,
    })
}

/// One row of the source range: a label and one value per column (series).
#[derive(Clone, Debug, PartialEq)]
pub struct ChartRow {
    pub label: String,
    pub values: Vec<f64>,
}

/// Prepared data for rendering a chart (frontend-agnostic).
///
/// Rows of the range become data points, columns become series. Cells that
/// are empty or non-numeric plot as 0 and are counted in `skipped`.
#[derive(Clone, Debug)]
pub struct ChartData {
    pub spec: ChartSpec,
    pub rows: Vec<ChartRow>,
    pub skipped: usize,
}

impl ChartData {
    /// The `cell_value` closure returns the numeric value at a position, or
    /// `None` if the cell is empty or non-numeric.
    pub fn from_spec<F>(spec: &ChartSpec, mut cell_value: F) -> Self
    where
        F: FnMut(&CellRef) -> Option<f64>,
    {
        let range = spec.range.normalized();
        let mut skipped = 0;
        let rows = (range.start.row..=range.end.row)
            .map(|row| {
                let values = (range.start.col..=range.end.col)
                    .map(|col| {
                        cell_value(&CellRef::new(col, row)).unwrap_or_else(|| {
                            skipped += 1;
                            0.0
                        })
                    })
                    .collect();
                ChartRow {
                    label: format!("Row {}", row + 1),
                    values,
                }
            })
            .collect();

        ChartData {
            spec: spec.clone(),
            rows,
            skipped,
        }
    }

    pub fn series_count(&self) -> usize {
        self.spec.range.end.col.abs_diff(self.spec.range.start.col) + 1
    }
}
