//! Cell data structures for the spreadsheet grid.
//!
//! This module provides the core data types for representing cells:
//! - [`Cell`] - Display value, optional formula source and optional style
//! - [`CellStyle`] - Display metadata carried through edits untouched
//! - [`CellMap`] - Sparse storage keyed by position

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::cell_ref::CellRef;

/// Horizontal alignment of a cell's text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Display metadata. The engine never reads it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
}

impl CellStyle {
    /// Overlay the fields set in `patch`.
    pub fn merge(&mut self, patch: &CellStyle) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if patch.$field.is_some() {
                    self.$field = patch.$field.clone();
                })*
            };
        }
        take!(
            bold,
            italic,
            font_size,
            color,
            font_weight,
            font_style,
            text_decoration,
            text_align
        );
    }
}

/// A cell in the spreadsheet grid.
///
/// When `formula` is set, `value` caches its last evaluation (or an error
/// sentinel); the formula is the source of truth.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
}

impl Cell {
    /// An initialized but unused grid cell.
    pub fn new_empty() -> Cell {
        Cell {
            value: Some(String::new()),
            formula: None,
            style: None,
        }
    }

    pub fn new_text(text: &str) -> Cell {
        Cell {
            value: Some(text.to_string()),
            formula: None,
            style: None,
        }
    }

    pub fn new_formula(formula: &str, value: String) -> Cell {
        Cell {
            value: Some(value),
            formula: Some(formula.to_string()),
            style: None,
        }
    }

    pub fn is_formula(&self) -> bool {
        self.formula.is_some()
    }

    /// Display value, `""` when absent.
    pub fn value_str(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    /// What an editor shows for this cell: the formula if any, else the value.
    pub fn to_input_string(&self) -> String {
        self.formula
            .clone()
            .or_else(|| self.value.clone())
            .unwrap_or_default()
    }

    /// Return the cell with `patch` merged onto its style.
    pub fn with_style(mut self, patch: &CellStyle) -> Cell {
        self.style.get_or_insert_with(CellStyle::default).merge(patch);
        self
    }
}

/// Sparse cell storage.
pub type CellMap = BTreeMap<CellRef, Cell>;
