//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style addresses
//! (e.g., "A1", "$B$2", "AA100") and zero-indexed column/row coordinates,
//! plus the `$` absolute markers carried alongside an address.
//!
//! # Examples
//!
//! ```
//! use sheetcalc_engine::engine::{CellRef, Reference};
//!
//! let cell = CellRef::from_str("B3").unwrap();
//! assert_eq!(cell.col, 1); // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//!
//! let abs = Reference::parse("$B3").unwrap();
//! assert!(abs.absolute.col && !abs.absolute.row);
//! ```

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

use super::error::EvalError;

/// A reference to a cell by column and row indices (0-indexed).
///
/// Ordering is row-major, so a `BTreeMap<CellRef, _>` iterates the grid the
/// way it is read.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a cell reference from spreadsheet notation (e.g., "A1", "B2", "AA10").
    /// `$` markers are not accepted here; see [`address_to_position`].
    /// Returns None if the input is invalid.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(name: &str) -> Option<CellRef> {
        Self::parse_a1(name)
    }

    fn parse_a1(name: &str) -> Option<CellRef> {
        let caps = a1_re().captures(name)?;
        let col = Self::letters_to_col(&caps["letters"])?;
        let row = caps["numbers"].parse::<usize>().ok()?.checked_sub(1)?;
        Some(CellRef::new(col, row))
    }

    /// Convert column letters to an index (A -> 0, Z -> 25, AA -> 26).
    pub fn letters_to_col(letters: &str) -> Option<usize> {
        if letters.is_empty() {
            return None;
        }
        let mut acc = 0usize;
        for c in letters.bytes() {
            if !c.is_ascii_uppercase() {
                return None;
            }
            let digit = (c - b'A') as usize + 1;
            acc = acc.checked_mul(26)?.checked_add(digit)?;
        }
        acc.checked_sub(1)
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }

    /// Move by a column/row delta. None when the result falls off the grid.
    pub fn offset(&self, delta_col: isize, delta_row: isize) -> Option<CellRef> {
        Some(CellRef::new(
            self.col.checked_add_signed(delta_col)?,
            self.row.checked_add_signed(delta_row)?,
        ))
    }
}

fn a1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Z]+)(?<numbers>[0-9]+)$")
            .expect("cell reference regex must compile")
    })
}

impl std::str::FromStr for CellRef {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_a1(s).ok_or_else(|| EvalError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row + 1)
    }
}

// Serialized as the plain address so a `CellMap` round-trips as a JSON
// object keyed by "A1", "B2", ...
impl Serialize for CellRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        address_to_position(&s).map_err(serde::de::Error::custom)
    }
}

/// Which axes of an address are pinned with `$`.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct AbsoluteFlags {
    pub row: bool,
    pub col: bool,
}

impl AbsoluteFlags {
    pub const RELATIVE: AbsoluteFlags = AbsoluteFlags {
        row: false,
        col: false,
    };

    /// An axis is absolute if it is absolute in either set of flags.
    pub fn either(self, other: AbsoluteFlags) -> AbsoluteFlags {
        AbsoluteFlags {
            row: self.row || other.row,
            col: self.col || other.col,
        }
    }
}

/// Format a position as an address, inserting `$` per axis.
pub fn position_to_address(pos: &CellRef, absolute: AbsoluteFlags) -> String {
    format!(
        "{}{}{}{}",
        if absolute.col { "$" } else { "" },
        CellRef::col_to_letters(pos.col),
        if absolute.row { "$" } else { "" },
        pos.row + 1
    )
}

/// Parse an address, ignoring any `$` markers.
pub fn address_to_position(address: &str) -> Result<CellRef, EvalError> {
    let clean: String = address.trim().chars().filter(|c| *c != '$').collect();
    CellRef::from_str(&clean).ok_or_else(|| EvalError::InvalidAddress(address.to_string()))
}

/// Column is absolute when the address starts with `$`; row is absolute when
/// any later `$` appears.
pub fn is_absolute_reference(address: &str) -> AbsoluteFlags {
    AbsoluteFlags {
        col: address.starts_with('$'),
        row: address.chars().skip(1).any(|c| c == '$'),
    }
}

/// A cell address together with its absolute markers.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub cell: CellRef,
    pub absolute: AbsoluteFlags,
}

impl Reference {
    pub fn new(cell: CellRef, absolute: AbsoluteFlags) -> Reference {
        Reference { cell, absolute }
    }

    pub fn relative(cell: CellRef) -> Reference {
        Reference::new(cell, AbsoluteFlags::RELATIVE)
    }

    pub fn parse(address: &str) -> Result<Reference, EvalError> {
        let address = address.trim();
        Ok(Reference {
            cell: address_to_position(address)?,
            absolute: is_absolute_reference(address),
        })
    }

    /// Shift the relative axes by a copy offset; `$`-pinned axes stay put.
    pub fn offset(&self, delta_col: isize, delta_row: isize) -> Option<Reference> {
        let delta_col = if self.absolute.col { 0 } else { delta_col };
        let delta_row = if self.absolute.row { 0 } else { delta_row };
        Some(Reference::new(
            self.cell.offset(delta_col, delta_row)?,
            self.absolute,
        ))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&position_to_address(&self.cell, self.absolute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_parse_a1_overflow_returns_none() {
        let huge = format!("{}1", "Z".repeat(40));
        assert!(CellRef::from_str(&huge).is_none());
    }

    #[test]
    fn test_col_to_letters_handles_max_usize() {
        let letters = CellRef::col_to_letters(usize::MAX);
        assert!(!letters.is_empty());
        assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_address_to_position_strips_dollars() {
        assert_eq!(address_to_position("$B$2").unwrap(), CellRef::new(1, 1));
        assert_eq!(address_to_position("A$10").unwrap(), CellRef::new(0, 9));
        assert_eq!(address_to_position("$AA1").unwrap(), CellRef::new(26, 0));
    }

    #[test]
    fn test_address_to_position_rejects_malformed() {
        for bad in ["", "$", "12", "AB", "a1", "A0", "1A", "A-1", "Ä1"] {
            assert_eq!(
                address_to_position(bad),
                Err(EvalError::InvalidAddress(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_is_absolute_reference() {
        assert_eq!(is_absolute_reference("A1"), AbsoluteFlags::RELATIVE);
        assert_eq!(
            is_absolute_reference("$A1"),
            AbsoluteFlags {
                row: false,
                col: true
            }
        );
        assert_eq!(
            is_absolute_reference("A$1"),
            AbsoluteFlags {
                row: true,
                col: false
            }
        );
        assert_eq!(
            is_absolute_reference("$A$1"),
            AbsoluteFlags {
                row: true,
                col: true
            }
        );
    }

    #[test]
    fn test_position_to_address_with_flags() {
        let pos = CellRef::new(2, 4);
        assert_eq!(position_to_address(&pos, AbsoluteFlags::RELATIVE), "C5");
        assert_eq!(
            position_to_address(
                &pos,
                AbsoluteFlags {
                    row: true,
                    col: false
                }
            ),
            "C$5"
        );
        assert_eq!(
            position_to_address(
                &pos,
                AbsoluteFlags {
                    row: true,
                    col: true
                }
            ),
            "$C$5"
        );
    }

    #[test]
    fn test_reference_offset_keeps_pinned_axes() {
        let r = Reference::parse("$B2").unwrap();
        assert_eq!(r.offset(3, 1).unwrap().to_string(), "$B3");
        let r = Reference::parse("B$2").unwrap();
        assert_eq!(r.offset(1, 5).unwrap().to_string(), "C$2");
        assert!(Reference::parse("A1").unwrap().offset(-1, 0).is_none());
    }

    #[test]
    fn test_cell_ref_serializes_as_address() {
        let json = serde_json::to_string(&CellRef::new(27, 4)).unwrap();
        assert_eq!(json, "\"AB5\"");
        let back: CellRef = serde_json::from_str("\"$AB$5\"").unwrap();
        assert_eq!(back, CellRef::new(27, 4));
    }

    proptest! {
        #[test]
        fn position_round_trips(col in 0usize..20_000, row in 0usize..1_000_000) {
            let pos = CellRef::new(col, row);
            let addr = position_to_address(&pos, AbsoluteFlags::RELATIVE);
            prop_assert_eq!(address_to_position(&addr).unwrap(), pos);
        }

        #[test]
        fn absolute_flags_round_trip(
            col in 0usize..1_000,
            row in 0usize..1_000,
            abs_row in any::<bool>(),
            abs_col in any::<bool>(),
        ) {
            let flags = AbsoluteFlags { row: abs_row, col: abs_col };
            let addr = position_to_address(&CellRef::new(col, row), flags);
            prop_assert_eq!(is_absolute_reference(&addr), flags);
            prop_assert_eq!(address_to_position(&addr).unwrap(), CellRef::new(col, row));
        }
    }
}
