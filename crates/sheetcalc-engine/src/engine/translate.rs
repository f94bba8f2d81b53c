//! Reference translation for copied formulas.
//!
//! Copying `=SUM(A1:A3)` from `B1` to `C2` should give `=SUM(B2:B4)`, while
//! `$`-anchored axes stay put. Text inside string literals is never touched,
//! so `=FIND_AND_REPLACE(A1,"B2","x")` only moves `A1`.

use regex::Regex;
use std::sync::OnceLock;

use super::cell_ref::Reference;
use super::error::REF_SENTINEL;

fn address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$?[A-Z]+\$?[0-9]+").expect("address regex must compile")
    })
}

/// Offset every cell reference in a formula by a column/row delta.
///
/// - `A1` offset by (+1, +2) becomes `B3`
/// - `$A1` offset by (+1, +2) becomes `$A3`
/// - range endpoints are moved independently: `A1:B2` -> `B3:C4`
/// - references that move off the grid become `#REF!`
pub fn offset_formula_references(formula: &str, delta_col: isize, delta_row: isize) -> String {
    if delta_col == 0 && delta_row == 0 {
        return formula.to_string();
    }

    let bytes = formula.as_bytes();
    let mut out = String::with_capacity(formula.len());
    let mut seg_start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                out.push_str(&formula[seg_start..=i]);
                in_string = false;
                seg_start = i + 1;
            }
        } else if b == b'"' {
            out.push_str(&offset_segment(&formula[seg_start..i], delta_col, delta_row));
            in_string = true;
            seg_start = i;
        }
    }

    // An unterminated literal is copied through as-is.
    let tail = &formula[seg_start..];
    if in_string {
        out.push_str(tail);
    } else {
        out.push_str(&offset_segment(tail, delta_col, delta_row));
    }
    out
}

fn offset_segment(segment: &str, delta_col: isize, delta_row: isize) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut last = 0;
    for m in address_re().find_iter(segment) {
        if !is_standalone(segment, m.start(), m.end()) {
            continue;
        }
        out.push_str(&segment[last..m.start()]);
        match Reference::parse(m.as_str()) {
            Ok(reference) => match reference.offset(delta_col, delta_row) {
                Some(moved) => out.push_str(&moved.to_string()),
                None => out.push_str(REF_SENTINEL),
            },
            Err(_) => out.push_str(m.as_str()),
        }
        last = m.end();
    }
    out.push_str(&segment[last..]);
    out
}

// The regex crate has no lookaround, so word boundaries are checked by hand.
fn is_standalone(segment: &str, start: usize, end: usize) -> bool {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$';
    let before = segment[..start].chars().next_back();
    let after = segment[end..].chars().next();
    !before.is_some_and(is_word) && !after.is_some_and(is_word)
}
