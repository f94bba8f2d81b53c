//! Circular dependency detection for formula cells.
//!
//! An edit is checked before it is applied: if following the ranges read by
//! the new formula leads back to a cell already on the path, the edit would
//! make the sheet impossible to evaluate.

use std::collections::HashSet;

use super::cell_ref::CellRef;
use super::deps::DependencyGraph;

/// Walk the formulas read by `start`, depth first.
/// Returns the offending path (ending at the repeated cell) if a cycle is found.
pub fn detect_cycle(start: &CellRef, graph: &DependencyGraph) -> Option<Vec<CellRef>> {
    if !graph.is_formula(start) {
        return None;
    }
    let mut visiting = HashSet::from([*start]);
    let mut cleared = HashSet::new();
    let mut stack = vec![(*start, graph.precedents_of(start).into_iter())];

    while let Some((current, precedents)) = stack.last_mut() {
        let Some(prec) = precedents.next() else {
            let current = *current;
            stack.pop();
            visiting.remove(&current);
            cleared.insert(current);
            continue;
        };
        if visiting.contains(&prec) {
            let mut path: Vec<CellRef> = stack.iter().map(|(c, _)| *c).collect();
            path.push(prec);
            return Some(path);
        }
        if cleared.contains(&prec) || !graph.is_formula(&prec) {
            continue;
        }
        visiting.insert(prec);
        stack.push((prec, graph.precedents_of(&prec).into_iter()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Cell, CellMap};
    use pretty_assertions::assert_eq;

    fn graph(formulas: &[(&str, &str)]) -> DependencyGraph {
        let mut cells = CellMap::new();
        for (addr, formula) in formulas {
            cells.insert(
                CellRef::from_str(addr).unwrap(),
                Cell::new_formula(formula, String::new()),
            );
        }
        DependencyGraph::build(&cells)
    }

    fn at(addr: &str) -> CellRef {
        CellRef::from_str(addr).unwrap()
    }

    #[test]
    fn test_no_cycle_in_chain() {
        let g = graph(&[("A1", "=SUM(B1)"), ("B1", "=SUM(C1)")]);
        assert_eq!(detect_cycle(&at("A1"), &g), None);
    }

    #[test]
    fn test_three_cell_cycle_reports_path() {
        let g = graph(&[
            ("A1", "=SUM(B1)"),
            ("B1", "=SUM(C1)"),
            ("C1", "=SUM(A1)"),
        ]);
        assert_eq!(
            detect_cycle(&at("A1"), &g),
            Some(vec![at("A1"), at("B1"), at("C1"), at("A1")])
        );
    }

    #[test]
    fn test_self_reference_through_range() {
        let g = graph(&[("B2", "=SUM(A1:C3)")]);
        assert_eq!(detect_cycle(&at("B2"), &g), Some(vec![at("B2"), at("B2")]));
    }

    #[test]
    fn test_shared_precedent_is_not_a_cycle() {
        let g = graph(&[
            ("A1", "=SUM(B1, C1)"),
            ("B1", "=SUM(D1)"),
            ("C1", "=SUM(D1)"),
            ("D1", "=COUNT(E1:E5)"),
        ]);
        assert_eq!(detect_cycle(&at("A1"), &g), None);
    }

    #[test]
    fn test_literal_cells_end_the_walk() {
        let g = graph(&[("A1", "=SUM(B1)")]);
        assert_eq!(detect_cycle(&at("B1"), &g), None);
    }

    #[test]
    fn test_deep_chain_without_cycle() {
        let formulas: Vec<(String, String)> = (2..=100_000)
            .map(|row| (format!("A{row}"), format!("=SUM(A{})", row - 1)))
            .collect();
        let borrowed: Vec<(&str, &str)> = formulas
            .iter()
            .map(|(a, f)| (a.as_str(), f.as_str()))
            .collect();
        let g = graph(&borrowed);
        assert_eq!(detect_cycle(&at("A100000"), &g), None);
    }
}
