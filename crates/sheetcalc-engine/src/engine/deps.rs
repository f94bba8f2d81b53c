//! Dependency extraction and recalculation.
//!
//! Each formula cell records the ranges its formula reads (the range
//! arguments of its function; literal arguments never count). An edit to a
//! cell re-evaluates exactly the formulas whose ranges contain it, so editing
//! `A1` leaves a formula over `A10` alone.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::cell::{Cell, CellMap};
use super::cell_ref::CellRef;
use super::cycle::detect_cycle;
use super::error::EngineError;
use super::eval::evaluate_formula;
use super::parser::parse_formula;
use super::range::RangeRef;
use crate::builtins;

/// Ranges up to this size are expanded into the reverse index; larger ones
/// are kept as rectangles and checked by containment.
const MAX_INDEXED_RANGE_CELLS: usize = 4_096;

/// Extract the ranges a formula reads.
pub fn extract_dependencies(formula: &str) -> Vec<RangeRef> {
    let Ok(parsed) = parse_formula(formula) else {
        return Vec::new();
    };
    let Some(builtin) = builtins::lookup(&parsed.name) else {
        return Vec::new();
    };
    let (ranges, _) = builtin.args.split(&parsed.args);
    ranges
        .iter()
        .filter_map(|r| RangeRef::parse(r).ok())
        .collect()
}

/// How far an edit propagates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecalcMode {
    /// Only formulas that read the edited cell directly, evaluated against
    /// the pre-edit values of everything else.
    Direct,
    /// Every formula that depends on the edited cell, in dependency order.
    #[default]
    Transitive,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Formula cells, the ranges they read, and the reverse index.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    precedents: BTreeMap<CellRef, Vec<RangeRef>>,
    dependents: HashMap<CellRef, BTreeSet<CellRef>>,
    wide: Vec<(RangeRef, CellRef)>,
}

impl DependencyGraph {
    pub fn build(cells: &CellMap) -> Self {
        let mut graph = DependencyGraph::default();
        for (cell_ref, cell) in cells {
            if let Some(formula) = &cell.formula {
                graph.insert(*cell_ref, formula);
            }
        }
        graph
    }

    /// Record (or replace) the formula held by `cell`.
    pub fn insert(&mut self, cell: CellRef, formula: &str) {
        self.remove(&cell);
        let ranges = extract_dependencies(formula);
        for range in &ranges {
            if is_indexed(range) {
                for referenced in range.cells() {
                    self.dependents.entry(referenced).or_default().insert(cell);
                }
            } else {
                self.wide.push((*range, cell));
            }
        }
        self.precedents.insert(cell, ranges);
    }

    /// Forget the formula held by `cell`, if any.
    pub fn remove(&mut self, cell: &CellRef) {
        let Some(ranges) = self.precedents.remove(cell) else {
            return;
        };
        for range in ranges.iter().filter(|r| is_indexed(r)) {
            for referenced in range.cells() {
                if let Some(set) = self.dependents.get_mut(&referenced) {
                    set.remove(cell);
                    if set.is_empty() {
                        self.dependents.remove(&referenced);
                    }
                }
            }
        }
        self.wide.retain(|(_, owner)| owner != cell);
    }

    pub fn is_formula(&self, cell: &CellRef) -> bool {
        self.precedents.contains_key(cell)
    }

    /// Ranges read by the formula in `cell`.
    pub fn ranges_of(&self, cell: &CellRef) -> &[RangeRef] {
        self.precedents.get(cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Formula cells that read `cell` directly.
    pub fn dependents_of(&self, cell: &CellRef) -> Vec<CellRef> {
        let mut out = self.dependents.get(cell).cloned().unwrap_or_default();
        for (range, owner) in &self.wide {
            if range.contains(cell) {
                out.insert(*owner);
            }
        }
        out.into_iter().collect()
    }

    /// Formula cells read directly by the formula in `cell`.
    pub fn precedents_of(&self, cell: &CellRef) -> Vec<CellRef> {
        let mut out = BTreeSet::new();
        for range in self.ranges_of(cell).iter().map(|r| r.normalized()) {
            // Keys are row-major, so this band covers every row of the range.
            out.extend(
                self.precedents
                    .range(range.start..=range.end)
                    .map(|(c, _)| *c)
                    .filter(|c| range.contains(c)),
            );
        }
        out.into_iter().collect()
    }

    /// Every formula that depends on `cell`, directly or not, ordered so
    /// that each appears after the formulas it reads.
    pub fn affected_by(&self, cell: &CellRef) -> Result<Vec<CellRef>, EngineError> {
        let mut marks: HashMap<CellRef, Mark> = HashMap::new();
        let mut order = Vec::new();
        walk(*cell, &mut marks, &mut order, |c| self.dependents_of(c))?;
        // The edited cell finishes last; it is not one of its own dependents.
        order.pop();
        order.reverse();
        Ok(order)
    }

    /// All formula cells, each after the formulas it reads.
    pub fn evaluation_order(&self) -> Result<Vec<CellRef>, EngineError> {
        let mut marks: HashMap<CellRef, Mark> = HashMap::new();
        let mut order = Vec::new();
        for cell in self.precedents.keys() {
            if marks.contains_key(cell) {
                continue;
            }
            walk(*cell, &mut marks, &mut order, |c| self.precedents_of(c))?;
        }
        Ok(order)
    }
}

/// Depth-first post-order walk from `root` along `edges`, appending each
/// finished cell to `order`. The path on the stack is reported when an edge
/// leads back into it.
fn walk<F>(
    root: CellRef,
    marks: &mut HashMap<CellRef, Mark>,
    order: &mut Vec<CellRef>,
    edges: F,
) -> Result<(), EngineError>
where
    F: Fn(&CellRef) -> Vec<CellRef>,
{
    marks.insert(root, Mark::Visiting);
    let mut stack = vec![(root, edges(&root).into_iter())];
    while let Some((current, next)) = stack.last_mut() {
        let Some(child) = next.next() else {
            let finished = *current;
            stack.pop();
            marks.insert(finished, Mark::Done);
            order.push(finished);
            continue;
        };
        match marks.get(&child) {
            Some(Mark::Done) => {}
            Some(Mark::Visiting) => {
                let mut path: Vec<CellRef> = stack.iter().map(|(c, _)| *c).collect();
                path.push(child);
                return Err(EngineError::CircularReference(path));
            }
            None => {
                marks.insert(child, Mark::Visiting);
                stack.push((child, edges(&child).into_iter()));
            }
        }
    }
    Ok(())
}

fn is_indexed(range: &RangeRef) -> bool {
    range
        .cell_count()
        .is_some_and(|n| n <= MAX_INDEXED_RANGE_CELLS)
}

fn reevaluate(cells: &CellMap, target: &CellRef) -> Option<Cell> {
    let cell = cells.get(target)?;
    let formula = cell.formula.as_deref()?;
    Some(Cell {
        value: Some(evaluate_formula(formula, cells)),
        ..cell.clone()
    })
}

/// Apply `input` to `edited` and re-evaluate the formulas that depend on it.
///
/// Returns only the changed cells: the edited cell plus every re-evaluated
/// dependent. Input starting with `=` is stored as a formula; anything else
/// is a literal value. The edited cell keeps its style. An edit that would
/// close a dependency cycle is rejected and nothing changes.
pub fn recalculate(
    cells: &CellMap,
    edited: CellRef,
    input: &str,
    mode: RecalcMode,
) -> Result<CellMap, EngineError> {
    let mut graph = DependencyGraph::build(cells);
    if input.starts_with('=') {
        graph.insert(edited, input);
    } else {
        graph.remove(&edited);
    }
    if let Some(path) = detect_cycle(&edited, &graph) {
        log::warn!("Rejected edit to {edited}: formula would create a cycle");
        return Err(EngineError::CircularReference(path));
    }

    let mut new_cell = if input.starts_with('=') {
        Cell::new_formula(input, evaluate_formula(input, cells))
    } else {
        Cell::new_text(input)
    };
    new_cell.style = cells.get(&edited).and_then(|c| c.style.clone());

    let mut working = cells.clone();
    working.insert(edited, new_cell.clone());
    let mut updates = CellMap::new();
    updates.insert(edited, new_cell);

    match mode {
        RecalcMode::Transitive => {
            for target in graph.affected_by(&edited)? {
                if let Some(updated) = reevaluate(&working, &target) {
                    working.insert(target, updated.clone());
                    updates.insert(target, updated);
                }
            }
        }
        RecalcMode::Direct => {
            for target in graph.dependents_of(&edited) {
                if let Some(updated) = reevaluate(&working, &target) {
                    updates.insert(target, updated);
                }
            }
        }
    }

    log::debug!(
        "Edit to {edited} updated {} cell(s) ({mode:?})",
        updates.len()
    );
    Ok(updates)
}

/// Re-evaluate every formula cell in dependency order.
/// Returns the re-evaluated cells.
pub fn recalculate_all(cells: &CellMap) -> Result<CellMap, EngineError> {
    let graph = DependencyGraph::build(cells);
    let mut working = cells.clone();
    let mut updates = CellMap::new();
    for target in graph.evaluation_order()? {
        if let Some(updated) = reevaluate(&working, &target) {
            working.insert(target, updated.clone());
            updates.insert(target, updated);
        }
    }
    log::trace!("Recalculated {} formula cell(s)", updates.len());
    Ok(updates)
}
