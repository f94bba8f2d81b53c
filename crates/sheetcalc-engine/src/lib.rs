//! sheetcalc_engine - formula parsing, evaluation and dependency tracking.

pub mod builtins;
pub mod chart;
pub mod engine;
