//! Document state and logic (UI-agnostic).

mod io;
mod ops;
mod state;

pub use state::{
    DEFAULT_COLS, DEFAULT_NAME, DEFAULT_ROWS, Document, MAX_GRID_CELLS, check_grid_size,
};
