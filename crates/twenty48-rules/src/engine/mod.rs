//! Engine module: rectangular 2048 grids, the rotate and collapse
//! primitives, and the directional move built from them.
//!
//! - `Grid` is the row-major board with useful methods.
//! - Free functions mirror the methods when convenient (e.g., `move_grid`).
//! - Every direction is reduced to "slide left" by rotating the grid first
//!   and rotating the collapsed result back.

mod error;
mod ops;
pub mod rotation;
pub mod state;

pub use error::{EngineError, ShapeProblem};
pub use rotation::{rotate, Rotation};
pub use state::{Cell, Direction, Grid, MoveResult, Tile};

pub use ops::{
    can_move, collapse_row, insert_random_tile, insert_random_tile_thread, is_game_over,
    move_grid, move_left, validate, RowCollapse,
};
