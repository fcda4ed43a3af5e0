use std::fmt;

use thiserror::Error;

use super::state::Tile;

/// Errors raised by the move engine. All of them are caller bugs or
/// corrupted boards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid grid shape: {0}")]
    InvalidGridShape(ShapeProblem),
    /// A cell holds something other than a power of two >= 2.
    #[error("invalid tile {value} at row {row}, column {col}")]
    InvalidTile { row: usize, col: usize, value: Tile },
    /// Merging two `value` tiles does not fit in a `Tile`.
    #[error("merging two {value} tiles overflows the tile range")]
    TileOverflow { value: Tile },
}

/// Why a grid failed rectangularity validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeProblem {
    /// Zero rows, so the column count cannot be determined.
    NoRows,
    /// Rows exist but hold no cells.
    NoColumns,
    /// Row `row` has `found` cells where the first row has `expected`.
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for ShapeProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeProblem::NoRows => write!(f, "grid has no rows"),
            ShapeProblem::NoColumns => write!(f, "grid rows have no cells"),
            ShapeProblem::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {row} has {found} cells, expected {expected} like the first row"
            ),
        }
    }
}
