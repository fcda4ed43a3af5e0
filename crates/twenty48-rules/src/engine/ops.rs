use log::trace;
use rand::Rng;

use super::error::EngineError;
use super::rotation::rotate;
use super::state::{Cell, Direction, Grid, MoveResult, Tile};

/// Result of sliding one row to the left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCollapse {
    pub row: Vec<Cell>,
    pub moved: bool,
    /// Sum of `merges`.
    pub score: u64,
    /// Value of each tile created by a merge, left to right.
    pub merges: Vec<Tile>,
}

/// True if the grid has at least one row and every row matches the first
/// row's (non-zero) length. Tile values are checked separately by
/// [`Grid::check_tiles`].
pub fn validate(grid: &Grid) -> bool {
    grid.shape().is_ok()
}

/// Slide/merge tiles in `direction`. No randomness.
///
/// The grid is rotated so `direction` becomes "left", every row is
/// collapsed, and the result is rotated back. The shape and the tile values
/// are checked before any work is done.
pub fn move_grid(grid: &Grid, direction: Direction) -> Result<MoveResult, EngineError> {
    grid.shape()?;
    grid.check_tiles()?;
    let rotated = rotate(grid, direction.forward_rotation())?;
    let collapsed = move_left(&rotated)?;
    let restored = rotate(&collapsed.grid, direction.inverse_rotation())?.into_owned();
    trace!(
        "move {direction}: moved={} score={}",
        collapsed.moved,
        collapsed.score_gained
    );
    Ok(MoveResult {
        grid: restored,
        moved: collapsed.moved,
        score_gained: collapsed.score_gained,
    })
}

/// Collapse every row of `grid` leftward. Rows never interact.
pub fn move_left(grid: &Grid) -> Result<MoveResult, EngineError> {
    let collapsed = grid
        .rows()
        .iter()
        .map(|row| collapse_row(row))
        .collect::<Result<Vec<RowCollapse>, EngineError>>()?;
    let moved = collapsed.iter().any(|c| c.moved);
    let score_gained = collapsed.iter().map(|c| c.score).sum();
    Ok(MoveResult {
        grid: Grid::from_rows(collapsed.into_iter().map(|c| c.row).collect()),
        moved,
        score_gained,
    })
}

/// Slide and merge a single row leftward.
///
/// Scans left to right holding at most one pending tile. An equal tile
/// merges with it and the pending slot is cleared, so a merged tile never
/// merges again in the same pass: `[2, 2, 2, 2]` becomes `[4, 4, _, _]`.
///
/// Fails with `TileOverflow` if a merged tile would not fit in a `Tile`.
pub fn collapse_row(row: &[Cell]) -> Result<RowCollapse, EngineError> {
    let mut out: Vec<Cell> = Vec::with_capacity(row.len());
    let mut merges: Vec<Tile> = Vec::new();
    let mut pending: Option<Tile> = None;

    for &value in row.iter().flatten() {
        match pending {
            None => pending = Some(value),
            Some(p) if p == value => {
                let merged = p
                    .checked_mul(2)
                    .ok_or(EngineError::TileOverflow { value: p })?;
                out.push(Some(merged));
                merges.push(merged);
                pending = None;
            }
            Some(p) => {
                out.push(Some(p));
                pending = Some(value);
            }
        }
    }
    if pending.is_some() {
        out.push(pending);
    }
    out.resize(row.len(), None);

    let moved = out.as_slice() != row;
    let score = merges.iter().copied().map(u64::from).sum();
    Ok(RowCollapse {
        row: out,
        moved,
        score,
        merges,
    })
}

/// True if moving in `direction` would change the grid.
pub fn can_move(grid: &Grid, direction: Direction) -> Result<bool, EngineError> {
    Ok(move_grid(grid, direction)?.moved)
}

/// True if no move in any direction changes the grid.
pub fn is_game_over(grid: &Grid) -> Result<bool, EngineError> {
    for direction in Direction::ALL {
        if can_move(grid, direction)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Put a random 2 (90%) or 4 (10%) tile in a uniformly chosen empty cell.
///
/// A grid with no empty cell comes back unchanged.
pub fn insert_random_tile<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Grid {
    let mut out = grid.clone();
    let empty = grid.empty_cells();
    if empty.is_empty() {
        return out;
    }
    let (row, col) = empty[rng.gen_range(0..empty.len())];
    out.set(row, col, Some(generate_random_tile(rng)));
    out
}

/// Like `insert_random_tile` but uses thread-local RNG.
pub fn insert_random_tile_thread(grid: &Grid) -> Grid {
    let mut rng = rand::thread_rng();
    insert_random_tile(grid, &mut rng)
}

pub(crate) fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..10) < 9 {
        2
    } else {
        4
    }
}
