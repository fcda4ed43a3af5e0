use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{EngineError, ShapeProblem};
use super::ops;
use super::rotation::Rotation;

/// A tile value: 2, 4, 8, ... Never zero on a well-formed board.
pub type Tile = u32;

/// One board position. `None` is the empty sentinel, distinct from any tile.
pub type Cell = Option<Tile>;

/// A direction to slide/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in the order callers probe them for game over.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Counter-clockwise rotation that turns this direction into "left".
    pub fn forward_rotation(self) -> Rotation {
        match self {
            Direction::Left => Rotation::Deg0,
            Direction::Up => Rotation::Deg90,
            Direction::Right => Rotation::Deg180,
            Direction::Down => Rotation::Deg270,
        }
    }

    /// Rotation that restores the original orientation after collapsing.
    pub fn inverse_rotation(self) -> Rotation {
        match self {
            Direction::Left => Rotation::Deg0,
            Direction::Up => Rotation::Deg270,
            Direction::Right => Rotation::Deg180,
            Direction::Down => Rotation::Deg90,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// Row-major 2048 board of arbitrary rectangular size.
///
/// Construction never validates; the engine checks the shape before it
/// touches a grid, so a ragged grid surfaces as `EngineError::InvalidGridShape`
/// at the first move instead of being silently repaired.
///
/// Serializes as nested arrays with `null` for empty cells.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid(pub(crate) Vec<Vec<Cell>>);

impl Grid {
    /// Wrap caller-built rows as a grid.
    #[inline]
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Grid(rows)
    }

    /// A `rows` x `cols` grid with every cell empty.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Grid(vec![vec![None; cols]; rows])
    }

    /// Consume this `Grid`, returning its rows.
    #[inline]
    pub fn into_rows(self) -> Vec<Vec<Cell>> {
        self.0
    }

    /// Borrow the rows, top to bottom.
    #[inline]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.0
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.0.len()
    }

    /// Length of the first row, or 0 for a grid with no rows.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.0.first().map_or(0, Vec::len)
    }

    /// Check rectangularity and return `(rows, columns)`.
    ///
    /// Only the shape is checked here; see [`Grid::check_tiles`] for values.
    pub fn shape(&self) -> Result<(usize, usize), EngineError> {
        let first = self
            .0
            .first()
            .ok_or(EngineError::InvalidGridShape(ShapeProblem::NoRows))?;
        let expected = first.len();
        if expected == 0 {
            return Err(EngineError::InvalidGridShape(ShapeProblem::NoColumns));
        }
        if let Some((row, found)) = self
            .0
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != expected)
        {
            return Err(EngineError::InvalidGridShape(ShapeProblem::RaggedRow {
                row,
                expected,
                found,
            }));
        }
        Ok((self.0.len(), expected))
    }

    /// Check that every non-empty cell is a power of two of at least 2.
    ///
    /// Zero is never a tile; a `Some(0)` read from storage is corruption.
    pub fn check_tiles(&self) -> Result<(), EngineError> {
        for (row, cells) in self.0.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if let Some(value) = *cell {
                    if value < 2 || !value.is_power_of_two() {
                        return Err(EngineError::InvalidTile { row, col, value });
                    }
                }
            }
        }
        Ok(())
    }

    /// Cell at `(row, col)`, or `None` when out of bounds or empty.
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.0.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Overwrite the cell at `(row, col)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if let Some(slot) = self.0.get_mut(row).and_then(|r| r.get_mut(col)) {
            *slot = cell;
        }
    }

    /// Coordinates of every empty cell, row-major.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.0
            .iter()
            .enumerate()
            .flat_map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, cell)| cell.is_none())
                    .map(move |(j, _)| (i, j))
            })
            .collect()
    }

    /// Count the number of empty cells.
    pub fn count_empty(&self) -> usize {
        self.tiles().filter(Option::is_none).count()
    }

    /// Highest tile value present, or `None` on an empty board.
    pub fn highest_tile(&self) -> Option<Tile> {
        self.tiles().flatten().max()
    }

    /// True if any cell holds exactly `value`.
    pub fn contains_tile(&self, value: Tile) -> bool {
        self.tiles().any(|cell| cell == Some(value))
    }

    /// Sum of all tile values on the board.
    pub fn tile_sum(&self) -> u64 {
        self.tiles().flatten().map(u64::from).sum()
    }

    /// Iterate over cells in row-major order.
    #[inline]
    pub fn tiles(&self) -> impl Iterator<Item = Cell> + '_ {
        self.0.iter().flat_map(|row| row.iter().copied())
    }

    /// Slide/merge tiles in `dir` (no random insert).
    ///
    /// ```
    /// use twenty48_rules::engine::{Direction, Grid};
    /// let g = Grid::from_rows(vec![vec![Some(2), Some(2), None, None]]);
    /// let r = g.shift(Direction::Left).unwrap();
    /// assert_eq!(r.grid, Grid::from_rows(vec![vec![Some(4), None, None, None]]));
    /// assert!(r.moved);
    /// assert_eq!(r.score_gained, 4);
    /// ```
    #[inline]
    pub fn shift(&self, dir: Direction) -> Result<MoveResult, EngineError> {
        ops::move_grid(self, dir)
    }

    /// Return a copy with a random 2 (90%) or 4 (10%) tile in a random empty slot.
    ///
    /// Deterministic example using a seeded RNG:
    /// ```
    /// use twenty48_rules::engine::Grid;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let g = Grid::empty(4, 4).with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(g.count_empty(), 14);
    /// ```
    #[inline]
    pub fn with_random_tile<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        ops::insert_random_tile(self, rng)
    }

    /// Return true if no direction changes the board.
    ///
    /// ```
    /// use twenty48_rules::engine::Grid;
    /// // Nothing can slide on an empty board, so no move changes it.
    /// assert!(Grid::empty(4, 4).is_game_over().unwrap());
    /// ```
    #[inline]
    pub fn is_game_over(&self) -> Result<bool, EngineError> {
        ops::is_game_over(self)
    }
}

impl From<Vec<Vec<Cell>>> for Grid {
    fn from(rows: Vec<Vec<Cell>>) -> Self {
        Grid::from_rows(rows)
    }
}

impl From<Grid> for Vec<Vec<Cell>> {
    fn from(g: Grid) -> Self {
        g.into_rows()
    }
}

pub(crate) fn format_cell(cell: Cell) -> String {
    match cell {
        None => format!("{:^7}", "."),
        Some(v) => format!("{v:^7}"),
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.column_count() * 8;
        for (i, row) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f, "{}", "-".repeat(width.saturating_sub(1)))?;
            }
            let line: Vec<String> = row.iter().map(|&c| format_cell(c)).collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}

/// Outcome of one directional move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    pub grid: Grid,
    /// True iff some cell differs from the input grid.
    pub moved: bool,
    /// Sum of the tiles created by merges during this move.
    pub score_gained: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g(rows: &[&[u32]]) -> Grid {
        Grid::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|&v| (v != 0).then_some(v)).collect())
                .collect(),
        )
    }

    #[test]
    fn shape_reports_dimensions() {
        assert_eq!(g(&[&[2, 0, 0], &[0, 0, 4]]).shape(), Ok((2, 3)));
    }

    #[test]
    fn shape_rejects_ragged_rows() {
        let ragged = Grid::from_rows(vec![vec![None, None], vec![None]]);
        assert_eq!(
            ragged.shape(),
            Err(EngineError::InvalidGridShape(ShapeProblem::RaggedRow {
                row: 1,
                expected: 2,
                found: 1,
            }))
        );
        assert_eq!(
            Grid::from_rows(vec![]).shape(),
            Err(EngineError::InvalidGridShape(ShapeProblem::NoRows))
        );
        assert_eq!(
            Grid::from_rows(vec![vec![], vec![]]).shape(),
            Err(EngineError::InvalidGridShape(ShapeProblem::NoColumns))
        );
    }

    #[test]
    fn check_tiles_rejects_zero_and_odd_values() {
        let zero: Grid = serde_json::from_str("[[0,0,null]]").unwrap();
        assert_eq!(zero.shape(), Ok((1, 3)));
        assert_eq!(
            zero.check_tiles(),
            Err(EngineError::InvalidTile { row: 0, col: 0, value: 0 })
        );
        let odd = Grid::from_rows(vec![vec![Some(2), None], vec![None, Some(6)]]);
        assert_eq!(
            odd.check_tiles(),
            Err(EngineError::InvalidTile { row: 1, col: 1, value: 6 })
        );
        let one = Grid::from_rows(vec![vec![Some(1)]]);
        assert!(one.check_tiles().is_err());
        assert_eq!(g(&[&[2, 0], &[1 << 31, 4]]).check_tiles(), Ok(()));
    }

    #[test]
    fn it_counts_and_finds_tiles() {
        let grid = g(&[&[2, 0, 128, 0], &[0, 0, 0, 4]]);
        assert_eq!(grid.count_empty(), 5);
        assert_eq!(grid.highest_tile(), Some(128));
        assert!(grid.contains_tile(4));
        assert!(!grid.contains_tile(8));
        assert_eq!(grid.tile_sum(), 134);
        assert_eq!(grid.empty_cells()[0], (0, 1));
        assert_eq!(Grid::empty(2, 2).highest_tile(), None);
    }

    #[test]
    fn set_ignores_out_of_bounds() {
        let mut grid = Grid::empty(2, 2);
        grid.set(1, 1, Some(8));
        grid.set(5, 0, Some(2));
        assert_eq!(grid.cell(1, 1), Some(8));
        assert_eq!(grid.count_empty(), 3);
    }

    #[test]
    fn direction_tables_invert_each_other() {
        for dir in Direction::ALL {
            let total = dir.forward_rotation().degrees() + dir.inverse_rotation().degrees();
            assert_eq!(total % 360, 0, "{dir}");
        }
    }

    #[test]
    fn grid_serializes_empty_as_null() {
        let json = serde_json::to_string(&g(&[&[2, 0], &[0, 4]])).unwrap();
        assert_eq!(json, "[[2,null],[null,4]]");
        let back: Grid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g(&[&[2, 0], &[0, 4]]));
    }

    #[test]
    fn display_renders_one_line_per_row() {
        let text = g(&[&[2, 0], &[0, 2048]]).to_string();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("2048"));
    }
}
