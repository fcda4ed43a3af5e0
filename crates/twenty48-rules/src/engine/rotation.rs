use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::state::{Cell, Grid};

/// A counter-clockwise rotation by a multiple of 90 degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// The rotation that undoes this one.
    pub fn inverse(self) -> Rotation {
        match self {
            Rotation::Deg0 => Rotation::Deg0,
            Rotation::Deg90 => Rotation::Deg270,
            Rotation::Deg180 => Rotation::Deg180,
            Rotation::Deg270 => Rotation::Deg90,
        }
    }
}

/// Rotate `grid` counter-clockwise by `rotation`.
///
/// `Deg0` hands back the input itself as `Cow::Borrowed`; every other
/// rotation builds a new grid. For an R x C input:
/// - 90:  C x R, `new[i][j] = old[j][C - i - 1]`
/// - 180: R x C, `new[i][j] = old[R - i - 1][C - j - 1]`
/// - 270: C x R, `new[i][j] = old[R - j - 1][i]`
///
/// ```
/// use std::borrow::Cow;
/// use twenty48_rules::engine::{rotate, Grid, Rotation};
/// let g = Grid::from_rows(vec![vec![Some(2), None]]);
/// assert!(matches!(rotate(&g, Rotation::Deg0).unwrap(), Cow::Borrowed(_)));
/// let turned = rotate(&g, Rotation::Deg90).unwrap().into_owned();
/// assert_eq!(turned, Grid::from_rows(vec![vec![None], vec![Some(2)]]));
/// ```
pub fn rotate(grid: &Grid, rotation: Rotation) -> Result<Cow<'_, Grid>, EngineError> {
    let (rows, cols) = grid.shape()?;
    let old = grid.rows();
    let at = |i: usize, j: usize| -> Cell { old[i][j] };

    let rotated = match rotation {
        Rotation::Deg0 => return Ok(Cow::Borrowed(grid)),
        Rotation::Deg90 => build(cols, rows, |i, j| at(j, cols - i - 1)),
        Rotation::Deg180 => build(rows, cols, |i, j| at(rows - i - 1, cols - j - 1)),
        Rotation::Deg270 => build(cols, rows, |i, j| at(rows - j - 1, i)),
    };
    Ok(Cow::Owned(rotated))
}

fn build(rows: usize, cols: usize, cell: impl Fn(usize, usize) -> Cell) -> Grid {
    Grid::from_rows(
        (0..rows)
            .map(|i| (0..cols).map(|j| cell(i, j)).collect())
            .collect(),
    )
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

    // 2 x 3 grid with distinct values so every position is traceable.
    fn sample() -> Grid {
        g(&[&[2, 4, 8], &[16, 32, 64]])
    }

    #[test]
    fn rotate_0_borrows_input() {
        let grid = sample();
        let out = rotate(&grid, Rotation::Deg0).unwrap();
        match out {
            Cow::Borrowed(b) => assert!(std::ptr::eq(b, &grid)),
            Cow::Owned(_) => panic!("identity rotation must not copy"),
        }
    }

    #[test]
    fn rotate_90_counter_clockwise() {
        let out = rotate(&sample(), Rotation::Deg90).unwrap().into_owned();
        assert_eq!(out, g(&[&[8, 64], &[4, 32], &[2, 16]]));
    }

    #[test]
    fn rotate_180() {
        let out = rotate(&sample(), Rotation::Deg180).unwrap().into_owned();
        assert_eq!(out, g(&[&[64, 32, 16], &[8, 4, 2]]));
    }

    #[test]
    fn rotate_270_counter_clockwise() {
        let out = rotate(&sample(), Rotation::Deg270).unwrap().into_owned();
        assert_eq!(out, g(&[&[16, 2], &[32, 4], &[64, 8]]));
    }

    #[test]
    fn four_quarter_turns_round_trip() {
        let mut grid = sample();
        for _ in 0..4 {
            grid = rotate(&grid, Rotation::Deg90).unwrap().into_owned();
        }
        assert_eq!(grid, sample());
    }

    #[test]
    fn inverse_restores_original() {
        for rot in [
            Rotation::Deg0,
            Rotation::Deg90,
            Rotation::Deg180,
            Rotation::Deg270,
        ] {
            let there = rotate(&sample(), rot).unwrap().into_owned();
            let back = rotate(&there, rot.inverse()).unwrap().into_owned();
            assert_eq!(back, sample(), "{rot:?}");
        }
    }

    #[test]
    fn rotate_rejects_ragged_grid() {
        let ragged = Grid::from_rows(vec![vec![Some(2), None], vec![Some(4)]]);
        assert!(rotate(&ragged, Rotation::Deg90).is_err());
        assert!(rotate(&Grid::from_rows(vec![]), Rotation::Deg0).is_err());
    }
}
