//! Session controller: score, best score, undo history and win/over flags
//! layered on top of the move engine.

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::{self, Direction, EngineError, Grid};

/// Tile value that wins the game. Deliberately 128, not 2048.
pub const WIN_TILE: u32 = 128;

/// Board and score as they stood after one accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub board: Grid,
    pub score: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Playing,
    Won,
    Over,
}

/// What a single keypress did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// The game already ended; input is ignored.
    Ignored,
    /// The move changed nothing, so no tile was added.
    Blocked,
    /// The board moved and a random tile was added.
    Moved { score_gained: u64, status: Status },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    board: Grid,
    score: u64,
    best_score: u64,
    history: Vec<Snapshot>,
    status: Status,
    win_tile: u32,
}

impl Session {
    /// Fresh `rows` x `cols` game with two random tiles.
    pub fn new<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let board = Grid::empty(rows, cols)
            .with_random_tile(rng)
            .with_random_tile(rng);
        let history = vec![Snapshot {
            board: board.clone(),
            score: 0,
        }];
        Session {
            board,
            score: 0,
            best_score: 0,
            history,
            status: Status::Playing,
            win_tile: WIN_TILE,
        }
    }

    /// Rebuild a session from persisted parts.
    ///
    /// The board and every snapshot must be valid grids holding valid tiles;
    /// corrupted state is reported, never repaired. An empty history is
    /// reseeded with the current board.
    pub fn restore(
        board: Grid,
        score: u64,
        best_score: u64,
        mut history: Vec<Snapshot>,
    ) -> Result<Self, EngineError> {
        for grid in std::iter::once(&board).chain(history.iter().map(|s| &s.board)) {
            grid.shape()?;
            grid.check_tiles()?;
        }
        if history.is_empty() {
            history.push(Snapshot {
                board: board.clone(),
                score,
            });
        }
        let mut session = Session {
            board,
            score,
            best_score: best_score.max(score),
            history,
            status: Status::Playing,
            win_tile: WIN_TILE,
        };
        session.status = session.evaluate()?;
        Ok(session)
    }

    /// Start over on a fresh board of the same size, keeping the best score.
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let fresh = Session::new(self.board.row_count(), self.board.column_count(), rng);
        *self = Session {
            best_score: self.best_score,
            win_tile: self.win_tile,
            ..fresh
        };
    }

    /// Use `win_tile` instead of [`WIN_TILE`] as the winning value.
    pub fn with_win_tile(mut self, win_tile: u32) -> Result<Self, EngineError> {
        self.win_tile = win_tile;
        self.status = self.evaluate()?;
        Ok(self)
    }

    pub fn board(&self) -> &Grid {
        &self.board
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn history(&self) -> &[Snapshot] {
        &self.history
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn win_tile(&self) -> u32 {
        self.win_tile
    }

    /// Apply one directional move, then add a random tile if anything moved.
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        direction: Direction,
        rng: &mut R,
    ) -> Result<Turn, EngineError> {
        if self.status != Status::Playing {
            return Ok(Turn::Ignored);
        }
        let result = engine::move_grid(&self.board, direction)?;
        if !result.moved {
            debug!("move {direction} blocked");
            return Ok(Turn::Blocked);
        }

        self.board = result.grid.with_random_tile(rng);
        self.score += result.score_gained;
        self.best_score = self.best_score.max(self.score);
        self.history.push(Snapshot {
            board: self.board.clone(),
            score: self.score,
        });
        self.status = self.evaluate()?;
        debug!(
            "move {direction}: +{} -> score {}",
            result.score_gained, self.score
        );
        match self.status {
            Status::Won => info!("reached {} with score {}", self.win_tile, self.score),
            Status::Over => info!("no moves left, final score {}", self.score),
            Status::Playing => {}
        }
        Ok(Turn::Moved {
            score_gained: result.score_gained,
            status: self.status,
        })
    }

    /// Step back to the previous snapshot. Returns false if there is none.
    ///
    /// The best score is never lowered. The status is re-evaluated on the
    /// restored board, so undoing onto a winning or stuck board reports it.
    pub fn undo(&mut self) -> Result<bool, EngineError> {
        if self.history.len() <= 1 {
            return Ok(false);
        }
        self.history.pop();
        let Some(previous) = self.history.last() else {
            return Ok(false);
        };
        self.board = previous.board.clone();
        self.score = previous.score;
        self.status = self.evaluate()?;
        debug!("undo -> score {} ({:?})", self.score, self.status);
        Ok(true)
    }

    /// Win check runs before the game-over probe.
    fn evaluate(&self) -> Result<Status, EngineError> {
        if self.board.contains_tile(self.win_tile) {
            Ok(Status::Won)
        } else if engine::is_game_over(&self.board)? {
            Ok(Status::Over)
        } else {
            Ok(Status::Playing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn g(rows: &[&[u32]]) -> Grid {
        Grid::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|&v| (v != 0).then_some(v)).collect())
                .collect(),
        )
    }

    #[test]
    fn new_session_has_two_tiles() {
        let mut rng = StdRng::seed_from_u64(1);
        let s = Session::new(4, 4, &mut rng);
        assert_eq!(s.board().count_empty(), 14);
        assert_eq!(s.score(), 0);
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.status(), Status::Playing);
        assert_eq!(s.win_tile(), WIN_TILE);
    }

    #[test]
    fn apply_scores_and_adds_a_tile() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut s = Session::restore(g(&[&[2, 2, 0, 0], &[0, 0, 0, 0]]), 10, 10, vec![]).unwrap();
        let turn = s.apply(Direction::Left, &mut rng).unwrap();
        assert_eq!(
            turn,
            Turn::Moved {
                score_gained: 4,
                status: Status::Playing
            }
        );
        assert_eq!(s.score(), 14);
        assert_eq!(s.best_score(), 14);
        assert_eq!(s.board().cell(0, 0), Some(4));
        assert_eq!(s.board().count_empty(), 6);
        assert_eq!(s.history().len(), 2);
        assert_eq!(s.history()[1].score, 14);
    }

    #[test]
    fn blocked_move_changes_nothing() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut s = Session::restore(g(&[&[2, 4], &[0, 0]]), 0, 0, vec![]).unwrap();
        let before = s.clone();
        assert_eq!(s.apply(Direction::Left, &mut rng).unwrap(), Turn::Blocked);
        assert_eq!(s, before);
    }

    #[test]
    fn reaching_128_wins_and_freezes_input() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut s = Session::restore(g(&[&[64, 64, 0], &[0, 0, 0]]), 0, 0, vec![]).unwrap();
        let turn = s.apply(Direction::Left, &mut rng).unwrap();
        assert_eq!(
            turn,
            Turn::Moved {
                score_gained: 128,
                status: Status::Won
            }
        );
        assert_eq!(s.apply(Direction::Right, &mut rng).unwrap(), Turn::Ignored);
    }

    #[test]
    fn custom_win_tile() {
        let s = Session::restore(g(&[&[128, 0], &[0, 0]]), 0, 0, vec![]).unwrap();
        assert_eq!(s.status(), Status::Won);
        let s = s.with_win_tile(2048).unwrap();
        assert_eq!(s.win_tile(), 2048);
        assert_eq!(s.status(), Status::Playing);
    }

    #[test]
    fn last_move_filling_the_board_ends_the_game() {
        // Left leaves [4, 8, _]; a 2 or 4 in the gap can merge with nothing.
        let mut rng = StdRng::seed_from_u64(9);
        let mut s = Session::restore(g(&[&[2, 2, 8], &[16, 32, 64]]), 0, 0, vec![]).unwrap();
        let turn = s.apply(Direction::Left, &mut rng).unwrap();
        assert_eq!(
            turn,
            Turn::Moved {
                score_gained: 4,
                status: Status::Over
            }
        );
        assert_eq!(s.board().count_empty(), 0);
        assert_eq!(s.apply(Direction::Up, &mut rng).unwrap(), Turn::Ignored);
    }

    #[test]
    fn undo_restores_previous_snapshot() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut s = Session::restore(g(&[&[2, 2, 0, 0], &[0, 0, 0, 0]]), 0, 0, vec![]).unwrap();
        let start = s.board().clone();
        s.apply(Direction::Left, &mut rng).unwrap();
        assert_eq!(s.score(), 4);
        assert!(s.undo().unwrap());
        assert_eq!(s.board(), &start);
        assert_eq!(s.score(), 0);
        assert_eq!(s.best_score(), 4);
        assert_eq!(s.status(), Status::Playing);
        assert!(!s.undo().unwrap());
    }

    #[test]
    fn undo_reevaluates_status() {
        let won = Snapshot { board: g(&[&[128, 0], &[0, 0]]), score: 128 };
        let stuck = Snapshot { board: g(&[&[2, 4], &[4, 2]]), score: 200 };
        let current = g(&[&[2, 0], &[0, 0]]);
        let latest = Snapshot { board: current.clone(), score: 300 };

        let mut s = Session::restore(current.clone(), 300, 300, vec![won, latest.clone()]).unwrap();
        assert_eq!(s.status(), Status::Playing);
        assert!(s.undo().unwrap());
        assert_eq!(s.status(), Status::Won);

        let mut s = Session::restore(current, 300, 300, vec![stuck, latest]).unwrap();
        assert!(s.undo().unwrap());
        assert_eq!(s.status(), Status::Over);
        assert_eq!(s.score(), 200);
    }

    #[test]
    fn restart_keeps_best_and_size() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut s = Session::restore(g(&[&[2, 2, 0], &[0, 0, 0]]), 40, 90, vec![])
            .unwrap()
            .with_win_tile(64)
            .unwrap();
        s.restart(&mut rng);
        assert_eq!(s.score(), 0);
        assert_eq!(s.best_score(), 90);
        assert_eq!(s.win_tile(), 64);
        assert_eq!(s.board().shape(), Ok((2, 3)));
        assert_eq!(s.board().count_empty(), 4);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn restore_rejects_corrupted_board() {
        let ragged = Grid::from_rows(vec![vec![Some(2)], vec![]]);
        assert!(Session::restore(ragged, 0, 0, vec![]).is_err());
        let zero = Grid::from_rows(vec![vec![Some(0), None]]);
        assert_eq!(
            Session::restore(zero.clone(), 0, 0, vec![]),
            Err(EngineError::InvalidTile { row: 0, col: 0, value: 0 })
        );
        let bad_history = vec![Snapshot { board: zero, score: 0 }];
        assert!(Session::restore(g(&[&[2, 0]]), 0, 0, bad_history).is_err());
    }
}
