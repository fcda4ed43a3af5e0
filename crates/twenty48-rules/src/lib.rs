//! Rule engine for the 2048 sliding-tile puzzle, plus the session and
//! persistence glue that front-ends build on top of it.

pub mod engine;
pub mod persist;
pub mod session;

pub use engine::{Cell, Direction, EngineError, Grid, MoveResult, Tile};
pub use session::{Session, Status, Turn};
