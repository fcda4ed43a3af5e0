//! Key-value persistence for a [`Session`].
//!
//! Values are stored as strings under fixed keys: the board and history as
//! JSON (empty cells are `null`), scores as decimal text.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use crate::engine::{EngineError, Grid};
use crate::session::{Session, Snapshot};

pub const BOARD_KEY: &str = "2048-board";
pub const SCORE_KEY: &str = "Score";
pub const BEST_SCORE_KEY: &str = "bestScore";
pub const HISTORY_KEY: &str = "gameHistory";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed JSON under {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed number under {key}: {source}")]
    Parse {
        key: String,
        #[source]
        source: ParseIntError,
    },
    #[error("stored board is corrupted: {0}")]
    Shape(#[from] EngineError),
}

/// String key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), PersistError>;
}

/// Volatile store, handy for tests and headless runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), PersistError> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }
}

/// Store backed by a single JSON object file, rewritten on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open `path`, starting empty if the file does not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PersistError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| PersistError::Json {
                key: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("opened store {}", path.display());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            PersistError::Json {
                key: self.path.display().to_string(),
                source,
            }
        })?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), PersistError> {
        self.entries.insert(key.to_owned(), value);
        self.flush()
    }
}

fn to_json<T: serde::Serialize>(key: &str, value: &T) -> Result<String, PersistError> {
    serde_json::to_string(value).map_err(|source| PersistError::Json {
        key: key.to_owned(),
        source,
    })
}

fn from_json<T: serde::de::DeserializeOwned>(key: &str, text: &str) -> Result<T, PersistError> {
    serde_json::from_str(text).map_err(|source| PersistError::Json {
        key: key.to_owned(),
        source,
    })
}

fn parse_score(key: &str, text: &str) -> Result<u64, PersistError> {
    text.trim().parse().map_err(|source| PersistError::Parse {
        key: key.to_owned(),
        source,
    })
}

/// Write board, scores and history under their keys.
pub fn save_session<S: KeyValueStore + ?Sized>(
    store: &mut S,
    session: &Session,
) -> Result<(), PersistError> {
    store.set(BOARD_KEY, to_json(BOARD_KEY, session.board())?)?;
    store.set(SCORE_KEY, session.score().to_string())?;
    store.set(BEST_SCORE_KEY, session.best_score().to_string())?;
    store.set(HISTORY_KEY, to_json(HISTORY_KEY, &session.history())?)?;
    debug!("saved session at score {}", session.score());
    Ok(())
}

/// Load a session saved by [`save_session`].
///
/// Returns `Ok(None)` when no board is stored. Missing scores default to 0
/// and a missing history is reseeded from the board.
pub fn load_session<S: KeyValueStore + ?Sized>(
    store: &S,
) -> Result<Option<Session>, PersistError> {
    let Some(board_text) = store.get(BOARD_KEY)? else {
        return Ok(None);
    };
    let board: Grid = from_json(BOARD_KEY, &board_text)?;
    let score = match store.get(SCORE_KEY)? {
        Some(text) => parse_score(SCORE_KEY, &text)?,
        None => 0,
    };
    let best_score = match store.get(BEST_SCORE_KEY)? {
        Some(text) => parse_score(BEST_SCORE_KEY, &text)?,
        None => 0,
    };
    let history: Vec<Snapshot> = match store.get(HISTORY_KEY)? {
        Some(text) => from_json(HISTORY_KEY, &text)?,
        None => Vec::new(),
    };
    let session = Session::restore(board, score, best_score, history)?;
    info!(
        "loaded session: score {}, best {}, {} snapshot(s)",
        session.score(),
        session.best_score(),
        session.history().len()
    );
    Ok(Some(session))
}
