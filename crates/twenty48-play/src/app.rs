use std::io::{BufRead, Write};

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use rand::{rngs::StdRng, SeedableRng};
use twenty48_rules::persist::{self, FileStore, KeyValueStore};
use twenty48_rules::{Session, Status, Turn};

use crate::config::Config;
use crate::input::{keys_in_line, Command};

/// Whether the input loop keeps reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    rng: StdRng,
    session: Session,
    store: Option<Box<dyn KeyValueStore>>,
}

impl App {
    /// Resume the saved game if the store has one, otherwise start fresh.
    pub fn new(config: Config) -> Result<Self> {
        config.check().map_err(|e| anyhow!(e))?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let store: Option<Box<dyn KeyValueStore>> = match &config.save_path {
            Some(path) => Some(Box::new(
                FileStore::open(path)
                    .with_context(|| format!("opening save file {}", path.display()))?,
            )),
            None => None,
        };
        let saved = match store.as_deref() {
            Some(s) => persist::load_session(s).context("loading saved game")?,
            None => None,
        };
        let session = match saved {
            Some(session) => session,
            None => Session::new(config.board.rows, config.board.cols, &mut rng),
        }
        .with_win_tile(config.win_tile)?;
        Ok(Self { rng, session, store })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Apply one command and print the resulting board.
    pub fn handle<W: Write>(&mut self, cmd: Command, out: &mut W) -> Result<Flow> {
        match cmd {
            Command::Quit => return Ok(Flow::Quit),
            Command::Move(direction) => match self.session.apply(direction, &mut self.rng)? {
                Turn::Ignored => {
                    writeln!(out, "Game finished; press n for a new game or u to undo.")?;
                    return Ok(Flow::Continue);
                }
                Turn::Blocked => {
                    writeln!(out, "Can't move {direction}.")?;
                    return Ok(Flow::Continue);
                }
                Turn::Moved { .. } => {}
            },
            Command::Undo => {
                if !self.session.undo()? {
                    writeln!(out, "Nothing to undo.")?;
                    return Ok(Flow::Continue);
                }
            }
            Command::NewGame => {
                self.session.restart(&mut self.rng);
                info!("new game (best so far {})", self.session.best_score());
            }
        }
        self.save()?;
        self.render(out)?;
        Ok(Flow::Continue)
    }

    pub fn render<W: Write>(&self, out: &mut W) -> Result<()> {
        write!(out, "{}", self.session.board())?;
        writeln!(
            out,
            "Score: {}  Best: {}",
            self.session.score(),
            self.session.best_score()
        )?;
        match self.session.status() {
            Status::Won => writeln!(out, "You reached {}!", self.session.win_tile())?,
            Status::Over => writeln!(out, "Game over.")?,
            Status::Playing => {}
        }
        Ok(())
    }

    /// Feed every line of `input` through `handle` until EOF or quit.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        self.render(out)?;
        for line in input.lines() {
            let line = line.context("reading input")?;
            let commands = keys_in_line(&line);
            if commands.is_empty() && !line.trim().is_empty() {
                warn!("ignoring unrecognised input {line:?}");
            }
            for cmd in commands {
                if self.handle(cmd, out)? == Flow::Quit {
                    return Ok(());
                }
            }
            out.flush()?;
        }
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        if let Some(store) = self.store.as_deref_mut() {
            persist::save_session(store, &self.session).context("saving game")?;
        }
        Ok(())
    }
}
