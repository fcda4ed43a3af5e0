use std::io::Read;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub board: BoardSize,

    /// Tile value that ends the game as a win.
    #[serde(default = "defaults::win_tile")]
    pub win_tile: u32,

    /// Seed for tile placement. Omit for a fresh random game each run.
    #[serde(default)]
    pub seed: Option<u64>,

    /// JSON file the session is saved to after every accepted key.
    #[serde(default)]
    pub save_path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct BoardSize {
    #[serde(default = "defaults::rows")]
    pub rows: usize,
    #[serde(default = "defaults::cols")]
    pub cols: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            board: BoardSize::default(),
            win_tile: defaults::win_tile(),
            seed: None,
            save_path: None,
        }
    }
}

impl Default for BoardSize {
    fn default() -> Self {
        Self { rows: defaults::rows(), cols: defaults::cols() }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mut file = std::fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let cfg: Self = toml::from_str(&contents)?;
        cfg.check()?;
        Ok(cfg)
    }

    /// Reject boards the engine cannot play on.
    pub fn check(&self) -> Result<(), String> {
        if self.board.rows == 0 || self.board.cols == 0 {
            return Err(format!(
                "board must have at least one row and column, got {}x{}",
                self.board.rows, self.board.cols
            ));
        }
        if self.board.rows * self.board.cols < 2 {
            return Err("board needs room for the two starting tiles".to_owned());
        }
        Ok(())
    }
}

mod defaults {
    pub fn rows() -> usize { 4 }
    pub fn cols() -> usize { 4 }
    pub fn win_tile() -> u32 { twenty48_rules::session::WIN_TILE }
}
