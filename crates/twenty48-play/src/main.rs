mod app;
mod config;
mod input;

use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;

use app::App;
use config::Config;

#[derive(Parser, Debug)]
#[command(author, version, about = "Play 2048 in the terminal (w/a/s/d, arrows by name, u undo, n new, q quit)")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE", value_parser = clap::value_parser!(PathBuf))]
    config: Option<PathBuf>,

    /// Seed for tile placement (overrides the config file)
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Save file for the session (overrides the config file)
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut config = match &args.config {
        Some(path) => {
            info!("Using configuration file: {}", path.display());
            Config::from_toml(path)
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("loading {}", path.display()))?
        }
        None => Config::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.save.is_some() {
        config.save_path = args.save;
    }

    let mut app = App::new(config)?;
    let stdin = io::stdin();
    app.run(stdin.lock(), &mut io::stdout())?;
    info!(
        "Finished: score {}, best {}",
        app.session().score(),
        app.session().best_score()
    );
    Ok(())
}
