#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots Escape the Maze in the terminal.

mod app;
mod controller;
mod screens;

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    process::{self, ExitCode},
    sync::Mutex,
};

use anyhow::{Context, Result};
use clap::Parser;
use escape_maze_core::GameConfig;
use escape_maze_persistence::UserStore;
use escape_maze_system_progression::Roster;
use escape_maze_terminal::{restore_terminal, TerminalGuard};
use rand::seq::SliceRandom;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::app::{App, Options};

const GOODBYE_MESSAGES: [&str; 2] = ["Have a great day!", "See you later!"];

/// Exit status used when the game is interrupted.
const INTERRUPTED: u8 = 130;

#[derive(Debug, Parser)]
#[command(
    name = "escape-the-maze",
    version,
    about = "Reach the exit point of each maze before your hearts or time run out"
)]
struct Cli {
    /// Seed of the maze generator; a fresh one is drawn per session when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Show the player position, the distance to the exit and the seed below the HUD.
    #[arg(long)]
    debug: bool,
    /// JSON file holding every known user.
    #[arg(long, default_value = "escape-the-maze-users.json")]
    data_file: PathBuf,
    /// TOML file overriding the game constants.
    #[arg(long)]
    config: Option<PathBuf>,
    /// File receiving the log. Nothing is logged without it.
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Log in with this username instead of asking for one.
    #[arg(long)]
    username: Option<String>,
    /// Never ring the terminal bell.
    #[arg(long)]
    mute: bool,
}

/// Entry point for the Escape the Maze command-line interface.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if app::is_interrupt(&err) => ExitCode::from(INTERRUPTED),
        Err(err) => {
            error!(error = %format!("{err:#}"), "fatal error");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_file.as_deref())?;
    let config = load_config(cli.config.as_deref())?;
    config.validate().context("invalid game configuration")?;

    let store = UserStore::new(&cli.data_file);
    let roster = Roster::new(store.import_users(&config.upgrades));
    let handler_store = store.clone();
    ctrlc::set_handler(move || {
        restore_terminal();
        match handler_store.flush() {
            Ok(flushed) => info!(flushed, "termination signal received"),
            Err(err) => error!(%err, "failed to save users on termination"),
        }
        process::exit(i32::from(INTERRUPTED));
    })
    .context("failed to install the termination handler")?;

    let options = Options {
        seed: cli.seed,
        debug: cli.debug,
        mute: cli.mute,
    };
    let outcome = {
        let _guard = TerminalGuard::enter().context("failed to prepare the terminal")?;
        App::new(config, store.clone(), roster, options).run(cli.username)
    };
    let flushed = store
        .flush()
        .with_context(|| format!("failed to save users to {}", store.path().display()));
    outcome?;
    let _ = flushed?;

    if let Some(message) = GOODBYE_MESSAGES.choose(&mut rand::thread_rng()) {
        println!("{message}");
    }
    Ok(())
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn arguments_are_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::parse_from([
            "escape-the-maze",
            "--seed",
            "7",
            "--debug",
            "--username",
            "ada",
        ]);
        assert_eq!(cli.seed, Some(7));
        assert!(cli.debug);
        assert!(!cli.mute);
        assert_eq!(cli.username.as_deref(), Some("ada"));
        assert_eq!(cli.data_file, PathBuf::from("escape-the-maze-users.json"));
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let config = load_config(None).expect("defaults");
        assert_eq!(config, GameConfig::default());
    }
}
