//! Harness configuration read from the environment.

use settlers_core::{GameConfig, GameError};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("{name} must be a valid number, got {value:?}")]
    InvalidVar { name: &'static str, value: String },

    #[error("could not read game config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse game config: {0}")]
    ParseConfig(#[from] serde_json::Error),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// Settings for one simulation run
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of games to play
    pub games: u32,
    /// Seed of the first game; game `i` uses `base_seed + i`
    pub base_seed: u64,
    pub players: usize,
    /// Main-phase turns before a game is abandoned
    pub max_turns: u32,
    pub game: GameConfig,
    /// Where to write the final snapshot of the last game, if anywhere
    pub snapshot_path: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            games: 10,
            base_seed: 0,
            players: 4,
            max_turns: 500,
            game: GameConfig::default(),
            snapshot_path: None,
        }
    }
}

impl SimConfig {
    /// Read `SIM_*` variables, falling back to defaults for unset ones
    pub fn from_env() -> Result<Self, SimError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SimError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let game = match lookup("SIM_CONFIG") {
            Some(path) => load_game_config(PathBuf::from(path))?,
            None => GameConfig::default(),
        };

        Ok(Self {
            games: parse_var(&lookup, "SIM_GAMES", defaults.games)?,
            base_seed: parse_var(&lookup, "SIM_SEED", defaults.base_seed)?,
            players: parse_var(&lookup, "SIM_PLAYERS", defaults.players)?,
            max_turns: parse_var(&lookup, "SIM_MAX_TURNS", defaults.max_turns)?,
            game,
            snapshot_path: lookup("SIM_SNAPSHOT").map(PathBuf::from),
        })
    }

    /// Game config for the `index`th game of the run
    pub fn game_config(&self, index: u32) -> GameConfig {
        GameConfig {
            seed: Some(self.base_seed + u64::from(index)),
            ..self.game.clone()
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, SimError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| SimError::InvalidVar { name, value }),
        None => Ok(default),
    }
}

fn load_game_config(path: PathBuf) -> Result<GameConfig, SimError> {
    let text = std::fs::read_to_string(&path).map_err(|source| SimError::ReadConfig {
        path: path.clone(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}
