//! Runtime settings from the command line.

use clap::Parser;
use sim_core::GameOptions;
use std::path::PathBuf;
use std::time::Duration;

use crate::strand::StrandSettings;

/// Dog gatherer game server
#[derive(Parser, Debug, Clone)]
#[command(name = "game_server")]
#[command(about = "Runs the dog gatherer simulation")]
pub struct ServerConfig {
    /// Game configuration file (.json or .toml)
    #[arg(short = 'c', long)]
    pub config_file: PathBuf,

    /// Automatic tick period in milliseconds. Without it, or with 0, ticks
    /// are manual.
    #[arg(short = 't', long)]
    pub tick_period: Option<u64>,

    /// File the game state is saved to and restored from
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Save the state after this many milliseconds of game time
    #[arg(long)]
    pub save_state_period: Option<u64>,

    /// Spawn dogs at random road points
    #[arg(long)]
    pub randomize_spawn_points: bool,

    /// Seed for spawn points and loot placement
    #[arg(long)]
    pub seed: Option<u64>,

    /// Emit logs as JSON records
    #[arg(long)]
    pub log_json: bool,
}

impl ServerConfig {
    pub fn game_options(&self) -> GameOptions {
        GameOptions {
            randomize_spawn_points: self.randomize_spawn_points,
            seed: self.seed,
        }
    }

    pub fn strand_settings(&self) -> StrandSettings {
        StrandSettings {
            tick_period: self
                .tick_period
                .filter(|&ms| ms > 0)
                .map(Duration::from_millis),
            save_period: self.save_state_period.map(Duration::from_millis),
            state_file: self.state_file.clone(),
        }
    }
}
