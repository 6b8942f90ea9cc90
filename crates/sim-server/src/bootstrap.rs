//! Startup: load the game configuration and any saved state.

use sim_core::{persistence, Game, GameConfig};

use crate::config::ServerConfig;
use crate::error::ServerError;

/// Builds the game from the configuration file, then restores the saved
/// state if a state file is configured and present.
pub fn load_game(config: &ServerConfig) -> Result<Game, ServerError> {
    let game_config = GameConfig::from_file(&config.config_file)?;
    let mut game = Game::from_config(&game_config, config.game_options())?;
    tracing::info!(
        "loaded {} maps from {}",
        game.maps().len(),
        config.config_file.display()
    );

    if let Some(path) = &config.state_file {
        persistence::load_from_file(path, &mut game)?;
    }
    Ok(game)
}
