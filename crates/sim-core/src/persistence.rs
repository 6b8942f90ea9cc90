//! State Persistence
//!
//! Serializes the whole game (players, sessions, dogs, loot, counters) to
//! JSON and back. File writes go through a temp file and a rename so a
//! crash mid-save never leaves a truncated state file behind.

use sim_model::GameSnapshot;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;
use crate::game::Game;

/// Serializes the game state.
pub fn encode(game: &Game) -> Result<Vec<u8>, PersistenceError> {
    serde_json::to_vec_pretty(&game.to_snapshot()).map_err(PersistenceError::Encode)
}

pub fn decode(bytes: &[u8]) -> Result<GameSnapshot, PersistenceError> {
    serde_json::from_slice(bytes).map_err(PersistenceError::Decode)
}

/// Replaces the players and sessions of `game` with the encoded state.
///
/// `game` must have been built from the same map configuration that was
/// active when the state was saved.
pub fn restore(bytes: &[u8], game: &mut Game) -> Result<(), PersistenceError> {
    let snapshot = decode(bytes)?;
    game.apply_snapshot(&snapshot)
}

/// Writes the game state to `path` atomically and resets the save timers.
pub fn save_to_file(game: &mut Game, path: &Path) -> Result<(), PersistenceError> {
    let bytes = encode(game)?;
    write_bytes_atomic(path, &bytes).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    game.mark_saved();
    tracing::info!("game state saved to {}", path.display());
    Ok(())
}

/// Restores `game` from `path`. Returns `false` when the file does not exist.
pub fn load_from_file(path: &Path, game: &mut Game) -> Result<bool, PersistenceError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            tracing::info!("no saved state at {}, starting fresh", path.display());
            return Ok(false);
        }
        Err(source) => {
            return Err(PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    restore(&bytes, game)?;
    tracing::info!("game state restored from {}", path.display());
    Ok(true)
}

fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, bytes)?;
    if let Err(error) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("state");
    path.with_file_name(format!("{file_name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LootGeneratorConfig;
    use crate::game::GameOptions;
    use sim_model::{GridPoint, LootType, Map, MapId, Road, SNAPSHOT_FORMAT_VERSION};
    use tempfile::TempDir;

    fn game() -> Game {
        let mut map = Map::new(MapId::new("map1"), "Map 1");
        map.add_road(Road::horizontal(GridPoint::new(0, 0), 10));
        map.set_loot_types(vec![LootType::new("key", 10)]);
        Game::new(
            vec![map],
            LootGeneratorConfig::default(),
            GameOptions {
                randomize_spawn_points: false,
                seed: Some(5),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let mut game = game();

        let loaded = load_from_file(&dir.path().join("state.json"), &mut game).unwrap();

        assert!(!loaded);
    }

    #[test]
    fn test_corrupt_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, b"{ not json").unwrap();

        let result = load_from_file(&path, &mut game());

        assert!(matches!(result, Err(PersistenceError::Decode(_))));
    }

    #[test]
    fn test_unsupported_version_fails() {
        let mut snapshot = GameSnapshot::empty();
        snapshot.version = SNAPSHOT_FORMAT_VERSION + 1;
        let bytes = serde_json::to_vec(&snapshot).unwrap();

        let result = restore(&bytes, &mut game());

        assert!(matches!(result, Err(PersistenceError::UnsupportedVersion(_))));
    }

    #[test]
    fn test_save_is_atomic_and_resets_timer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let mut game = game();
        game.join("Rex", &MapId::new("map1")).unwrap();
        game.tick(std::time::Duration::from_secs(1));

        save_to_file(&mut game, &path).unwrap();

        assert!(path.exists());
        assert!(!temp_path_for(&path).exists());
        assert_eq!(game.time_since_save(), std::time::Duration::ZERO);
        let saved = decode(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(saved.players.len(), 1);
        assert_eq!(saved.sessions.len(), 1);
    }
}
