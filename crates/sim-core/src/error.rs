//! Error Types
//!
//! One error enum per concern: gameplay requests, configuration loading and
//! state persistence.

use sim_model::{MapError, MapId, ParseDirectionError};
use std::path::PathBuf;

/// Recoverable errors reported back to the caller of a game operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("map {0} not found")]
    MapNotFound(MapId),
    #[error("map {0} already exists")]
    DuplicateMap(MapId),
    #[error("invalid token: expected 32 hex digits")]
    InvalidToken,
    #[error("player token has not been found")]
    UnknownToken,
    #[error("player {0} not found")]
    UnknownPlayer(u64),
    #[error("player {0} already has a dog on this map")]
    DuplicatePlayer(u64),
    #[error("player name must not be empty")]
    EmptyPlayerName,
    #[error(transparent)]
    InvalidDirection(#[from] ParseDirectionError),
    #[error("invalid time delta: {0}")]
    InvalidTickDelta(String),
    #[error(transparent)]
    Map(#[from] MapError),
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unsupported config format {0:?} (expected .json or .toml)")]
    UnsupportedFormat(PathBuf),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Map(#[from] MapError),
}

/// Errors that can occur while saving or restoring game state.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("state file I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode game state: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode game state: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("unsupported state version {0}")]
    UnsupportedVersion(u32),
    #[error("saved state refers to unknown map {0}")]
    UnknownMap(MapId),
    #[error("inconsistent saved state: {0}")]
    Inconsistent(String),
}
