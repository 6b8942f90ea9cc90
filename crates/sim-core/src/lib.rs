//! Core simulation: dogs moving on road networks, collecting loot and
//! delivering it to offices.
//!
//! - `movement` keeps dogs on roads
//! - `collision` finds pickups and office visits along each tick's path
//! - `loot_gen` decides how much loot appears
//! - `session` runs the per-tick pipeline for one map
//! - `game` owns all sessions and the player registry
//! - `persistence` saves and restores the whole game

pub mod collision;
pub mod config;
pub mod dog;
pub mod error;
pub mod game;
pub mod loot_gen;
pub mod movement;
pub mod persistence;
pub mod session;
pub mod tokens;

pub use config::{GameConfig, LootGeneratorConfig, MapConfig};
pub use dog::Dog;
pub use error::{ConfigError, GameError, PersistenceError};
pub use game::{tick_delta_from_millis, Game, GameOptions, JoinOutcome};
pub use loot_gen::LootGenerator;
pub use session::{GameSession, SessionView, TickReport};
pub use tokens::{Player, PlayerRegistry, Token};
