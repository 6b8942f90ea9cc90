//! Game
//!
//! Top-level container: the immutable map set, one lazily created session
//! per map, and the player registry that maps tokens to dogs.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sim_model::{DogId, GameSnapshot, Map, MapId, MoveCommand, SNAPSHOT_FORMAT_VERSION};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{GameConfig, LootGeneratorConfig};
use crate::dog::Dog;
use crate::error::{ConfigError, GameError, PersistenceError};
use crate::loot_gen::LootGenerator;
use crate::session::{random_road_position, GameSession, SessionView, TickReport};
use crate::tokens::{Player, PlayerRegistry, Token};

/// Runtime switches that are not part of the map configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameOptions {
    /// Spawn new dogs at a random road point instead of the first road's start.
    pub randomize_spawn_points: bool,
    /// Seed for spawn points and loot placement. `None` seeds from entropy.
    pub seed: Option<u64>,
}

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub token: Token,
    pub player_id: DogId,
}

/// Converts a requested tick length in milliseconds.
pub fn tick_delta_from_millis(millis: i64) -> Result<Duration, GameError> {
    u64::try_from(millis)
        .map(Duration::from_millis)
        .map_err(|_| GameError::InvalidTickDelta(format!("{millis} ms is negative")))
}

#[derive(Debug)]
pub struct Game {
    maps: Vec<Arc<Map>>,
    map_index: HashMap<MapId, usize>,
    sessions: BTreeMap<MapId, GameSession>,
    players: PlayerRegistry,
    loot_config: LootGeneratorConfig,
    options: GameOptions,
    rng: SmallRng,
}

impl Game {
    pub fn new(
        maps: Vec<Map>,
        loot_config: LootGeneratorConfig,
        options: GameOptions,
    ) -> Result<Self, GameError> {
        let mut map_index = HashMap::new();
        let mut shared = Vec::with_capacity(maps.len());
        for map in maps {
            map.validate()?;
            if map_index.insert(map.id().clone(), shared.len()).is_some() {
                return Err(GameError::DuplicateMap(map.id().clone()));
            }
            shared.push(Arc::new(map));
        }

        let rng = match options.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        tracing::info!("game created with {} maps", shared.len());
        Ok(Self {
            maps: shared,
            map_index,
            sessions: BTreeMap::new(),
            players: PlayerRegistry::new(),
            loot_config,
            options,
            rng,
        })
    }

    pub fn from_config(config: &GameConfig, options: GameOptions) -> Result<Self, ConfigError> {
        let maps = config.build_maps()?;
        Self::new(maps, config.loot_generator_config, options)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn maps(&self) -> &[Arc<Map>] {
        &self.maps
    }

    pub fn find_map(&self, id: &MapId) -> Option<&Arc<Map>> {
        self.map_index.get(id).map(|&index| &self.maps[index])
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    pub fn session(&self, map_id: &MapId) -> Option<&GameSession> {
        self.sessions.get(map_id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &GameSession> {
        self.sessions.values()
    }

    /// Adds a player to a map, creating the map's session on first use.
    ///
    /// Joining again with a name already used on that map returns the
    /// existing player's token.
    pub fn join(&mut self, name: &str, map_id: &MapId) -> Result<JoinOutcome, GameError> {
        if name.is_empty() {
            return Err(GameError::EmptyPlayerName);
        }
        let map = self
            .find_map(map_id)
            .cloned()
            .ok_or_else(|| GameError::MapNotFound(map_id.clone()))?;

        if let Some(existing) = self.players.find_by_name(map_id, name) {
            return Ok(JoinOutcome {
                token: existing.token.clone(),
                player_id: existing.id,
            });
        }

        let spawn = if self.options.randomize_spawn_points {
            random_road_position(&map, &mut self.rng)
        } else {
            map.spawn_point()
        };
        let spawn = spawn.ok_or_else(|| sim_model::MapError::NoRoads(map_id.to_string()))?;

        let id = self.players.next_id();
        self.session_entry(&map).add_dog(Dog::new(id, name, spawn))?;
        let player = self.players.register(name, map_id.clone()).clone();

        tracing::info!("player {} ({}) joined map {} at {}", player.id, name, map_id, spawn);
        Ok(JoinOutcome {
            token: player.token,
            player_id: player.id,
        })
    }

    fn session_entry(&mut self, map: &Arc<Map>) -> &mut GameSession {
        let rng = &mut self.rng;
        let loot_config = &self.loot_config;
        self.sessions.entry(map.id().clone()).or_insert_with(|| {
            tracing::info!("session created for map {}", map.id());
            GameSession::new(
                Arc::clone(map),
                LootGenerator::from_config(loot_config),
                SmallRng::seed_from_u64(rng.gen()),
            )
        })
    }

    pub fn find_player(&self, token: &str) -> Result<&Player, GameError> {
        self.players.find_by_token(token)
    }

    /// Applies a move symbol (`U`, `D`, `L`, `R` or empty) to the token's dog.
    pub fn move_player(&mut self, token: &str, symbol: &str) -> Result<(), GameError> {
        let player = self.players.find_by_token(token)?;
        let command: MoveCommand = symbol.parse()?;
        let session = self
            .sessions
            .get_mut(&player.map_id)
            .ok_or_else(|| GameError::MapNotFound(player.map_id.clone()))?;
        session.move_dog(player.id, command)
    }

    /// Players sharing the token holder's map, ordered by id.
    pub fn players_on_map(&self, token: &str) -> Result<Vec<&Player>, GameError> {
        let player = self.players.find_by_token(token)?;
        Ok(self.players.players_on(&player.map_id).collect())
    }

    /// Dogs and loot of the token holder's session.
    pub fn state_for(&self, token: &str) -> Result<SessionView, GameError> {
        let player = self.players.find_by_token(token)?;
        self.sessions
            .get(&player.map_id)
            .map(GameSession::view)
            .ok_or_else(|| GameError::MapNotFound(player.map_id.clone()))
    }

    /// Advances every session by `delta`.
    pub fn tick(&mut self, delta: Duration) -> TickReport {
        let mut total = TickReport::default();
        for (map_id, session) in &mut self.sessions {
            let report = session.advance(delta);
            if report != TickReport::default() {
                tracing::debug!(
                    "map {}: spawned {}, collected {}, deliveries {}, points {}",
                    map_id,
                    report.spawned,
                    report.collected,
                    report.deliveries,
                    report.points
                );
            }
            total.merge(report);
        }
        total
    }

    /// Longest time any session has gone without being saved.
    pub fn time_since_save(&self) -> Duration {
        self.sessions
            .values()
            .map(GameSession::time_since_save)
            .max()
            .unwrap_or(Duration::ZERO)
    }

    pub fn mark_saved(&mut self) {
        for session in self.sessions.values_mut() {
            session.reset_time_since_save();
        }
    }

    pub fn to_snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            version: SNAPSHOT_FORMAT_VERSION,
            next_player_id: self.players.next_id().0,
            players: self.players.iter().map(Player::to_snapshot).collect(),
            sessions: self.sessions.values().map(GameSession::to_snapshot).collect(),
        }
    }

    /// Replaces all players and sessions with the saved ones.
    pub fn apply_snapshot(&mut self, snapshot: &GameSnapshot) -> Result<(), PersistenceError> {
        if snapshot.version != SNAPSHOT_FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion(snapshot.version));
        }

        let mut sessions = BTreeMap::new();
        for saved in &snapshot.sessions {
            let map = self
                .find_map(&saved.map_id)
                .cloned()
                .ok_or_else(|| PersistenceError::UnknownMap(saved.map_id.clone()))?;
            let session = GameSession::restore(
                map,
                LootGenerator::from_config(&self.loot_config),
                SmallRng::seed_from_u64(self.rng.gen()),
                saved,
            )?;
            if sessions.insert(saved.map_id.clone(), session).is_some() {
                return Err(PersistenceError::Inconsistent(format!(
                    "map {} has two sessions",
                    saved.map_id
                )));
            }
        }

        let mut players = PlayerRegistry::new();
        for saved in &snapshot.players {
            let session = sessions.get(&saved.map_id).ok_or_else(|| {
                PersistenceError::Inconsistent(format!(
                    "player {} is on map {} which has no session",
                    saved.id, saved.map_id
                ))
            })?;
            if session.dog(saved.id).is_none() {
                return Err(PersistenceError::Inconsistent(format!(
                    "player {} has no dog",
                    saved.id
                )));
            }
            players.restore(saved)?;
        }
        players.reserve_ids_below(snapshot.next_player_id);

        for (map_id, session) in &sessions {
            for dog in session.dogs() {
                let owned = players
                    .find_by_id(dog.id())
                    .is_some_and(|player| &player.map_id == map_id);
                if !owned {
                    return Err(PersistenceError::Inconsistent(format!(
                        "dog {} on map {} has no player",
                        dog.id(),
                        map_id
                    )));
                }
            }
        }

        tracing::info!(
            "restored {} players across {} sessions",
            players.len(),
            sessions.len()
        );
        self.sessions = sessions;
        self.players = players;
        Ok(())
    }
}
