//! Player Tokens
//!
//! The player registry: who joined which map under which name, and the
//! secret token each player uses for later requests. Players refer to
//! their dog only by id; the dog itself lives in the session.

use serde::{Deserialize, Serialize};
use sim_model::{DogId, MapId, PlayerSnapshot};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use uuid::Uuid;

use crate::error::{GameError, PersistenceError};

/// Number of hex digits in a token.
pub const TOKEN_LENGTH: usize = 32;

/// Authorization token handed out on join.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Validates the token format: exactly 32 hex digits.
    pub fn parse(raw: &str) -> Result<Self, GameError> {
        if raw.len() != TOKEN_LENGTH || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(GameError::InvalidToken);
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: DogId,
    pub name: String,
    pub map_id: MapId,
    pub token: Token,
}

impl Player {
    pub fn to_snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            name: self.name.clone(),
            map_id: self.map_id.clone(),
            token: self.token.as_str().to_string(),
        }
    }
}

/// Registry of every player that joined during the process lifetime.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: BTreeMap<DogId, Player>,
    by_token: HashMap<Token, DogId>,
    by_name: HashMap<(MapId, String), DogId>,
    next_id: u64,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next registered player will receive.
    pub fn next_id(&self) -> DogId {
        DogId(self.next_id)
    }

    /// Registers a new player under a fresh id and token.
    pub fn register(&mut self, name: impl Into<String>, map_id: MapId) -> &Player {
        let player = Player {
            id: DogId(self.next_id),
            name: name.into(),
            map_id,
            token: Token::generate(),
        };
        self.next_id += 1;
        self.insert(player)
    }

    /// Re-inserts a player exactly as saved. A player whose id, token or
    /// (map, name) pair is already taken is rejected.
    pub fn restore(&mut self, snapshot: &PlayerSnapshot) -> Result<(), PersistenceError> {
        let inconsistent =
            |what: &str| PersistenceError::Inconsistent(format!("player {}: {what}", snapshot.id));
        let token = Token::parse(&snapshot.token).map_err(|_| inconsistent("malformed token"))?;
        if self.players.contains_key(&snapshot.id) {
            return Err(inconsistent("duplicate id"));
        }
        if self.by_token.contains_key(&token) {
            return Err(inconsistent("duplicate token"));
        }
        if self
            .by_name
            .contains_key(&(snapshot.map_id.clone(), snapshot.name.clone()))
        {
            return Err(inconsistent("duplicate name on map"));
        }
        self.insert(Player {
            id: snapshot.id,
            name: snapshot.name.clone(),
            map_id: snapshot.map_id.clone(),
            token,
        });
        self.next_id = self.next_id.max(snapshot.id.0 + 1);
        Ok(())
    }

    /// Raises the id counter, never lowers it.
    pub fn reserve_ids_below(&mut self, next_id: u64) {
        self.next_id = self.next_id.max(next_id);
    }

    fn insert(&mut self, player: Player) -> &Player {
        let id = player.id;
        self.by_token.insert(player.token.clone(), id);
        self.by_name.insert((player.map_id.clone(), player.name.clone()), id);
        self.players.entry(id).or_insert(player)
    }

    /// Looks a player up by raw token, checking its format first.
    pub fn find_by_token(&self, raw: &str) -> Result<&Player, GameError> {
        let token = Token::parse(raw)?;
        self.by_token
            .get(&token)
            .and_then(|id| self.players.get(id))
            .ok_or(GameError::UnknownToken)
    }

    pub fn find_by_id(&self, id: DogId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn find_by_name(&self, map_id: &MapId, name: &str) -> Option<&Player> {
        self.by_name
            .get(&(map_id.clone(), name.to_string()))
            .and_then(|id| self.players.get(id))
    }

    /// Players that joined `map_id`, ordered by id.
    pub fn players_on<'a>(&'a self, map_id: &'a MapId) -> impl Iterator<Item = &'a Player> + 'a {
        self.players.values().filter(move |p| &p.map_id == map_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
