//! Snapshot Types
//!
//! Serialization structs for persisted game state.
//!
//! A snapshot captures everything needed to resume play after a restart:
//! the player registry, and per session the dogs, the loot pool, the loot
//! id counter and the loot generator's accumulated time. Restoring from a
//! snapshot reproduces ids, scores and bags exactly.

use serde::{Deserialize, Serialize};

use crate::{BagItem, Direction, DogId, LootId, LootItem, MapId, Vec2};

/// Layout version written into every snapshot.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Complete persisted game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub version: u32,
    /// Id the next joining player will receive.
    pub next_player_id: u64,
    #[serde(default)]
    pub players: Vec<PlayerSnapshot>,
    #[serde(default)]
    pub sessions: Vec<SessionSnapshot>,
}

impl GameSnapshot {
    /// Empty snapshot of the current layout version.
    pub fn empty() -> Self {
        Self {
            version: SNAPSHOT_FORMAT_VERSION,
            next_player_id: 0,
            players: Vec::new(),
            sessions: Vec::new(),
        }
    }
}

/// Player registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: DogId,
    pub name: String,
    pub map_id: MapId,
    pub token: String,
}

/// One map's session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub map_id: MapId,
    pub time_since_save_ms: u64,
    /// Time the loot generator has waited without producing loot.
    #[serde(default)]
    pub time_without_loot_ms: u64,
    pub next_loot_id: LootId,
    #[serde(default)]
    pub dogs: Vec<DogSnapshot>,
    #[serde(default)]
    pub loot: Vec<LootItem>,
}

/// One dog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DogSnapshot {
    pub id: DogId,
    pub name: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub direction: Direction,
    #[serde(default)]
    pub bag: Vec<BagItem>,
    pub score: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LootTypeId;

    fn sample_snapshot() -> GameSnapshot {
        GameSnapshot {
            version: SNAPSHOT_FORMAT_VERSION,
            next_player_id: 2,
            players: vec![PlayerSnapshot {
                id: DogId(1),
                name: "Rex".to_string(),
                map_id: MapId::new("map1"),
                token: "0123456789abcdef0123456789abcdef".to_string(),
            }],
            sessions: vec![SessionSnapshot {
                map_id: MapId::new("map1"),
                time_since_save_ms: 1500,
                time_without_loot_ms: 250,
                next_loot_id: LootId(3),
                dogs: vec![DogSnapshot {
                    id: DogId(1),
                    name: "Rex".to_string(),
                    position: Vec2::new(1.5, 0.0),
                    velocity: Vec2::new(1.0, 0.0),
                    direction: Direction::East,
                    bag: vec![BagItem {
                        id: LootId(0),
                        loot_type: LootTypeId(1),
                    }],
                    score: 40,
                }],
                loot: vec![LootItem {
                    id: LootId(2),
                    loot_type: LootTypeId(0),
                    position: Vec2::new(4.0, 0.25),
                }],
            }],
        }
    }

    #[test]
    fn test_snapshot_json_layout() {
        let json = serde_json::to_value(sample_snapshot()).unwrap();

        assert_eq!(json["version"], 1);
        assert_eq!(json["players"][0]["map_id"], "map1");
        assert_eq!(json["sessions"][0]["next_loot_id"], 3);
        assert_eq!(json["sessions"][0]["dogs"][0]["direction"], "R");
        assert_eq!(json["sessions"][0]["dogs"][0]["bag"][0]["type"], 1);
        assert_eq!(json["sessions"][0]["loot"][0]["position"]["y"], 0.25);
    }

    #[test]
    fn test_snapshot_missing_collections_default() {
        let json = r#"{
            "version": 1,
            "next_player_id": 0,
            "sessions": [{
                "map_id": "town",
                "time_since_save_ms": 0,
                "next_loot_id": 0
            }]
        }"#;

        let snapshot: GameSnapshot = serde_json::from_str(json).unwrap();

        assert!(snapshot.players.is_empty());
        assert!(snapshot.sessions[0].dogs.is_empty());
        assert!(snapshot.sessions[0].loot.is_empty());
        assert_eq!(snapshot.sessions[0].time_without_loot_ms, 0);
    }
}
