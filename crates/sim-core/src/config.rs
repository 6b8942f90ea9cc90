//! Configuration loading for the game.
//!
//! Maps and the global loot generator settings are loaded from a JSON file
//! (camelCase keys). A TOML file with the same keys is accepted as well.

use serde::{Deserialize, Serialize};
use sim_model::{Building, GridPoint, LootType, Map, MapId, Office, Road};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Complete game configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Dog speed for maps that do not set their own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_dog_speed: Option<f64>,
    /// Bag capacity for maps that do not set their own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_bag_capacity: Option<usize>,
    /// Loot generator settings shared by every map
    pub loot_generator_config: LootGeneratorConfig,
    #[serde(default)]
    pub maps: Vec<MapConfig>,
}

/// Loot generator settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LootGeneratorConfig {
    /// Base interval in seconds
    pub period: f64,
    /// Chance that loot appears within one base interval
    pub probability: f64,
}

impl LootGeneratorConfig {
    /// The period as a duration. Periods that do not fit saturate.
    pub fn base_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.period.max(0.0)).unwrap_or(Duration::MAX)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Duration::try_from_secs_f64(self.period).map_err(|e| {
            ConfigError::Invalid(format!(
                "loot generator period must be a representable non-negative number of seconds, got {}: {e}",
                self.period
            ))
        })?;
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(ConfigError::Invalid(format!(
                "loot generator probability must be within [0, 1], got {}",
                self.probability
            )));
        }
        Ok(())
    }
}

impl Default for LootGeneratorConfig {
    fn default() -> Self {
        Self {
            period: 5.0,
            probability: 0.5,
        }
    }
}

/// One map as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dog_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bag_capacity: Option<usize>,
    #[serde(default)]
    pub loot_types: Vec<LootType>,
    #[serde(default)]
    pub roads: Vec<RoadConfig>,
    #[serde(default)]
    pub buildings: Vec<BuildingConfig>,
    #[serde(default)]
    pub offices: Vec<OfficeConfig>,
}

/// A road: `x1` makes it horizontal, `y1` vertical.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoadConfig {
    pub x0: i64,
    pub y0: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x1: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y1: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BuildingConfig {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeConfig {
    pub id: String,
    pub x: i64,
    pub y: i64,
    #[serde(default)]
    pub offset_x: i64,
    #[serde(default)]
    pub offset_y: i64,
}

impl RoadConfig {
    fn to_road(self) -> Result<Road, ConfigError> {
        let start = GridPoint::new(self.x0, self.y0);
        match (self.x1, self.y1) {
            (Some(x1), None) => Ok(Road::horizontal(start, x1)),
            (None, Some(y1)) => Ok(Road::vertical(start, y1)),
            (Some(x1), Some(y1)) => Ok(Road::new(start, GridPoint::new(x1, y1))?),
            (None, None) => Err(ConfigError::Invalid(format!(
                "road starting at ({}, {}) has neither x1 nor y1",
                self.x0, self.y0
            ))),
        }
    }
}

impl GameConfig {
    /// Loads configuration from a `.json` or `.toml` file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Parses configuration from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.loot_generator_config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.loot_generator_config.validate()?;
        Ok(config)
    }

    /// Builds validated maps, applying the game-wide defaults.
    pub fn build_maps(&self) -> Result<Vec<Map>, ConfigError> {
        let mut maps = Vec::with_capacity(self.maps.len());
        for map_config in &self.maps {
            if maps.iter().any(|m: &Map| m.id().as_str() == map_config.id) {
                return Err(ConfigError::Invalid(format!("duplicate map id {:?}", map_config.id)));
            }
            maps.push(self.build_map(map_config)?);
        }
        Ok(maps)
    }

    fn build_map(&self, config: &MapConfig) -> Result<Map, ConfigError> {
        let mut map = Map::new(MapId::new(config.id.clone()), config.name.clone());

        for road in &config.roads {
            map.add_road(road.to_road()?);
        }
        for building in &config.buildings {
            map.add_building(Building {
                position: GridPoint::new(building.x, building.y),
                width: building.w,
                height: building.h,
            });
        }
        for office in &config.offices {
            map.add_office(Office {
                id: office.id.clone(),
                position: GridPoint::new(office.x, office.y),
                offset: GridPoint::new(office.offset_x, office.offset_y),
            })?;
        }

        if let Some(speed) = config.dog_speed.or(self.default_dog_speed) {
            map.set_dog_speed(speed)?;
        }
        if let Some(capacity) = config.bag_capacity.or(self.default_bag_capacity) {
            map.set_bag_capacity(capacity);
        }
        map.set_loot_types(config.loot_types.clone());

        map.validate()?;
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_model::{MapError, Vec2, DEFAULT_BAG_CAPACITY};

    const SAMPLE: &str = r#"{
        "defaultDogSpeed": 3.0,
        "lootGeneratorConfig": { "period": 5.0, "probability": 0.5 },
        "maps": [
            {
                "id": "map1",
                "name": "Map 1",
                "bagCapacity": 5,
                "lootTypes": [
                    { "name": "key", "file": "assets/key.obj", "type": "obj", "value": 10 },
                    { "name": "wallet", "value": 30 }
                ],
                "roads": [
                    { "x0": 0, "y0": 0, "x1": 40 },
                    { "x0": 40, "y0": 0, "y1": 30 }
                ],
                "buildings": [ { "x": 5, "y": 5, "w": 30, "h": 20 } ],
                "offices": [ { "id": "o0", "x": 40, "y": 30, "offsetX": 5, "offsetY": 0 } ]
            },
            {
                "id": "town",
                "name": "Town",
                "dogSpeed": 1.5,
                "lootTypes": [ { "value": 1 } ],
                "roads": [ { "x0": 0, "y0": 0, "y1": 10 } ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample_config() {
        let config = GameConfig::from_json_str(SAMPLE).unwrap();
        let maps = config.build_maps().unwrap();

        assert_eq!(maps.len(), 2);

        let map1 = &maps[0];
        assert_eq!(map1.id().as_str(), "map1");
        assert_eq!(map1.roads().len(), 2);
        assert!(map1.roads()[0].is_horizontal());
        assert!(map1.roads()[1].is_vertical());
        assert_eq!(map1.buildings().len(), 1);
        assert_eq!(map1.offices()[0].offset, GridPoint::new(5, 0));
        assert_eq!(map1.dog_speed(), 3.0);
        assert_eq!(map1.bag_capacity(), 5);
        assert_eq!(map1.loot_types()[1].value, 30);

        let town = &maps[1];
        assert_eq!(town.dog_speed(), 1.5);
        assert_eq!(town.bag_capacity(), DEFAULT_BAG_CAPACITY);
        assert_eq!(town.spawn_point(), Some(Vec2::ZERO));
    }

    #[test]
    fn test_loot_generator_period_is_seconds() {
        let config = GameConfig::from_json_str(SAMPLE).unwrap();

        assert_eq!(config.loot_generator_config.base_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let json = r#"{ "lootGeneratorConfig": { "period": 1.0, "probability": 1.5 }, "maps": [] }"#;

        assert!(matches!(
            GameConfig::from_json_str(json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_unrepresentable_period_rejected() {
        for period in ["1e20", "-1.0"] {
            let json = format!(
                r#"{{ "lootGeneratorConfig": {{ "period": {period}, "probability": 0.5 }}, "maps": [] }}"#
            );

            assert!(matches!(
                GameConfig::from_json_str(&json),
                Err(ConfigError::Invalid(_))
            ));
        }
    }

    #[test]
    fn test_road_without_end_rejected() {
        let json = r#"{
            "lootGeneratorConfig": { "period": 1.0, "probability": 0.5 },
            "maps": [ { "id": "m", "name": "M", "lootTypes": [ { "value": 1 } ], "roads": [ { "x0": 0, "y0": 0 } ] } ]
        }"#;

        let config = GameConfig::from_json_str(json).unwrap();
        assert!(matches!(config.build_maps(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_map_without_loot_types_rejected() {
        let json = r#"{
            "lootGeneratorConfig": { "period": 1.0, "probability": 0.5 },
            "maps": [ { "id": "m", "name": "M", "roads": [ { "x0": 0, "y0": 0, "x1": 5 } ] } ]
        }"#;

        let config = GameConfig::from_json_str(json).unwrap();
        assert!(matches!(
            config.build_maps(),
            Err(ConfigError::Map(MapError::NoLootTypes(_)))
        ));
    }

    #[test]
    fn test_duplicate_map_id_rejected() {
        let json = r#"{
            "lootGeneratorConfig": { "period": 1.0, "probability": 0.5 },
            "maps": [
                { "id": "m", "name": "M", "lootTypes": [ { "value": 1 } ], "roads": [ { "x0": 0, "y0": 0, "x1": 5 } ] },
                { "id": "m", "name": "M2", "lootTypes": [ { "value": 1 } ], "roads": [ { "x0": 0, "y0": 0, "x1": 5 } ] }
            ]
        }"#;

        let config = GameConfig::from_json_str(json).unwrap();
        assert!(matches!(config.build_maps(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
            defaultBagCapacity = 2

            [lootGeneratorConfig]
            period = 2.5
            probability = 0.25

            [[maps]]
            id = "meadow"
            name = "Meadow"

            [[maps.lootTypes]]
            name = "bone"
            value = 7

            [[maps.roads]]
            x0 = 0
            y0 = 0
            x1 = 12
        "#;

        let config = GameConfig::from_toml_str(toml).unwrap();
        let maps = config.build_maps().unwrap();

        assert_eq!(config.loot_generator_config.probability, 0.25);
        assert_eq!(maps[0].bag_capacity(), 2);
        assert_eq!(maps[0].loot_types()[0].value, 7);
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.yaml");
        std::fs::write(&path, "maps: []").unwrap();

        assert!(matches!(
            GameConfig::from_file(&path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_from_file_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = GameConfig::from_file(&path).unwrap();
        assert_eq!(config.maps.len(), 2);
    }
}
