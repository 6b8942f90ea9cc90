//! Map Types
//!
//! Immutable per-map geometry: roads with their precomputed movement bounds,
//! decorative buildings, offices (bases), movement speed, bag capacity and
//! the loot catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Bounds, GridPoint, LootType, LootTypeId, Vec2, ROAD_HALF_WIDTH};

/// Dog speed used when neither the map nor the game config sets one.
pub const DEFAULT_DOG_SPEED: f64 = 1.0;

/// Bag capacity used when neither the map nor the game config sets one.
pub const DEFAULT_BAG_CAPACITY: usize = 3;

/// Errors raised while assembling a map.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("road from {start:?} to {end:?} is not axis-aligned")]
    DiagonalRoad { start: GridPoint, end: GridPoint },
    #[error("duplicate office id {0:?}")]
    DuplicateOffice(String),
    #[error("map {0:?} has no roads")]
    NoRoads(String),
    #[error("map {0:?} has an empty loot catalog")]
    NoLootTypes(String),
    #[error("map {map:?} has invalid dog speed {speed}")]
    InvalidSpeed { map: String, speed: f64 },
}

/// Map identifier as used in configuration and join requests.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(pub String);

impl MapId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MapId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A horizontal or vertical road segment between two grid points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Road {
    start: GridPoint,
    end: GridPoint,
}

impl Road {
    /// Builds a road, rejecting diagonal segments.
    pub fn new(start: GridPoint, end: GridPoint) -> Result<Self, MapError> {
        if start.x != end.x && start.y != end.y {
            return Err(MapError::DiagonalRoad { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn horizontal(start: GridPoint, end_x: i64) -> Self {
        Self {
            start,
            end: GridPoint::new(end_x, start.y),
        }
    }

    pub fn vertical(start: GridPoint, end_y: i64) -> Self {
        Self {
            start,
            end: GridPoint::new(start.x, end_y),
        }
    }

    pub fn start(&self) -> GridPoint {
        self.start
    }

    pub fn end(&self) -> GridPoint {
        self.end
    }

    pub fn is_horizontal(&self) -> bool {
        self.start.y == self.end.y
    }

    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }

    /// The area a dog may occupy while on this road.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_corners(self.start.to_world(), self.end.to_world()).padded(ROAD_HALF_WIDTH)
    }

    /// Point on the centre line, `fraction` of the way from start to end.
    pub fn point_at(&self, fraction: f64) -> Vec2 {
        let start = self.start.to_world();
        start + (self.end.to_world() - start) * fraction.clamp(0.0, 1.0)
    }
}

/// Decorative building. Not collidable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub position: GridPoint,
    pub width: i64,
    pub height: i64,
}

/// An office: the base where carried loot turns into score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Office {
    pub id: String,
    pub position: GridPoint,
    /// Sprite offset, used only by clients.
    pub offset: GridPoint,
}

/// A complete, immutable map definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    id: MapId,
    name: String,
    roads: Vec<Road>,
    /// Movement bounds, indexed like `roads`.
    road_bounds: Vec<Bounds>,
    buildings: Vec<Building>,
    offices: Vec<Office>,
    dog_speed: f64,
    bag_capacity: usize,
    loot_types: Vec<LootType>,
}

impl Map {
    pub fn new(id: MapId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            roads: Vec::new(),
            road_bounds: Vec::new(),
            buildings: Vec::new(),
            offices: Vec::new(),
            dog_speed: DEFAULT_DOG_SPEED,
            bag_capacity: DEFAULT_BAG_CAPACITY,
            loot_types: Vec::new(),
        }
    }

    pub fn add_road(&mut self, road: Road) {
        self.road_bounds.push(road.bounds());
        self.roads.push(road);
    }

    pub fn add_building(&mut self, building: Building) {
        self.buildings.push(building);
    }

    pub fn add_office(&mut self, office: Office) -> Result<(), MapError> {
        if self.offices.iter().any(|o| o.id == office.id) {
            return Err(MapError::DuplicateOffice(office.id));
        }
        self.offices.push(office);
        Ok(())
    }

    pub fn set_dog_speed(&mut self, speed: f64) -> Result<(), MapError> {
        if !speed.is_finite() || speed < 0.0 {
            return Err(MapError::InvalidSpeed {
                map: self.id.0.clone(),
                speed,
            });
        }
        self.dog_speed = speed;
        Ok(())
    }

    pub fn set_bag_capacity(&mut self, capacity: usize) {
        self.bag_capacity = capacity;
    }

    pub fn set_loot_types(&mut self, loot_types: Vec<LootType>) {
        self.loot_types = loot_types;
    }

    /// Checks the map is playable: at least one road and one loot type.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.roads.is_empty() {
            return Err(MapError::NoRoads(self.id.0.clone()));
        }
        if self.loot_types.is_empty() {
            return Err(MapError::NoLootTypes(self.id.0.clone()));
        }
        Ok(())
    }

    pub fn id(&self) -> &MapId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn road_bounds(&self) -> &[Bounds] {
        &self.road_bounds
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn offices(&self) -> &[Office] {
        &self.offices
    }

    pub fn dog_speed(&self) -> f64 {
        self.dog_speed
    }

    pub fn bag_capacity(&self) -> usize {
        self.bag_capacity
    }

    pub fn loot_types(&self) -> &[LootType] {
        &self.loot_types
    }

    /// Score value of a loot type, if the catalog has it.
    pub fn loot_value(&self, loot_type: LootTypeId) -> Option<u64> {
        self.loot_types.get(loot_type.0).map(|t| t.value)
    }

    /// Indices of every road whose bounds contain `position`, in map order.
    pub fn roads_containing(&self, position: Vec2) -> impl Iterator<Item = usize> + '_ {
        self.road_bounds
            .iter()
            .enumerate()
            .filter(move |(_, bounds)| bounds.contains(position))
            .map(|(index, _)| index)
    }

    /// Default spawn point: the start of the first road.
    pub fn spawn_point(&self) -> Option<Vec2> {
        self.roads.first().map(|road| road.start().to_world())
    }

    /// True when `position` lies on at least one road.
    pub fn is_on_road(&self, position: Vec2) -> bool {
        self.road_bounds.iter().any(|bounds| bounds.contains(position))
    }
}
