//! Shared world model and snapshot layout for the dog gathering game.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod direction;
pub mod geom;
pub mod ids;
pub mod loot;
pub mod map;
pub mod snapshot;

// Re-export geometry types
pub use geom::{Bounds, GridPoint, Vec2, ROAD_HALF_WIDTH};

// Re-export id types
pub use ids::{DogId, LootId, LootTypeId};

// Re-export movement types
pub use direction::{Direction, MoveCommand, ParseDirectionError};

// Re-export loot types
pub use loot::{BagItem, LootItem, LootType};

// Re-export map types
pub use map::{
    Building, Map, MapError, MapId, Office, Road, DEFAULT_BAG_CAPACITY, DEFAULT_DOG_SPEED,
};

// Re-export snapshot types
pub use snapshot::{
    DogSnapshot, GameSnapshot, PlayerSnapshot, SessionSnapshot, SNAPSHOT_FORMAT_VERSION,
};
