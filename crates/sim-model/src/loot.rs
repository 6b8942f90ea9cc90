//! Loot Types
//!
//! The per-map loot catalog and the loot instances lying on roads or
//! carried in bags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{LootId, LootTypeId, Vec2};

/// One entry of a map's loot catalog.
///
/// Only `value` matters to the simulation. Everything else (model file,
/// colour, scale, ...) is kept verbatim for clients that render the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Score awarded for delivering one item of this type to a base.
    pub value: u64,
    #[serde(flatten)]
    pub presentation: BTreeMap<String, serde_json::Value>,
}

impl LootType {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: Some(name.into()),
            value,
            presentation: BTreeMap::new(),
        }
    }
}

/// A loot instance lying somewhere on the road network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LootItem {
    pub id: LootId,
    #[serde(rename = "type")]
    pub loot_type: LootTypeId,
    pub position: Vec2,
}

/// A loot instance carried in a dog's bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagItem {
    pub id: LootId,
    #[serde(rename = "type")]
    pub loot_type: LootTypeId,
}

impl From<&LootItem> for BagItem {
    fn from(item: &LootItem) -> Self {
        Self {
            id: item.id,
            loot_type: item.loot_type,
        }
    }
}
