//! Identifier Types
//!
//! Numeric ids for dogs, loot instances and loot types. Ids serialize as
//! plain integers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a dog. Doubles as the owning player's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DogId(pub u64);

/// Identifies one loot instance within a session. Allocated in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LootId(pub u64);

impl LootId {
    /// The id following this one.
    pub fn next(self) -> LootId {
        LootId(self.0 + 1)
    }
}

/// Index into a map's loot-type catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LootTypeId(pub usize);

impl fmt::Display for DogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for LootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for LootTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_integers() {
        assert_eq!(serde_json::to_string(&DogId(7)).unwrap(), "7");
        assert_eq!(serde_json::to_string(&LootId(12)).unwrap(), "12");
        assert_eq!(serde_json::from_str::<LootTypeId>("2").unwrap(), LootTypeId(2));
    }

    #[test]
    fn test_loot_id_next() {
        assert_eq!(LootId(0).next(), LootId(1));
        assert!(LootId(3) < LootId(3).next());
    }
}
