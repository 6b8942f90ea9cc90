//! Direction Types
//!
//! Facing directions and the move commands players send. Symbols follow the
//! client protocol: `U`, `D`, `L`, `R`, and an empty string for "stop".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Vec2;

/// Facing direction of a dog.
///
/// Map coordinates grow downwards, so `North` points to negative y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "U")]
    North,
    #[serde(rename = "D")]
    South,
    #[serde(rename = "L")]
    West,
    #[serde(rename = "R")]
    East,
}

impl Direction {
    /// Protocol symbol for this direction.
    pub fn symbol(self) -> &'static str {
        match self {
            Direction::North => "U",
            Direction::South => "D",
            Direction::West => "L",
            Direction::East => "R",
        }
    }

    /// Velocity of magnitude `speed` pointing this way.
    pub fn velocity(self, speed: f64) -> Vec2 {
        match self {
            Direction::North => Vec2::new(0.0, -speed),
            Direction::South => Vec2::new(0.0, speed),
            Direction::West => Vec2::new(-speed, 0.0),
            Direction::East => Vec2::new(speed, 0.0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A movement order for one dog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCommand {
    /// Start moving at map speed and face `Direction`.
    Go(Direction),
    /// Stop in place, keeping the current facing.
    Stop,
}

/// Error for an unrecognized move symbol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown move symbol {0:?}")]
pub struct ParseDirectionError(pub String);

impl FromStr for MoveCommand {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "U" => Ok(MoveCommand::Go(Direction::North)),
            "D" => Ok(MoveCommand::Go(Direction::South)),
            "L" => Ok(MoveCommand::Go(Direction::West)),
            "R" => Ok(MoveCommand::Go(Direction::East)),
            "" => Ok(MoveCommand::Stop),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move_commands() {
        assert_eq!("U".parse::<MoveCommand>(), Ok(MoveCommand::Go(Direction::North)));
        assert_eq!("R".parse::<MoveCommand>(), Ok(MoveCommand::Go(Direction::East)));
        assert_eq!("".parse::<MoveCommand>(), Ok(MoveCommand::Stop));
        assert_eq!(
            "X".parse::<MoveCommand>(),
            Err(ParseDirectionError("X".to_string()))
        );
        assert!("u".parse::<MoveCommand>().is_err());
    }

    #[test]
    fn test_direction_velocity() {
        assert_eq!(Direction::North.velocity(2.0), Vec2::new(0.0, -2.0));
        assert_eq!(Direction::South.velocity(2.0), Vec2::new(0.0, 2.0));
        assert_eq!(Direction::West.velocity(1.5), Vec2::new(-1.5, 0.0));
        assert_eq!(Direction::East.velocity(1.5), Vec2::new(1.5, 0.0));
    }

    #[test]
    fn test_direction_serialization() {
        assert_eq!(serde_json::to_string(&Direction::West).unwrap(), r#""L""#);
        assert_eq!(
            serde_json::from_str::<Direction>(r#""D""#).unwrap(),
            Direction::South
        );
        assert_eq!(Direction::default(), Direction::North);
        assert_eq!(Direction::East.to_string(), "R");
    }
}
