//! Dog
//!
//! Mutable per-player state: position, last tick's position, velocity,
//! facing, carried loot and score.

use sim_model::{BagItem, Direction, DogId, DogSnapshot, MoveCommand, Vec2};

/// One player's avatar inside a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Dog {
    id: DogId,
    name: String,
    position: Vec2,
    prev_position: Vec2,
    velocity: Vec2,
    direction: Direction,
    bag: Vec<BagItem>,
    score: u64,
}

impl Dog {
    /// A standing dog facing north.
    pub fn new(id: DogId, name: impl Into<String>, position: Vec2) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            prev_position: position,
            velocity: Vec2::ZERO,
            direction: Direction::North,
            bag: Vec::new(),
            score: 0,
        }
    }

    /// Rebuilds a dog exactly as it was saved.
    pub fn from_snapshot(snapshot: &DogSnapshot) -> Self {
        Self {
            id: snapshot.id,
            name: snapshot.name.clone(),
            position: snapshot.position,
            prev_position: snapshot.position,
            velocity: snapshot.velocity,
            direction: snapshot.direction,
            bag: snapshot.bag.clone(),
            score: snapshot.score,
        }
    }

    pub fn to_snapshot(&self) -> DogSnapshot {
        DogSnapshot {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            velocity: self.velocity,
            direction: self.direction,
            bag: self.bag.clone(),
            score: self.score,
        }
    }

    pub fn id(&self) -> DogId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Position at the start of the last tick.
    pub fn prev_position(&self) -> Vec2 {
        self.prev_position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn bag(&self) -> &[BagItem] {
        &self.bag
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Applies a move order at the given map speed.
    pub fn apply_move(&mut self, command: MoveCommand, speed: f64) {
        match command {
            MoveCommand::Go(direction) => {
                self.direction = direction;
                self.velocity = direction.velocity(speed);
            }
            MoveCommand::Stop => self.velocity = Vec2::ZERO,
        }
    }

    /// Records the new end-of-tick position and velocity.
    pub fn set_motion(&mut self, position: Vec2, velocity: Vec2) {
        self.prev_position = self.position;
        self.position = position;
        self.velocity = velocity;
    }

    /// Puts an item in the bag unless it already holds `capacity` items.
    /// Returns whether the item was taken.
    pub fn try_pick_up(&mut self, item: BagItem, capacity: usize) -> bool {
        if self.bag.len() >= capacity {
            return false;
        }
        self.bag.push(item);
        true
    }

    pub fn is_bag_full(&self, capacity: usize) -> bool {
        self.bag.len() >= capacity
    }

    /// Empties the bag, adding `value_of(item)` to the score for every
    /// carried item. Returns the points gained.
    pub fn deliver(&mut self, mut value_of: impl FnMut(&BagItem) -> u64) -> u64 {
        let gained: u64 = self.bag.iter().map(&mut value_of).sum();
        self.score += gained;
        self.bag.clear();
        gained
    }
}
