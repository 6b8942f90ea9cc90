//! Collision Detection
//!
//! Finds which items each gatherer passes close enough to during one tick.
//! A gatherer is the segment from a dog's pre-tick to post-tick position
//! plus an interaction radius; an item is a point with its own radius.

use sim_model::{DogId, LootId, Vec2};

/// Interaction width of a dog.
pub const DOG_WIDTH: f64 = 0.6;

/// Interaction width of a loot item (a point target).
pub const LOOT_WIDTH: f64 = 0.0;

/// Interaction width of an office.
pub const OFFICE_WIDTH: f64 = 0.5;

/// What an item stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// A collectible loot instance.
    Loot(LootId),
    /// A base, identified by its index in the map's office list. Never
    /// collected; reaching it settles the gatherer's bag.
    Base(usize),
}

/// A stationary target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    pub position: Vec2,
    pub width: f64,
}

/// A moving dog for the duration of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gatherer {
    pub id: DogId,
    pub start: Vec2,
    pub end: Vec2,
    pub width: f64,
}

/// A proximity encounter detected during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatheringEvent {
    pub item: ItemKind,
    pub gatherer_id: DogId,
    /// Squared distance from the item to the gatherer's path.
    pub sq_distance: f64,
    /// Fraction of the tick's path covered at the closest approach, in `[0, 1]`.
    pub time: f64,
}

impl GatheringEvent {
    pub fn is_base(&self) -> bool {
        matches!(self.item, ItemKind::Base(_))
    }
}

/// Projection of a point onto a movement segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectionResult {
    /// Squared distance from the point to its projection.
    pub sq_distance: f64,
    /// Position of the projection along the segment, as a fraction of its length.
    pub proj_ratio: f64,
}

impl CollectionResult {
    pub fn is_collected(&self, collect_radius: f64) -> bool {
        self.proj_ratio >= 0.0
            && self.proj_ratio <= 1.0
            && self.sq_distance <= collect_radius * collect_radius
    }
}

/// Projects `c` onto the line through `a` and `b`.
///
/// `a` and `b` must differ.
pub fn try_collect_point(a: Vec2, b: Vec2, c: Vec2) -> CollectionResult {
    let u = c - a;
    let v = b - a;
    let u_dot_v = u.dot(v);
    let v_len2 = v.dot(v);

    CollectionResult {
        sq_distance: u.dot(u) - (u_dot_v * u_dot_v) / v_len2,
        proj_ratio: u_dot_v / v_len2,
    }
}

/// Reports every gatherer/item encounter, ordered by the time of closest
/// approach. Encounters at the same time keep gatherer order, then item
/// order. Gatherers that did not move collect nothing.
pub fn find_gather_events(gatherers: &[Gatherer], items: &[Item]) -> Vec<GatheringEvent> {
    let mut events = Vec::new();

    for gatherer in gatherers {
        if gatherer.start == gatherer.end {
            continue;
        }
        for item in items {
            let result = try_collect_point(gatherer.start, gatherer.end, item.position);
            if result.is_collected(gatherer.width + item.width) {
                events.push(GatheringEvent {
                    item: item.kind,
                    gatherer_id: gatherer.id,
                    sq_distance: result.sq_distance,
                    time: result.proj_ratio,
                });
            }
        }
    }

    events.sort_by(|a, b| a.time.total_cmp(&b.time));
    events
}
