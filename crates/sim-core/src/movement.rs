//! Movement Resolution
//!
//! Advances a dog along the road network. The unconstrained displacement is
//! clamped separately into every road the dog currently stands on, and the
//! candidate that travels furthest wins, so a dog at a junction keeps going
//! along the open road instead of stopping at the dead end of the other.

use sim_model::{Bounds, Map, Vec2};
use std::time::Duration;

/// Position and velocity after one movement step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Clamps `target` into `bounds` one axis at a time. Every axis that hits
/// an edge loses its velocity component; the other axis is left alone.
pub fn clamp_to_bounds(target: Vec2, velocity: Vec2, bounds: &Bounds) -> Motion {
    let (x, vx) = clamp_axis(target.x, velocity.x, bounds.min.x, bounds.max.x);
    let (y, vy) = clamp_axis(target.y, velocity.y, bounds.min.y, bounds.max.y);
    Motion {
        position: Vec2::new(x, y),
        velocity: Vec2::new(vx, vy),
    }
}

fn clamp_axis(value: f64, speed: f64, min: f64, max: f64) -> (f64, f64) {
    if value <= min {
        (min, 0.0)
    } else if value >= max {
        (max, 0.0)
    } else {
        (value, speed)
    }
}

/// Computes where a dog at `position` moving with `velocity` ends up after
/// `elapsed`, staying on the roads of `map`.
///
/// Among the roads containing the starting position, the clamped result
/// furthest from the start is chosen. Equal distances prefer the faster
/// result, and a full tie keeps the road that comes first in the map.
/// A dog that is on no road at all stays where it is and stops.
pub fn resolve(position: Vec2, velocity: Vec2, elapsed: Duration, map: &Map) -> Motion {
    let target = position + velocity * elapsed.as_secs_f64();
    let bounds = map.road_bounds();

    let mut best: Option<(Motion, f64, f64)> = None;
    for index in map.roads_containing(position) {
        let candidate = clamp_to_bounds(target, velocity, &bounds[index]);
        let distance = candidate.position.distance(position);
        let speed = candidate.velocity.length();

        let better = match &best {
            None => true,
            Some((_, best_distance, best_speed)) => {
                distance > *best_distance || (distance == *best_distance && speed > *best_speed)
            }
        };
        if better {
            best = Some((candidate, distance, speed));
        }
    }

    match best {
        Some((motion, _, _)) => motion,
        None => Motion {
            position,
            velocity: Vec2::ZERO,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_model::{GridPoint, LootType, MapId, Road};

    /// Horizontal road (0,0)-(10,0) joined by a vertical road (10,0)-(10,10).
    fn corner_map() -> Map {
        let mut map = Map::new(MapId::new("corner"), "Corner");
        map.add_road(Road::horizontal(GridPoint::new(0, 0), 10));
        map.add_road(Road::vertical(GridPoint::new(10, 0), 10));
        map.set_loot_types(vec![LootType::new("key", 1)]);
        map
    }

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_mid_road_movement_is_unclamped() {
        let map = corner_map();

        let motion = resolve(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Duration::from_millis(500),
            &map,
        );

        assert_eq!(motion.position, Vec2::new(0.5, 0.0));
        assert_eq!(motion.velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_dead_end_stops_dog() {
        let map = corner_map();

        let motion = resolve(
            Vec2::new(2.0, 0.0),
            Vec2::new(-4.0, 0.0),
            Duration::from_secs(1),
            &map,
        );

        assert!(approx(motion.position, Vec2::new(-0.4, 0.0)));
        assert_eq!(motion.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_side_wall_only_stops_one_axis() {
        let bounds = Bounds::from_corners(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)).padded(0.5);

        let motion = clamp_to_bounds(Vec2::new(4.0, 2.0), Vec2::new(1.0, 2.0), &bounds);

        assert_eq!(motion.position, Vec2::new(4.0, 0.5));
        assert_eq!(motion.velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_junction_turn_follows_open_road() {
        let map = corner_map();

        let motion = resolve(
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 2.0),
            Duration::from_secs(1),
            &map,
        );

        assert_eq!(motion.position, Vec2::new(10.0, 2.0));
        assert_eq!(motion.velocity, Vec2::new(0.0, 2.0));
    }

    #[test]
    fn test_equal_distance_prefers_faster_result() {
        let map = corner_map();

        // The horizontal road clamps exactly at its edge (speed drops to zero),
        // the vertical road lets the dog continue: same distance, higher speed.
        let motion = resolve(
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 0.4),
            Duration::from_secs(1),
            &map,
        );

        assert_eq!(motion.position, Vec2::new(10.0, 0.4));
        assert_eq!(motion.velocity, Vec2::new(0.0, 0.4));
    }

    #[test]
    fn test_full_tie_keeps_first_road() {
        let map = corner_map();

        // Both roads end at x = 10.4: equal distance, both stopped.
        let motion = resolve(
            Vec2::new(10.0, 0.0),
            Vec2::new(3.0, 0.0),
            Duration::from_secs(1),
            &map,
        );

        assert!(approx(motion.position, Vec2::new(10.4, 0.0)));
        assert_eq!(motion.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_off_road_dog_stops_in_place() {
        let map = corner_map();

        let motion = resolve(
            Vec2::new(5.0, 5.0),
            Vec2::new(1.0, 0.0),
            Duration::from_secs(1),
            &map,
        );

        assert_eq!(motion.position, Vec2::new(5.0, 5.0));
        assert_eq!(motion.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_standing_dog_does_not_move() {
        let map = corner_map();

        let motion = resolve(Vec2::new(3.0, 0.0), Vec2::ZERO, Duration::from_secs(5), &map);

        assert_eq!(motion.position, Vec2::new(3.0, 0.0));
        assert_eq!(motion.velocity, Vec2::ZERO);
    }
}
