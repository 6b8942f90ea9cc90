//! Game Session
//!
//! One running instance of a map: the dogs on it, the loot lying around and
//! the per-tick pipeline that moves dogs, spawns loot and settles pickups
//! and deliveries.

use rand::rngs::SmallRng;
use rand::Rng;
use serde::Serialize;
use sim_model::{
    BagItem, DogId, DogSnapshot, LootId, LootItem, LootTypeId, Map, MoveCommand, SessionSnapshot,
    Vec2,
};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use crate::collision::{
    find_gather_events, Gatherer, GatheringEvent, Item, ItemKind, DOG_WIDTH, LOOT_WIDTH,
    OFFICE_WIDTH,
};
use crate::dog::Dog;
use crate::error::{GameError, PersistenceError};
use crate::loot_gen::LootGenerator;
use crate::movement;

/// What happened during one tick of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Loot items that appeared on the map.
    pub spawned: usize,
    /// Loot items picked up by dogs.
    pub collected: usize,
    /// Office visits that emptied a non-empty bag.
    pub deliveries: usize,
    /// Score awarded by those deliveries.
    pub points: u64,
}

impl TickReport {
    pub fn merge(&mut self, other: TickReport) {
        self.spawned += other.spawned;
        self.collected += other.collected;
        self.deliveries += other.deliveries;
        self.points += other.points;
    }
}

/// Read-only picture of a session for state queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub dogs: Vec<DogSnapshot>,
    pub loot: Vec<LootItem>,
}

/// Uniformly random point on a uniformly random road of `map`.
pub fn random_road_position<R: Rng>(map: &Map, rng: &mut R) -> Option<Vec2> {
    let roads = map.roads();
    if roads.is_empty() {
        return None;
    }
    let road = &roads[rng.gen_range(0..roads.len())];
    Some(road.point_at(rng.gen::<f64>()))
}

/// A map plus the dogs and loot currently on it.
#[derive(Debug)]
pub struct GameSession {
    map: Arc<Map>,
    dogs: BTreeMap<DogId, Dog>,
    loot: BTreeMap<LootId, LootItem>,
    loot_generator: LootGenerator,
    next_loot_id: LootId,
    rng: SmallRng,
    time_since_save: Duration,
}

impl GameSession {
    pub fn new(map: Arc<Map>, loot_generator: LootGenerator, rng: SmallRng) -> Self {
        Self {
            map,
            dogs: BTreeMap::new(),
            loot: BTreeMap::new(),
            loot_generator,
            next_loot_id: LootId(0),
            rng,
            time_since_save: Duration::ZERO,
        }
    }

    /// Rebuilds a session from saved state, checking it against `map`.
    pub fn restore(
        map: Arc<Map>,
        mut loot_generator: LootGenerator,
        rng: SmallRng,
        snapshot: &SessionSnapshot,
    ) -> Result<Self, PersistenceError> {
        if snapshot.map_id != *map.id() {
            return Err(PersistenceError::UnknownMap(snapshot.map_id.clone()));
        }

        let next_loot_id = snapshot.next_loot_id;
        let mut seen_loot = BTreeSet::new();
        let mut check_loot = |id: LootId, loot_type: LootTypeId| {
            if id >= next_loot_id {
                return Err(inconsistent(format!(
                    "loot id {id} is not below next id {next_loot_id}"
                )));
            }
            if !seen_loot.insert(id) {
                return Err(inconsistent(format!("loot id {id} appears twice")));
            }
            if map.loot_value(loot_type).is_none() {
                return Err(inconsistent(format!(
                    "loot type {loot_type} is not in the catalog of map {}",
                    map.id()
                )));
            }
            Ok(())
        };

        let mut loot = BTreeMap::new();
        for item in &snapshot.loot {
            check_loot(item.id, item.loot_type)?;
            loot.insert(item.id, *item);
        }

        let mut dogs = BTreeMap::new();
        for saved in &snapshot.dogs {
            if saved.bag.len() > map.bag_capacity() {
                return Err(inconsistent(format!(
                    "dog {} carries {} items, capacity is {}",
                    saved.id,
                    saved.bag.len(),
                    map.bag_capacity()
                )));
            }
            for item in &saved.bag {
                check_loot(item.id, item.loot_type)?;
            }
            if dogs.insert(saved.id, Dog::from_snapshot(saved)).is_some() {
                return Err(inconsistent(format!("dog {} appears twice", saved.id)));
            }
        }

        loot_generator.set_time_without_loot(Duration::from_millis(snapshot.time_without_loot_ms));

        Ok(Self {
            map,
            dogs,
            loot,
            loot_generator,
            next_loot_id,
            rng,
            time_since_save: Duration::from_millis(snapshot.time_since_save_ms),
        })
    }

    pub fn to_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            map_id: self.map.id().clone(),
            time_since_save_ms: duration_millis(self.time_since_save),
            time_without_loot_ms: duration_millis(self.loot_generator.time_without_loot()),
            next_loot_id: self.next_loot_id,
            dogs: self.dogs.values().map(Dog::to_snapshot).collect(),
            loot: self.loot.values().copied().collect(),
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            dogs: self.dogs.values().map(Dog::to_snapshot).collect(),
            loot: self.loot.values().copied().collect(),
        }
    }

    pub fn map(&self) -> &Arc<Map> {
        &self.map
    }

    /// Adds a dog. An id already present on the map is refused.
    pub fn add_dog(&mut self, dog: Dog) -> Result<(), GameError> {
        match self.dogs.entry(dog.id()) {
            Entry::Occupied(_) => Err(GameError::DuplicatePlayer(dog.id().0)),
            Entry::Vacant(slot) => {
                tracing::debug!("dog {} ({}) joined map {}", dog.id(), dog.name(), self.map.id());
                slot.insert(dog);
                Ok(())
            }
        }
    }

    pub fn dog(&self, id: DogId) -> Option<&Dog> {
        self.dogs.get(&id)
    }

    pub fn dogs(&self) -> impl Iterator<Item = &Dog> {
        self.dogs.values()
    }

    pub fn dog_count(&self) -> usize {
        self.dogs.len()
    }

    /// Sets a dog's velocity and facing. Takes effect on the next tick.
    pub fn move_dog(&mut self, id: DogId, command: MoveCommand) -> Result<(), GameError> {
        let speed = self.map.dog_speed();
        let dog = self.dogs.get_mut(&id).ok_or(GameError::UnknownPlayer(id.0))?;
        dog.apply_move(command, speed);
        Ok(())
    }

    /// Loot lying on the map, ordered by id.
    pub fn available_loot(&self) -> impl Iterator<Item = &LootItem> {
        self.loot.values()
    }

    pub fn loot_count(&self) -> usize {
        self.loot.len()
    }

    pub fn next_loot_id(&self) -> LootId {
        self.next_loot_id
    }

    /// Drops a loot item at a fixed position.
    pub fn place_loot(&mut self, loot_type: LootTypeId, position: Vec2) -> LootId {
        let id = self.next_loot_id;
        self.next_loot_id = id.next();
        self.loot.insert(id, LootItem { id, loot_type, position });
        id
    }

    pub fn time_since_save(&self) -> Duration {
        self.time_since_save
    }

    pub fn reset_time_since_save(&mut self) {
        self.time_since_save = Duration::ZERO;
    }

    /// Advances the session by `delta`: moves dogs, spawns loot, then
    /// settles pickups and deliveries in the order they happened.
    pub fn advance(&mut self, delta: Duration) -> TickReport {
        let mut report = TickReport::default();

        self.move_dogs(delta);
        report.spawned = self.spawn_loot(delta);

        let (gatherers, items) = self.gather_inputs();
        let events = find_gather_events(&gatherers, &items);
        self.settle(&events, &mut report);

        self.time_since_save += delta;
        report
    }

    fn move_dogs(&mut self, delta: Duration) {
        for dog in self.dogs.values_mut() {
            if !self.map.is_on_road(dog.position()) {
                tracing::warn!("dog {} at {} is off every road", dog.id(), dog.position());
            }
            let motion = movement::resolve(dog.position(), dog.velocity(), delta, &self.map);
            dog.set_motion(motion.position, motion.velocity);
        }
    }

    fn spawn_loot(&mut self, delta: Duration) -> usize {
        let count = self
            .loot_generator
            .generate(delta, self.loot.len(), self.dogs.len());
        let type_count = self.map.loot_types().len();
        if count == 0 || type_count == 0 {
            return 0;
        }

        for _ in 0..count {
            let loot_type = LootTypeId(self.rng.gen_range(0..type_count));
            let Some(position) = random_road_position(&self.map, &mut self.rng) else {
                return 0;
            };
            let id = self.place_loot(loot_type, position);
            tracing::debug!("loot {} of type {} spawned at {}", id, loot_type, position);
        }
        count
    }

    fn gather_inputs(&self) -> (Vec<Gatherer>, Vec<Item>) {
        let gatherers = self
            .dogs
            .values()
            .map(|dog| Gatherer {
                id: dog.id(),
                start: dog.prev_position(),
                end: dog.position(),
                width: DOG_WIDTH,
            })
            .collect();

        let loot = self.loot.values().map(|item| Item {
            kind: ItemKind::Loot(item.id),
            position: item.position,
            width: LOOT_WIDTH,
        });
        let offices = self.map.offices().iter().enumerate().map(|(index, office)| Item {
            kind: ItemKind::Base(index),
            position: office.position.to_world(),
            width: OFFICE_WIDTH,
        });

        (gatherers, loot.chain(offices).collect())
    }

    fn settle(&mut self, events: &[GatheringEvent], report: &mut TickReport) {
        let capacity = self.map.bag_capacity();
        let map = Arc::clone(&self.map);

        for event in events {
            let Some(dog) = self.dogs.get_mut(&event.gatherer_id) else {
                continue;
            };
            match event.item {
                ItemKind::Base(_) => {
                    if dog.bag().is_empty() {
                        continue;
                    }
                    let points = dog.deliver(|item| map.loot_value(item.loot_type).unwrap_or(0));
                    report.deliveries += 1;
                    report.points += points;
                    tracing::debug!("dog {} delivered for {} points", dog.id(), points);
                }
                ItemKind::Loot(id) => {
                    if dog.is_bag_full(capacity) {
                        continue;
                    }
                    let Some(item) = self.loot.remove(&id) else {
                        continue;
                    };
                    dog.try_pick_up(BagItem::from(&item), capacity);
                    report.collected += 1;
                    tracing::debug!("dog {} picked up loot {}", dog.id(), id);
                }
            }
        }
    }
}

fn inconsistent(message: String) -> PersistenceError {
    PersistenceError::Inconsistent(message)
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use sim_model::{GridPoint, LootType, MapId, Office, Road};

    fn street_map(capacity: usize) -> Arc<Map> {
        let mut map = Map::new(MapId::new("street"), "Street");
        map.add_road(Road::horizontal(GridPoint::new(0, 0), 10));
        map.add_office(Office {
            id: "o0".to_string(),
            position: GridPoint::new(8, 0),
            offset: GridPoint::new(0, 0),
        })
        .unwrap();
        map.set_loot_types(vec![LootType::new("key", 10), LootType::new("wallet", 30)]);
        map.set_dog_speed(1.0).unwrap();
        map.set_bag_capacity(capacity);
        Arc::new(map)
    }

    fn session(map: Arc<Map>, probability: f64) -> GameSession {
        GameSession::new(
            map,
            LootGenerator::new(Duration::from_secs(5), probability),
            SmallRng::seed_from_u64(42),
        )
    }

    fn dog_at(id: u64, x: f64) -> Dog {
        Dog::new(DogId(id), format!("dog{id}"), Vec2::new(x, 0.0))
    }

    #[test]
    fn test_loot_spawns_for_idle_dogs() {
        let map = street_map(3);
        let mut session = session(Arc::clone(&map), 0.5);
        for id in 0..3 {
            session.add_dog(dog_at(id, 1.0)).unwrap();
        }

        let report = session.advance(Duration::from_secs(5));

        assert!((1..=3).contains(&session.loot_count()));
        assert_eq!(report.spawned, session.loot_count());
        for item in session.available_loot() {
            assert!(map.is_on_road(item.position));
            assert!(map.loot_value(item.loot_type).is_some());
        }
    }

    #[test]
    fn test_no_loot_without_dogs() {
        let mut session = session(street_map(3), 1.0);

        let report = session.advance(Duration::from_secs(60));

        assert_eq!(report.spawned, 0);
        assert_eq!(session.loot_count(), 0);
    }

    #[test]
    fn test_dog_collects_then_delivers() {
        let mut session = session(street_map(3), 0.0);
        session.add_dog(dog_at(0, 0.0)).unwrap();
        session.place_loot(LootTypeId(1), Vec2::new(2.0, 0.0));
        session.move_dog(DogId(0), MoveCommand::Go(sim_model::Direction::East)).unwrap();

        let report = session.advance(Duration::from_secs(9));

        let dog = session.dog(DogId(0)).unwrap();
        assert_eq!(report.collected, 1);
        assert_eq!(report.deliveries, 1);
        assert_eq!(dog.score(), 30);
        assert!(dog.bag().is_empty());
        assert_eq!(session.loot_count(), 0);
    }

    #[test]
    fn test_full_bag_leaves_loot_on_map() {
        let mut session = session(street_map(1), 0.0);
        session.add_dog(dog_at(0, 0.0)).unwrap();
        let first = session.place_loot(LootTypeId(0), Vec2::new(2.0, 0.0));
        let second = session.place_loot(LootTypeId(0), Vec2::new(3.0, 0.0));
        session.move_dog(DogId(0), MoveCommand::Go(sim_model::Direction::East)).unwrap();

        session.advance(Duration::from_secs(5));

        let dog = session.dog(DogId(0)).unwrap();
        assert_eq!(dog.bag().len(), 1);
        assert_eq!(dog.bag()[0].id, first);
        let left: Vec<LootId> = session.available_loot().map(|item| item.id).collect();
        assert_eq!(left, vec![second]);
    }

    #[test]
    fn test_earlier_dog_wins_contested_loot() {
        let mut session = session(street_map(3), 0.0);
        session.add_dog(dog_at(0, 0.0)).unwrap();
        session.add_dog(dog_at(1, 4.0)).unwrap();
        session.place_loot(LootTypeId(0), Vec2::new(3.0, 0.0));
        session.move_dog(DogId(0), MoveCommand::Go(sim_model::Direction::East)).unwrap();
        session.move_dog(DogId(1), MoveCommand::Go(sim_model::Direction::West)).unwrap();

        session.advance(Duration::from_secs(6));

        assert!(session.dog(DogId(0)).unwrap().bag().is_empty());
        assert_eq!(session.dog(DogId(1)).unwrap().bag().len(), 1);
        assert_eq!(session.loot_count(), 0);
    }

    #[test]
    fn test_move_unknown_dog() {
        let mut session = session(street_map(3), 0.0);

        assert_eq!(
            session.move_dog(DogId(5), MoveCommand::Stop),
            Err(GameError::UnknownPlayer(5))
        );
    }

    #[test]
    fn test_time_since_save_accumulates() {
        let mut session = session(street_map(3), 0.0);

        session.advance(Duration::from_millis(300));
        session.advance(Duration::from_millis(200));
        assert_eq!(session.time_since_save(), Duration::from_millis(500));

        session.reset_time_since_save();
        assert_eq!(session.time_since_save(), Duration::ZERO);
    }

    #[test]
    fn test_restore_rejects_overfull_bag() {
        let map = street_map(1);
        let mut source = session(Arc::clone(&map), 0.0);
        source.add_dog(dog_at(0, 0.0)).unwrap();
        let mut snapshot = source.to_snapshot();
        snapshot.next_loot_id = LootId(2);
        snapshot.dogs[0].bag = vec![
            BagItem { id: LootId(0), loot_type: LootTypeId(0) },
            BagItem { id: LootId(1), loot_type: LootTypeId(0) },
        ];

        let result = GameSession::restore(
            map,
            LootGenerator::new(Duration::from_secs(5), 0.0),
            SmallRng::seed_from_u64(1),
            &snapshot,
        );

        assert!(matches!(result, Err(PersistenceError::Inconsistent(_))));
    }

    #[test]
    fn test_restore_rejects_loot_id_past_counter() {
        let map = street_map(3);
        let mut source = session(Arc::clone(&map), 0.0);
        source.place_loot(LootTypeId(0), Vec2::new(1.0, 0.0));
        let mut snapshot = source.to_snapshot();
        snapshot.next_loot_id = LootId(0);

        let result = GameSession::restore(
            map,
            LootGenerator::new(Duration::from_secs(5), 0.0),
            SmallRng::seed_from_u64(1),
            &snapshot,
        );

        assert!(matches!(result, Err(PersistenceError::Inconsistent(_))));
    }

    #[test]
    fn test_add_dog_refuses_taken_id() {
        let mut session = session(street_map(3), 0.0);
        session.add_dog(dog_at(0, 0.0)).unwrap();

        let result = session.add_dog(Dog::new(DogId(0), "impostor", Vec2::new(5.0, 0.0)));

        assert_eq!(result, Err(GameError::DuplicatePlayer(0)));
        assert_eq!(session.dog(DogId(0)).unwrap().name(), "dog0");
    }
}
