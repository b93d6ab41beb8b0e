//! Single-occupancy spatial map
//!
//! At most one item per position.

use std::collections::HashMap;

use slotmap::SlotMap;

use super::events::{ListenerId, Listeners, SpatialEvent};
use super::identity::{ById, HasId, Identity};
use super::{ReadSpatialMap, SpatialTuple, TupleKey};
use crate::geometry::Position;

/// A spatial map allowing one item per position.
///
/// Rejected operations (duplicate item, occupied target, unknown item)
/// return `false` or `None` and leave the map untouched.
pub struct SpatialMap<T, I: Identity<T> = ById> {
    identity: I,
    tuples: SlotMap<TupleKey, SpatialTuple<T>>,
    by_item: HashMap<I::Key, TupleKey>,
    by_position: HashMap<Position, TupleKey>,
    listeners: Listeners<T>,
}

impl<T: HasId> SpatialMap<T, ById> {
    /// Create a map of items identified by their [`HasId::id`]
    pub fn new() -> Self {
        Self::with_identity(ById)
    }
}

impl<T, I: Identity<T> + Default> Default for SpatialMap<T, I> {
    fn default() -> Self {
        Self::with_identity(I::default())
    }
}

impl<T, I: Identity<T>> SpatialMap<T, I> {
    /// Create a map that identifies items with `identity`
    pub fn with_identity(identity: I) -> Self {
        Self {
            identity,
            tuples: SlotMap::with_key(),
            by_item: HashMap::new(),
            by_position: HashMap::new(),
            listeners: Listeners::new(),
        }
    }

    /// Register a change listener
    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&SpatialEvent<'_, T>) + Send + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn can_add(&self, item: &T, position: Position) -> bool {
        !self.by_item.contains_key(&self.identity.key(item))
            && !self.by_position.contains_key(&position)
    }

    /// Place `item` at `position`.
    ///
    /// Fails if the item is already in the map or the position is taken;
    /// the rejected item is dropped.
    pub fn add(&mut self, item: T, position: Position) -> bool {
        match self.insert(item, position) {
            Ok(key) => {
                let item = &self.tuples[key].item;
                self.listeners.notify(&SpatialEvent::Added { item, position });
                true
            }
            Err(_) => false,
        }
    }

    pub fn can_move(&self, item: &T, target: Position) -> bool {
        self.by_item.contains_key(&self.identity.key(item))
            && !self.by_position.contains_key(&target)
    }

    /// Move `item` to `target`, which must be free.
    pub fn move_item(&mut self, item: &T, target: Position) -> bool {
        match self.relocate(item, target) {
            Some((key, from)) => {
                let item = &self.tuples[key].item;
                self.listeners.notify(&SpatialEvent::Moved { item, from, to: target });
                true
            }
            None => false,
        }
    }

    /// Move whatever is at `current` to `target`, if `target` is free.
    pub fn move_at(&mut self, current: Position, target: Position) -> Option<&T> {
        let key = self.relocate_at(current, target)?;
        let item = &self.tuples[key].item;
        self.listeners.notify(&SpatialEvent::Moved { item, from: current, to: target });
        Some(item)
    }

    pub fn remove(&mut self, item: &T) -> bool {
        match self.take(item) {
            Some((item, position)) => {
                self.listeners.notify(&SpatialEvent::Removed { item: &item, position });
                true
            }
            None => false,
        }
    }

    /// Remove and return the item at `position`
    pub fn remove_at(&mut self, position: Position) -> Option<T> {
        let item = self.take_at(position)?;
        self.listeners.notify(&SpatialEvent::Removed { item: &item, position });
        Some(item)
    }

    /// Remove everything without notifying listeners
    pub fn clear(&mut self) {
        self.tuples.clear();
        self.by_item.clear();
        self.by_position.clear();
    }

    pub fn get_item(&self, position: Position) -> Option<&T> {
        self.by_position.get(&position).map(|key| &self.tuples[*key].item)
    }

    /// Every item with its position, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&T, Position)> + '_ {
        self.tuples.values().map(|t| (&t.item, t.position))
    }

    pub(crate) fn item(&self, key: TupleKey) -> &T {
        &self.tuples[key].item
    }

    pub(crate) fn insert(&mut self, item: T, position: Position) -> Result<TupleKey, T> {
        let id = self.identity.key(&item);
        if self.by_item.contains_key(&id) {
            log::trace!("rejected add at {}: item already present", position);
            return Err(item);
        }
        if self.by_position.contains_key(&position) {
            log::trace!("rejected add at {}: position occupied", position);
            return Err(item);
        }
        let key = self.tuples.insert(SpatialTuple { item, position });
        self.by_item.insert(id, key);
        self.by_position.insert(position, key);
        Ok(key)
    }

    /// Move an item without notifying; returns its record and old position
    pub(crate) fn relocate(&mut self, item: &T, target: Position) -> Option<(TupleKey, Position)> {
        let key = *self.by_item.get(&self.identity.key(item))?;
        if self.by_position.contains_key(&target) {
            log::trace!("rejected move to {}: position occupied", target);
            return None;
        }
        let from = self.tuples[key].position;
        self.by_position.remove(&from);
        self.by_position.insert(target, key);
        self.tuples[key].position = target;
        Some((key, from))
    }

    pub(crate) fn relocate_at(&mut self, current: Position, target: Position) -> Option<TupleKey> {
        let key = *self.by_position.get(&current)?;
        if self.by_position.contains_key(&target) {
            log::trace!("rejected move {} -> {}: position occupied", current, target);
            return None;
        }
        self.by_position.remove(&current);
        self.by_position.insert(target, key);
        self.tuples[key].position = target;
        Some(key)
    }

    pub(crate) fn take(&mut self, item: &T) -> Option<(T, Position)> {
        let key = self.by_item.remove(&self.identity.key(item))?;
        let tuple = self.tuples.remove(key)?;
        self.by_position.remove(&tuple.position);
        Some((tuple.item, tuple.position))
    }

    pub(crate) fn take_at(&mut self, position: Position) -> Option<T> {
        let key = self.by_position.remove(&position)?;
        let tuple = self.tuples.remove(key)?;
        self.by_item.remove(&self.identity.key(&tuple.item));
        Some(tuple.item)
    }
}

impl<T, I: Identity<T>> ReadSpatialMap<T> for SpatialMap<T, I> {
    fn len(&self) -> usize {
        self.by_item.len()
    }

    fn contains_item(&self, item: &T) -> bool {
        self.by_item.contains_key(&self.identity.key(item))
    }

    fn contains_position(&self, position: Position) -> bool {
        self.by_position.contains_key(&position)
    }

    fn get_position(&self, item: &T) -> Option<Position> {
        self.by_item
            .get(&self.identity.key(item))
            .map(|key| self.tuples[*key].position)
    }

    fn items_at(&self, position: Position) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.get_item(position).into_iter())
    }

    fn items(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.tuples.values().map(|t| &t.item))
    }

    fn positions(&self) -> Box<dyn Iterator<Item = Position> + '_> {
        Box::new(self.by_position.keys().copied())
    }
}

impl<T, I: Identity<T>> std::fmt::Debug for SpatialMap<T, I>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.tuples.values().map(|t| (t.position, &t.item)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{ByValue, KeyFn};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    struct Creature {
        id: u64,
        name: &'static str,
    }

    impl HasId for Creature {
        fn id(&self) -> u64 {
            self.id
        }
    }

    fn creature(id: u64, name: &'static str) -> Creature {
        Creature { id, name }
    }

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Added(u64, Position),
        Removed(u64, Position),
        Moved(u64, Position, Position),
    }

    fn record(map: &mut SpatialMap<Creature>) -> Arc<Mutex<Vec<Seen>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        map.subscribe(move |event| {
            let seen = match *event {
                SpatialEvent::Added { item, position } => Seen::Added(item.id, position),
                SpatialEvent::Removed { item, position } => Seen::Removed(item.id, position),
                SpatialEvent::Moved { item, from, to } => Seen::Moved(item.id, from, to),
            };
            sink.lock().unwrap().push(seen);
        });
        log
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let mut map = SpatialMap::new();
        assert!(map.add(creature(1, "rat"), pos(0, 0)));
        assert!(!map.add(creature(1, "rat"), pos(0, 0)));
        assert!(!map.add(creature(1, "rat"), pos(5, 5)));
        assert_eq!(map.len(), 1);

        assert!(!map.add(creature(2, "bat"), pos(0, 0)));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_item(&creature(2, "bat")));
    }

    #[test]
    fn test_four_corners_scenario() {
        let mut map = SpatialMap::new();
        let a = creature(1, "a");
        let d = creature(4, "d");
        assert!(map.add(a.clone(), pos(0, 0)));
        assert!(map.add(creature(2, "b"), pos(1, 0)));
        assert!(map.add(creature(3, "c"), pos(0, 1)));
        assert!(map.add(d.clone(), pos(1, 1)));
        assert_eq!(map.len(), 4);

        assert!(!map.move_item(&a, pos(1, 0)));
        assert_eq!(map.get_position(&a), Some(pos(0, 0)));

        assert_eq!(map.remove_at(pos(1, 1)), Some(d));
        assert_eq!(map.len(), 3);
        assert!(!map.contains_position(pos(1, 1)));
    }

    #[test]
    fn test_move_round_trip() {
        let mut map = SpatialMap::new();
        let orc = creature(9, "orc");
        map.add(orc.clone(), pos(2, 2));

        assert!(map.move_item(&orc, pos(3, 2)));
        assert!(map.move_item(&orc, pos(4, 7)));
        assert_eq!(map.get_position(&orc), Some(pos(4, 7)));
        assert!(!map.contains_position(pos(3, 2)));
        assert!(!map.contains_position(pos(2, 2)));
        assert!(map.contains_position(pos(4, 7)));
        assert_eq!(map.get_item(pos(4, 7)).map(|c| c.name), Some("orc"));

        // Its own cell counts as occupied
        assert!(!map.move_item(&orc, pos(4, 7)));
        // Unknown items cannot move
        assert!(!map.move_item(&creature(10, "ghost"), pos(0, 0)));
    }

    #[test]
    fn test_move_at() {
        let mut map = SpatialMap::new();
        map.add(creature(1, "a"), pos(0, 0));
        map.add(creature(2, "b"), pos(1, 0));

        assert!(map.move_at(pos(0, 0), pos(1, 0)).is_none());
        assert!(map.move_at(pos(5, 5), pos(6, 6)).is_none());
        assert_eq!(map.move_at(pos(0, 0), pos(0, 3)).map(|c| c.id), Some(1));
        assert_eq!(map.get_position(&creature(1, "a")), Some(pos(0, 3)));
        assert!(!map.contains_position(pos(0, 0)));
    }

    #[test]
    fn test_remove() {
        let mut map = SpatialMap::new();
        let a = creature(1, "a");
        map.add(a.clone(), pos(3, 3));
        assert!(map.remove(&a));
        assert!(!map.remove(&a));
        assert!(map.is_empty());
        assert_eq!(map.positions().count(), 0);
        assert_eq!(map.remove_at(pos(3, 3)), None);
    }

    #[test]
    fn test_events_follow_mutations() {
        let mut map = SpatialMap::new();
        let log = record(&mut map);
        let a = creature(1, "a");

        map.add(a.clone(), pos(0, 0));
        map.add(creature(2, "b"), pos(0, 0)); // rejected, no event
        map.move_item(&a, pos(1, 1));
        map.move_at(pos(1, 1), pos(2, 1));
        map.remove(&a);
        map.remove(&a); // already gone

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Seen::Added(1, pos(0, 0)),
                Seen::Moved(1, pos(0, 0), pos(1, 1)),
                Seen::Moved(1, pos(1, 1), pos(2, 1)),
                Seen::Removed(1, pos(2, 1)),
            ]
        );
    }

    #[test]
    fn test_unsubscribe_and_clear() {
        let mut map = SpatialMap::new();
        let log = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&log);
        let id = map.subscribe(move |_| *sink.lock().unwrap() += 1);

        map.add(creature(1, "a"), pos(0, 0));
        assert!(map.unsubscribe(id));
        map.add(creature(2, "b"), pos(1, 0));
        assert_eq!(*log.lock().unwrap(), 1);

        map.clear();
        assert!(map.is_empty());
        assert!(map.get_item(pos(1, 0)).is_none());
        assert!(map.add(creature(2, "b"), pos(1, 0)));
    }

    #[test]
    fn test_indexes_stay_consistent() {
        let mut map = SpatialMap::new();
        for i in 0..20 {
            map.add(creature(i, "x"), pos(i as i32, 0));
        }
        for i in (0..20).step_by(3) {
            map.move_item(&creature(i, "x"), pos(i as i32, 5));
        }
        for i in (0..20).step_by(4) {
            map.remove(&creature(i, "x"));
        }

        assert_eq!(map.len(), map.items().count());
        assert_eq!(map.len(), map.positions().count());
        for (item, position) in map.iter() {
            assert_eq!(map.get_item(position).map(|c| c.id), Some(item.id));
            assert_eq!(map.get_position(item), Some(position));
        }
    }

    #[test]
    fn test_value_and_key_fn_identities() {
        let mut glyphs: SpatialMap<char, ByValue> = SpatialMap::with_identity(ByValue);
        assert!(glyphs.add('@', pos(0, 0)));
        assert!(!glyphs.add('@', pos(1, 0)));
        assert!(glyphs.add('g', pos(1, 0)));
        assert_eq!(glyphs.items_at(pos(1, 0)).collect::<Vec<_>>(), vec![&'g']);

        let mut named = SpatialMap::with_identity(KeyFn(|c: &Creature| c.name));
        assert!(named.add(creature(1, "slime"), pos(0, 0)));
        assert!(!named.add(creature(2, "slime"), pos(3, 3)));
        assert!(named.contains_item(&creature(99, "slime")));
    }

    #[test]
    fn test_hecs_entities() {
        let mut world = hecs::World::new();
        let player = world.spawn((pos(1, 1),));
        let enemy = world.spawn((pos(4, 2),));

        let mut map: SpatialMap<hecs::Entity> = SpatialMap::new();
        for (entity, position) in world.query::<&Position>().iter() {
            assert!(map.add(entity, *position));
        }
        assert_eq!(map.get_item(pos(1, 1)), Some(&player));
        assert!(map.move_item(&enemy, pos(4, 3)));
        assert_eq!(map.get_position(&enemy), Some(pos(4, 3)));
    }
}
