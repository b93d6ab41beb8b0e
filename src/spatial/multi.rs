//! Multi-occupancy spatial map
//!
//! Any number of items may share a position. Items at a position are kept
//! in arrival order: oldest first, and an item moved onto a position joins
//! the end.

use std::collections::HashMap;

use slotmap::SlotMap;

use super::events::{ListenerId, Listeners, SpatialEvent};
use super::identity::{ById, HasId, Identity};
use super::{ReadSpatialMap, SpatialTuple, TupleKey};
use crate::geometry::Position;

/// A spatial map allowing many items per position.
pub struct MultiSpatialMap<T, I: Identity<T> = ById> {
    identity: I,
    tuples: SlotMap<TupleKey, SpatialTuple<T>>,
    by_item: HashMap<I::Key, TupleKey>,
    /// Never holds an empty list
    by_position: HashMap<Position, Vec<TupleKey>>,
    listeners: Listeners<T>,
}

impl<T: HasId> MultiSpatialMap<T, ById> {
    /// Create a map of items identified by their [`HasId::id`]
    pub fn new() -> Self {
        Self::with_identity(ById)
    }
}

impl<T, I: Identity<T> + Default> Default for MultiSpatialMap<T, I> {
    fn default() -> Self {
        Self::with_identity(I::default())
    }
}

impl<T, I: Identity<T>> MultiSpatialMap<T, I> {
    pub fn with_identity(identity: I) -> Self {
        Self {
            identity,
            tuples: SlotMap::with_key(),
            by_item: HashMap::new(),
            by_position: HashMap::new(),
            listeners: Listeners::new(),
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&SpatialEvent<'_, T>) + Send + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Only an item already in the map is refused
    pub fn can_add(&self, item: &T) -> bool {
        !self.by_item.contains_key(&self.identity.key(item))
    }

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

    pub fn can_move(&self, item: &T) -> bool {
        self.by_item.contains_key(&self.identity.key(item))
    }

    /// Move `item` to `target`, regardless of what is already there.
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

    /// Move everything at `current` to `target`; one event per item.
    ///
    /// Returns the moved items in their order at `current`.
    pub fn move_all(&mut self, current: Position, target: Position) -> Vec<&T> {
        let moved = self.relocate_all(current, target);
        for key in &moved {
            let item = &self.tuples[*key].item;
            self.listeners.notify(&SpatialEvent::Moved { item, from: current, to: target });
        }
        moved.into_iter().map(|key| &self.tuples[key].item).collect()
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

    /// Remove everything at `position`; one event per item.
    pub fn remove_at(&mut self, position: Position) -> Vec<T> {
        let removed = self.take_all_at(position);
        for item in &removed {
            self.listeners.notify(&SpatialEvent::Removed { item, position });
        }
        removed
    }

    /// Remove everything without notifying listeners
    pub fn clear(&mut self) {
        self.tuples.clear();
        self.by_item.clear();
        self.by_position.clear();
    }

    /// Items at `position`, oldest arrival first
    pub fn get_items(&self, position: Position) -> Vec<&T> {
        self.items_at(position).collect()
    }

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
        let key = self.tuples.insert(SpatialTuple { item, position });
        self.by_item.insert(id, key);
        self.by_position.entry(position).or_default().push(key);
        Ok(key)
    }

    pub(crate) fn relocate(&mut self, item: &T, target: Position) -> Option<(TupleKey, Position)> {
        let key = *self.by_item.get(&self.identity.key(item))?;
        let from = self.tuples[key].position;
        self.detach(key, from);
        self.by_position.entry(target).or_default().push(key);
        self.tuples[key].position = target;
        Some((key, from))
    }

    pub(crate) fn relocate_all(&mut self, current: Position, target: Position) -> Vec<TupleKey> {
        let Some(keys) = self.by_position.remove(&current) else {
            return Vec::new();
        };
        for key in &keys {
            self.tuples[*key].position = target;
        }
        self.by_position.entry(target).or_default().extend(keys.iter().copied());
        keys
    }

    pub(crate) fn take(&mut self, item: &T) -> Option<(T, Position)> {
        let key = self.by_item.remove(&self.identity.key(item))?;
        let tuple = self.tuples.remove(key)?;
        self.detach(key, tuple.position);
        Some((tuple.item, tuple.position))
    }

    pub(crate) fn take_all_at(&mut self, position: Position) -> Vec<T> {
        let keys = self.by_position.remove(&position).unwrap_or_default();
        let mut removed = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(tuple) = self.tuples.remove(key) {
                self.by_item.remove(&self.identity.key(&tuple.item));
                removed.push(tuple.item);
            }
        }
        removed
    }

    /// Unlink `key` from the list at `position`, dropping the list if emptied
    fn detach(&mut self, key: TupleKey, position: Position) {
        if let Some(keys) = self.by_position.get_mut(&position) {
            keys.retain(|k| *k != key);
            if keys.is_empty() {
                self.by_position.remove(&position);
            }
        }
    }
}

impl<T, I: Identity<T>> ReadSpatialMap<T> for MultiSpatialMap<T, I> {
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
        let keys = self.by_position.get(&position).map_or(&[][..], Vec::as_slice);
        Box::new(keys.iter().map(move |key| &self.tuples[*key].item))
    }

    fn items(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.tuples.values().map(|t| &t.item))
    }

    fn positions(&self) -> Box<dyn Iterator<Item = Position> + '_> {
        Box::new(self.by_position.keys().copied())
    }
}

impl<T, I: Identity<T>> std::fmt::Debug for MultiSpatialMap<T, I>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.by_position
                    .iter()
                    .map(|(pos, keys)| (pos, keys.iter().map(|k| &self.tuples[*k].item).collect::<Vec<_>>())),
            )
            .finish()
    }
}
