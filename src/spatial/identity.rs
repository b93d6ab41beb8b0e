//! Item identity
//!
//! Spatial maps look items up by a key derived from the item. Items that
//! carry a stable id use [`ById`]; plain values use [`ByValue`]; anything
//! else can supply a key function through [`KeyFn`].

use std::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::{Error, Result};

/// An item with a stable, unique id.
pub trait HasId {
    fn id(&self) -> u64;
}

impl HasId for hecs::Entity {
    fn id(&self) -> u64 {
        self.to_bits().get()
    }
}

impl<T: HasId + ?Sized> HasId for Rc<T> {
    fn id(&self) -> u64 {
        (**self).id()
    }
}

impl<T: HasId + ?Sized> HasId for Arc<T> {
    fn id(&self) -> u64 {
        (**self).id()
    }
}

/// Derives the lookup key that decides whether two items are the same.
pub trait Identity<T> {
    type Key: Hash + Eq + Clone;

    fn key(&self, item: &T) -> Self::Key;
}

/// Items are identified by [`HasId::id`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ById;

impl<T: HasId> Identity<T> for ById {
    type Key = u64;

    fn key(&self, item: &T) -> u64 {
        item.id()
    }
}

/// Items are identified by their own value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByValue;

impl<T: Hash + Eq + Clone> Identity<T> for ByValue {
    type Key = T;

    fn key(&self, item: &T) -> T {
        item.clone()
    }
}

/// Items are identified by the key a function extracts from them
#[derive(Debug, Clone, Copy)]
pub struct KeyFn<F>(pub F);

impl<T, K, F> Identity<T> for KeyFn<F>
where
    K: Hash + Eq + Clone,
    F: Fn(&T) -> K,
{
    type Key = K;

    fn key(&self, item: &T) -> K {
        (self.0)(item)
    }
}

/// Hands out sequential ids, failing instead of wrapping around.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    next: u64,
    exhausted: bool,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator whose first id is `first`
    pub fn starting_at(first: u64) -> Self {
        Self { next: first, exhausted: false }
    }

    pub fn next_id(&mut self) -> Result<u64> {
        if self.exhausted {
            return Err(Error::IdsExhausted { last: u64::MAX });
        }
        let id = self.next;
        match self.next.checked_add(1) {
            Some(next) => self.next = next,
            None => self.exhausted = true,
        }
        Ok(id)
    }
}
