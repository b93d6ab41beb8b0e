//! Change notifications
//!
//! Listeners are called synchronously, in subscription order, after the map
//! has been updated.

use std::fmt;

use crate::geometry::Position;

/// A change to the contents of a spatial map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialEvent<'a, T> {
    Added { item: &'a T, position: Position },
    Removed { item: &'a T, position: Position },
    Moved { item: &'a T, from: Position, to: Position },
}

impl<'a, T> SpatialEvent<'a, T> {
    /// The item the event is about
    pub fn item(&self) -> &'a T {
        match *self {
            SpatialEvent::Added { item, .. }
            | SpatialEvent::Removed { item, .. }
            | SpatialEvent::Moved { item, .. } => item,
        }
    }
}

/// Token returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback<T> = Box<dyn FnMut(&SpatialEvent<'_, T>) + Send>;

/// Registered listeners of one map
pub struct Listeners<T> {
    next_id: u64,
    callbacks: Vec<(ListenerId, Callback<T>)>,
}

impl<T> Listeners<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            callbacks: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&SpatialEvent<'_, T>) + Send + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    pub fn notify(&mut self, event: &SpatialEvent<'_, T>) {
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_notify_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::<char>::new();

        let first = Arc::clone(&log);
        listeners.subscribe(move |e| first.lock().unwrap().push(("first", *e.item())));
        let second = Arc::clone(&log);
        let id = listeners.subscribe(move |e| second.lock().unwrap().push(("second", *e.item())));

        listeners.notify(&SpatialEvent::Added { item: &'a', position: Position::new(0, 0) });
        assert_eq!(*log.lock().unwrap(), vec![("first", 'a'), ("second", 'a')]);

        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.notify(&SpatialEvent::Removed { item: &'b', position: Position::new(0, 0) });
        assert_eq!(log.lock().unwrap().len(), 3);
        assert_eq!(listeners.len(), 1);
    }
}
