//! Spatial maps
//!
//! Indexes of items by grid position with O(1) lookup in both directions.
//! Each resident item lives in one arena record holding its current
//! position; the item index and the position index both point at that
//! record, so a move updates the position in one place.

pub mod identity;
pub mod events;
pub mod single;
pub mod multi;
pub mod layered;

pub use identity::{ById, ByValue, HasId, IdGenerator, Identity, KeyFn};
pub use events::{ListenerId, Listeners, SpatialEvent};
pub use single::SpatialMap;
pub use multi::MultiSpatialMap;
pub use layered::{HasLayer, LayerMask, LayeredSpatialMap};

use crate::geometry::Position;

slotmap::new_key_type! {
    /// Handle of an item's record inside a spatial map
    pub struct TupleKey;
}

/// An item together with the position it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialTuple<T> {
    pub(crate) item: T,
    pub(crate) position: Position,
}

impl<T> SpatialTuple<T> {
    pub fn item(&self) -> &T {
        &self.item
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

/// Queries shared by every spatial map flavour.
pub trait ReadSpatialMap<T> {
    /// Number of items in the map
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains_item(&self, item: &T) -> bool;

    fn contains_position(&self, position: Position) -> bool;

    fn get_position(&self, item: &T) -> Option<Position>;

    /// Everything at `position`; empty when nothing is there
    fn items_at(&self, position: Position) -> Box<dyn Iterator<Item = &T> + '_>;

    fn items(&self) -> Box<dyn Iterator<Item = &T> + '_>;

    /// Every occupied position, each listed once
    fn positions(&self) -> Box<dyn Iterator<Item = Position> + '_>;
}
