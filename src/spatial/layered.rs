//! Layered spatial map
//!
//! Several spatial maps stacked by layer number (terrain below items below
//! creatures, say). Each item declares its own layer and is stored in that
//! layer only; position queries merge all layers in ascending layer order.
//!
//! An item's layer must not change while it is in the map. This is not
//! checked; breaking it leaves the item unreachable through its new layer.

use super::events::{ListenerId, Listeners, SpatialEvent};
use super::identity::{ById, HasId, Identity};
use super::{MultiSpatialMap, ReadSpatialMap, SpatialMap, TupleKey};
use crate::config::LayerConfig;
use crate::error::{Error, Result};
use crate::geometry::Position;

/// An item that lives on a fixed layer
pub trait HasLayer {
    fn layer(&self) -> u32;
}

/// A set of layer numbers as a bit mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// A mask holding the single layer `layer`
    pub fn layer(layer: u32) -> Self {
        LayerMask(1u32.checked_shl(layer).unwrap_or(0))
    }

    pub fn with(self, layer: u32) -> Self {
        LayerMask(self.0 | Self::layer(layer).0)
    }

    pub fn contains(self, layer: u32) -> bool {
        self.0 & Self::layer(layer).0 != 0
    }
}

impl FromIterator<u32> for LayerMask {
    fn from_iter<It: IntoIterator<Item = u32>>(layers: It) -> Self {
        layers.into_iter().fold(LayerMask::NONE, LayerMask::with)
    }
}

enum Layer<T, I: Identity<T>> {
    Single(SpatialMap<T, I>),
    Multi(MultiSpatialMap<T, I>),
}

impl<T, I: Identity<T>> Layer<T, I> {
    fn as_read(&self) -> &dyn ReadSpatialMap<T> {
        match self {
            Layer::Single(map) => map,
            Layer::Multi(map) => map,
        }
    }

    fn item(&self, key: TupleKey) -> &T {
        match self {
            Layer::Single(map) => map.item(key),
            Layer::Multi(map) => map.item(key),
        }
    }

    fn can_add(&self, item: &T, position: Position) -> bool {
        match self {
            Layer::Single(map) => map.can_add(item, position),
            Layer::Multi(map) => map.can_add(item),
        }
    }

    fn can_move(&self, item: &T, target: Position) -> bool {
        match self {
            Layer::Single(map) => map.can_move(item, target),
            Layer::Multi(map) => map.can_move(item),
        }
    }

    fn insert(&mut self, item: T, position: Position) -> std::result::Result<TupleKey, T> {
        match self {
            Layer::Single(map) => map.insert(item, position),
            Layer::Multi(map) => map.insert(item, position),
        }
    }

    fn relocate(&mut self, item: &T, target: Position) -> Option<(TupleKey, Position)> {
        match self {
            Layer::Single(map) => map.relocate(item, target),
            Layer::Multi(map) => map.relocate(item, target),
        }
    }

    fn relocate_all(&mut self, current: Position, target: Position) -> Vec<TupleKey> {
        match self {
            Layer::Single(map) => map.relocate_at(current, target).into_iter().collect(),
            Layer::Multi(map) => map.relocate_all(current, target),
        }
    }

    fn take(&mut self, item: &T) -> Option<(T, Position)> {
        match self {
            Layer::Single(map) => map.take(item),
            Layer::Multi(map) => map.take(item),
        }
    }

    fn take_all_at(&mut self, position: Position) -> Vec<T> {
        match self {
            Layer::Single(map) => map.take_at(position).into_iter().collect(),
            Layer::Multi(map) => map.take_all_at(position),
        }
    }

    fn clear(&mut self) {
        match self {
            Layer::Single(map) => map.clear(),
            Layer::Multi(map) => map.clear(),
        }
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&T, Position)> + '_> {
        match self {
            Layer::Single(map) => Box::new(map.iter()),
            Layer::Multi(map) => Box::new(map.iter()),
        }
    }
}

/// Spatial maps stacked by layer number.
///
/// Layers `starting_layer..starting_layer + number_of_layers` exist; each is
/// single- or multi-occupancy according to the mask given at construction.
pub struct LayeredSpatialMap<T, I: Identity<T> = ById> {
    layers: Vec<Layer<T, I>>,
    starting_layer: u32,
    listeners: Listeners<T>,
}

impl<T: HasLayer, I: Identity<T> + Clone> LayeredSpatialMap<T, I> {
    /// Layer numbers must stay below this
    pub const MAX_LAYERS: u32 = 32;

    /// Build `number_of_layers` layers starting at `starting_layer`.
    ///
    /// Layers whose number is in `multi_item_layers` allow several items per
    /// position; the rest allow one.
    pub fn with_identity(
        identity: I,
        number_of_layers: u32,
        starting_layer: u32,
        multi_item_layers: LayerMask,
    ) -> Result<Self> {
        if number_of_layers == 0 {
            return Err(Error::Config("a layered map needs at least one layer".into()));
        }
        let end = starting_layer.saturating_add(number_of_layers);
        if end > Self::MAX_LAYERS {
            return Err(Error::TooManyLayers {
                requested: end,
                max: Self::MAX_LAYERS,
            });
        }

        let layers = (starting_layer..end)
            .map(|layer| {
                if multi_item_layers.contains(layer) {
                    Layer::Multi(MultiSpatialMap::with_identity(identity.clone()))
                } else {
                    Layer::Single(SpatialMap::with_identity(identity.clone()))
                }
            })
            .collect();

        log::debug!(
            "Created layered spatial map with layers {}..{} (multi-item mask {:#b})",
            starting_layer, end, multi_item_layers.0
        );

        Ok(Self {
            layers,
            starting_layer,
            listeners: Listeners::new(),
        })
    }

    /// Build the layers described by a [`LayerConfig`]
    pub fn from_config(config: &LayerConfig) -> Result<Self>
    where
        I: Default,
    {
        let end = config.starting_layer.saturating_add(config.layers);
        if let Some(&layer) = config
            .multi_item_layers
            .iter()
            .find(|&&layer| layer < config.starting_layer || layer >= end)
        {
            return Err(Error::LayerOutOfRange {
                layer,
                start: config.starting_layer,
                end,
            });
        }
        let mask = config.multi_item_layers.iter().copied().collect();
        Self::with_identity(I::default(), config.layers, config.starting_layer, mask)
    }
}

impl<T: HasLayer + HasId> LayeredSpatialMap<T, ById> {
    /// Layered map of items identified by their [`HasId::id`]
    pub fn new(number_of_layers: u32, starting_layer: u32, multi_item_layers: LayerMask) -> Result<Self> {
        Self::with_identity(ById, number_of_layers, starting_layer, multi_item_layers)
    }
}

impl<T: HasLayer, I: Identity<T>> LayeredSpatialMap<T, I> {
    pub fn number_of_layers(&self) -> u32 {
        self.layers.len() as u32
    }

    pub fn starting_layer(&self) -> u32 {
        self.starting_layer
    }

    /// Mask of every layer this map holds
    pub fn layer_mask(&self) -> LayerMask {
        (self.starting_layer..self.starting_layer + self.number_of_layers()).collect()
    }

    /// Read access to one layer
    pub fn layer(&self, layer: u32) -> Option<&dyn ReadSpatialMap<T>> {
        self.index_of(layer).map(|idx| self.layers[idx].as_read())
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

    fn index_of(&self, layer: u32) -> Option<usize> {
        let idx = layer.checked_sub(self.starting_layer)? as usize;
        (idx < self.layers.len()).then_some(idx)
    }

    pub fn can_add(&self, item: &T, position: Position) -> bool {
        self.index_of(item.layer())
            .is_some_and(|idx| self.layers[idx].can_add(item, position))
    }

    /// Add `item` on its own layer.
    ///
    /// Fails if the layer does not exist or the layer refuses the item.
    pub fn add(&mut self, item: T, position: Position) -> bool {
        let Some(idx) = self.index_of(item.layer()) else {
            log::trace!("rejected add at {}: layer {} does not exist", position, item.layer());
            return false;
        };
        match self.layers[idx].insert(item, position) {
            Ok(key) => {
                let item = self.layers[idx].item(key);
                self.listeners.notify(&SpatialEvent::Added { item, position });
                true
            }
            Err(_) => false,
        }
    }

    pub fn can_move(&self, item: &T, target: Position) -> bool {
        self.index_of(item.layer())
            .is_some_and(|idx| self.layers[idx].can_move(item, target))
    }

    pub fn move_item(&mut self, item: &T, target: Position) -> bool {
        let Some(idx) = self.index_of(item.layer()) else {
            return false;
        };
        match self.layers[idx].relocate(item, target) {
            Some((key, from)) => {
                let item = self.layers[idx].item(key);
                self.listeners.notify(&SpatialEvent::Moved { item, from, to: target });
                true
            }
            None => false,
        }
    }

    /// Move everything at `current` to `target` on every layer.
    ///
    /// Single-occupancy layers only move when `target` is free on that
    /// layer. Returns the moved items, lowest layer first.
    pub fn move_all(&mut self, current: Position, target: Position) -> Vec<&T> {
        let moved: Vec<(usize, Vec<TupleKey>)> = self
            .layers
            .iter_mut()
            .enumerate()
            .map(|(idx, layer)| (idx, layer.relocate_all(current, target)))
            .collect();

        for (idx, keys) in &moved {
            for key in keys {
                let item = self.layers[*idx].item(*key);
                self.listeners.notify(&SpatialEvent::Moved { item, from: current, to: target });
            }
        }

        let layers = &self.layers;
        moved
            .into_iter()
            .flat_map(|(idx, keys)| keys.into_iter().map(move |key| layers[idx].item(key)))
            .collect()
    }

    pub fn remove(&mut self, item: &T) -> bool {
        let Some(idx) = self.index_of(item.layer()) else {
            return false;
        };
        match self.layers[idx].take(item) {
            Some((item, position)) => {
                self.listeners.notify(&SpatialEvent::Removed { item: &item, position });
                true
            }
            None => false,
        }
    }

    /// Remove everything at `position` from every layer, lowest layer first
    pub fn remove_at(&mut self, position: Position) -> Vec<T> {
        let removed: Vec<T> = self
            .layers
            .iter_mut()
            .flat_map(|layer| layer.take_all_at(position))
            .collect();
        for item in &removed {
            self.listeners.notify(&SpatialEvent::Removed { item, position });
        }
        removed
    }

    /// Remove everything without notifying listeners
    pub fn clear(&mut self) {
        for layer in &mut self.layers {
            layer.clear();
        }
    }

    /// Items at `position` across all layers, lowest layer first
    pub fn get_items(&self, position: Position) -> Vec<&T> {
        self.get_items_in(position, LayerMask::ALL)
    }

    /// Items at `position` on the layers in `mask`, lowest layer first
    pub fn get_items_in(&self, position: Position, mask: LayerMask) -> Vec<&T> {
        self.masked(mask)
            .flat_map(|layer| layer.as_read().items_at(position))
            .collect()
    }

    pub fn contains_position_in(&self, position: Position, mask: LayerMask) -> bool {
        self.masked(mask)
            .any(|layer| layer.as_read().contains_position(position))
    }

    /// Every item with its position, lowest layer first
    pub fn iter(&self) -> impl Iterator<Item = (&T, Position)> + '_ {
        self.layers.iter().flat_map(|layer| layer.iter())
    }

    fn masked(&self, mask: LayerMask) -> impl Iterator<Item = &Layer<T, I>> + '_ {
        let start = self.starting_layer;
        self.layers
            .iter()
            .enumerate()
            .filter(move |(idx, _)| mask.contains(start + *idx as u32))
            .map(|(_, layer)| layer)
    }
}

impl<T: HasLayer, I: Identity<T>> ReadSpatialMap<T> for LayeredSpatialMap<T, I> {
    fn len(&self) -> usize {
        self.layers.iter().map(|layer| layer.as_read().len()).sum()
    }

    fn contains_item(&self, item: &T) -> bool {
        self.index_of(item.layer())
            .is_some_and(|idx| self.layers[idx].as_read().contains_item(item))
    }

    fn contains_position(&self, position: Position) -> bool {
        self.contains_position_in(position, LayerMask::ALL)
    }

    fn get_position(&self, item: &T) -> Option<Position> {
        let idx = self.index_of(item.layer())?;
        self.layers[idx].as_read().get_position(item)
    }

    fn items_at(&self, position: Position) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(
            self.layers
                .iter()
                .flat_map(move |layer| layer.as_read().items_at(position)),
        )
    }

    fn items(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.layers.iter().flat_map(|layer| layer.as_read().items()))
    }

    /// Occupied positions across all layers, each listed once
    fn positions(&self) -> Box<dyn Iterator<Item = Position> + '_> {
        let mut seen = std::collections::HashSet::new();
        Box::new(
            self.layers
                .iter()
                .flat_map(|layer| layer.as_read().positions())
                .filter(move |pos| seen.insert(*pos)),
        )
    }
}
