//! Gloamsight - sight and space for grid-based games
//!
//! Recursive shadowcasting field of view with light falloff and cones, and
//! spatial maps that index items by grid position with change
//! notifications.

pub mod error;
pub mod config;
pub mod geometry;
pub mod grid;
pub mod fov;
pub mod spatial;

// Re-export commonly used types
pub use error::{Error, Result};
pub use config::{ConeConfig, LayerConfig, SightConfig};
pub use geometry::{Distance, Position, Radius};
pub use grid::{ArrayGrid, GridView, SettableGridView};
pub use fov::{BooleanFov, Fov};
pub use spatial::{
    HasId, HasLayer, LayerMask, LayeredSpatialMap, MultiSpatialMap, ReadSpatialMap, SpatialEvent,
    SpatialMap,
};
