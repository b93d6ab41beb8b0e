//! Geometry module
//!
//! Grid coordinates and the distance metrics that shape radii.

pub mod position;
pub mod distance;

pub use position::Position;
pub use distance::{Distance, Radius};
