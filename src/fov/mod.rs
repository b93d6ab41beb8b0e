//! Field of View
//!
//! Recursive shadowcasting over a resistance grid, with linear light falloff
//! and an optional cone restriction.

pub mod shadowcast;
pub mod calculator;

pub use calculator::{BooleanFov, Fov};
