//! Grid module
//!
//! Read/write views over rectangular grids of values. FOV consumes these as
//! its resistance input and exposes its results through them.

pub mod view;
pub mod array;

pub use view::{
    transparency_to_resistance, GridView, LambdaGrid, SettableGridView, TranslationGrid,
};
pub use array::ArrayGrid;
