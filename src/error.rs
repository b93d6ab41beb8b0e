//! Error types
//!
//! Only configuration and construction can fail with an [`Error`]. Rejected
//! moves and insertions in the hot path are reported through `bool` and
//! `Option` returns instead.

use thiserror::Error;

/// Errors raised while building grids, layered maps and configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("a {width}x{height} grid needs {expected} values, got {found}")]
    CellCountMismatch {
        width: i32,
        height: i32,
        expected: usize,
        found: usize,
    },

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("overlay is {found_width}x{found_height} but the grid is {width}x{height}")]
    DimensionMismatch {
        width: i32,
        height: i32,
        found_width: i32,
        found_height: i32,
    },

    #[error("layer numbers must stay below {max}, layers would reach {requested}")]
    TooManyLayers { requested: u32, max: u32 },

    #[error("layer {layer} is outside layers {start}..{end}")]
    LayerOutOfRange { layer: u32, start: u32, end: u32 },

    #[error("id generator exhausted after handing out {last}")]
    IdsExhausted { last: u64 },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

impl From<ron::error::SpannedError> for Error {
    fn from(e: ron::error::SpannedError) -> Self {
        Error::Config(e.to_string())
    }
}
