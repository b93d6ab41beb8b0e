//! Grid positions

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use super::Distance;

/// An integer cell coordinate on a 2D grid.
///
/// `y` grows downwards, so "up" is towards negative `y`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Row-major index of this position in a grid `width` cells wide
    #[inline]
    pub fn to_index(self, width: i32) -> usize {
        (self.y * width + self.x) as usize
    }

    /// Inverse of [`Position::to_index`]
    #[inline]
    pub fn from_index(idx: usize, width: i32) -> Self {
        let idx = idx as i32;
        Self::new(idx % width, idx / width)
    }

    /// Manhattan distance to another position
    pub fn manhattan_distance(&self, other: &Position) -> i32 {
        Distance::Manhattan.calculate_between(*self, *other) as i32
    }

    /// Chebyshev distance (allows diagonal)
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        Distance::Chebyshev.calculate_between(*self, *other) as i32
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
