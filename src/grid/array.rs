//! Owned grid storage
//!
//! A row-major `Vec` with its dimensions.

use serde::{Deserialize, Serialize};

use super::{GridView, SettableGridView};
use crate::error::{Error, Result};
use crate::geometry::Position;

/// A rectangular grid of owned values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayGrid<T> {
    width: i32,
    height: i32,
    cells: Vec<T>,
}

impl<T: Clone> ArrayGrid<T> {
    /// Create a grid with every cell set to `fill`
    pub fn new(width: i32, height: i32, fill: T) -> Result<Self> {
        let count = check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![fill; count],
        })
    }

    /// Set every cell to `value`
    pub fn fill(&mut self, value: T) {
        for cell in &mut self.cells {
            *cell = value.clone();
        }
    }

    /// Copy every value of `overlay` into this grid.
    ///
    /// The overlay must have exactly this grid's dimensions.
    pub fn apply_overlay<G: GridView<Item = T>>(&mut self, overlay: &G) -> Result<()> {
        if overlay.width() != self.width || overlay.height() != self.height {
            return Err(Error::DimensionMismatch {
                width: self.width,
                height: self.height,
                found_width: overlay.width(),
                found_height: overlay.height(),
            });
        }
        for (idx, cell) in self.cells.iter_mut().enumerate() {
            *cell = overlay.get(Position::from_index(idx, self.width));
        }
        Ok(())
    }
}

impl<T> ArrayGrid<T> {
    /// Wrap row-major `cells` as a `width` x `height` grid
    pub fn from_vec(width: i32, height: i32, cells: Vec<T>) -> Result<Self> {
        let expected = check_dimensions(width, height)?;
        if cells.len() != expected {
            return Err(Error::CellCountMismatch {
                width,
                height,
                expected,
                found: cells.len(),
            });
        }
        Ok(Self { width, height, cells })
    }

    /// Get a reference to the value at a position
    pub fn get_ref(&self, pos: Position) -> Option<&T> {
        if self.contains(pos) {
            Some(&self.cells[pos.to_index(self.width)])
        } else {
            None
        }
    }

    /// Get a mutable reference to the value at a position
    pub fn get_mut(&mut self, pos: Position) -> Option<&mut T> {
        if self.contains(pos) {
            let idx = pos.to_index(self.width);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    #[inline]
    fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// All values in row-major order
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }
}

impl ArrayGrid<bool> {
    /// Build a transparency grid from ASCII rows, where `#` is opaque.
    ///
    /// Every row must be as long as the first one.
    pub fn from_ascii(rows: &[&str]) -> Result<Self> {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |r| r.chars().count());
        if let Some((row, found)) = rows
            .iter()
            .map(|r| r.chars().count())
            .enumerate()
            .find(|(_, len)| *len != width)
        {
            return Err(Error::RaggedRow {
                row,
                expected: width,
                found,
            });
        }
        let width = i32::try_from(width).map_err(|_| Error::InvalidDimensions {
            width: i32::MAX,
            height,
        })?;
        let cells: Vec<bool> = rows
            .iter()
            .flat_map(|row| row.chars().map(|c| c != '#'))
            .collect();
        Self::from_vec(width, height, cells)
    }
}

/// Returns the cell count of a valid grid
fn check_dimensions(width: i32, height: i32) -> Result<usize> {
    match width.checked_mul(height) {
        Some(count) if width > 0 && height > 0 => Ok(count as usize),
        _ => Err(Error::InvalidDimensions { width, height }),
    }
}

impl<T: Clone> GridView for ArrayGrid<T> {
    type Item = T;

    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn get(&self, pos: Position) -> T {
        self.cells[pos.to_index(self.width)].clone()
    }
}

impl<T: Clone> SettableGridView for ArrayGrid<T> {
    fn set(&mut self, pos: Position, value: T) {
        if let Some(cell) = self.get_mut(pos) {
            *cell = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::LambdaGrid;

    #[test]
    fn test_new_and_set() {
        let mut grid = ArrayGrid::new(4, 3, 0.0).unwrap();
        assert_eq!(grid.count(), 12);
        grid.set_xy(2, 1, 1.0);
        assert_eq!(grid.get_xy(2, 1), 1.0);
        assert_eq!(grid.get_index(6), 1.0);

        // Out of bounds writes are ignored
        grid.set_xy(9, 9, 5.0);
        assert!(grid.as_slice().iter().all(|v| *v <= 1.0));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert_eq!(
            ArrayGrid::new(0, 3, false),
            Err(Error::InvalidDimensions { width: 0, height: 3 })
        );
        assert!(matches!(
            ArrayGrid::from_vec(2, 2, vec![1, 2, 3]),
            Err(Error::CellCountMismatch { expected: 4, found: 3, .. })
        ));
    }

    #[test]
    fn test_oversized_dimensions() {
        assert_eq!(
            ArrayGrid::new(46341, 46341, false),
            Err(Error::InvalidDimensions { width: 46341, height: 46341 })
        );
        assert_eq!(
            ArrayGrid::from_vec(i32::MAX, 2, Vec::<u8>::new()),
            Err(Error::InvalidDimensions { width: i32::MAX, height: 2 })
        );
    }

    #[test]
    fn test_apply_overlay() {
        let mut grid = ArrayGrid::new(3, 2, 0).unwrap();
        let overlay = LambdaGrid::new(3, 2, |p: Position| p.x + p.y);
        grid.apply_overlay(&overlay).unwrap();
        assert_eq!(grid.as_slice(), &[0, 1, 2, 1, 2, 3]);

        let wrong = LambdaGrid::new(2, 2, |_: Position| 7);
        assert!(matches!(
            grid.apply_overlay(&wrong),
            Err(Error::DimensionMismatch { found_width: 2, .. })
        ));
        // Unchanged after the failed overlay
        assert_eq!(grid.get_xy(2, 1), 3);
    }

    #[test]
    fn test_from_ascii() {
        let grid = ArrayGrid::from_ascii(&["..#", "#.."]).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert!(!grid.get_xy(2, 0));
        assert!(!grid.get_xy(0, 1));
        assert!(grid.get_xy(1, 1));
    }

    #[test]
    fn test_from_ascii_ragged_rows() {
        // Six cells in total, but the rows disagree on the width
        assert_eq!(
            ArrayGrid::from_ascii(&["..", "...", "."]),
            Err(Error::RaggedRow { row: 1, expected: 2, found: 3 })
        );
    }
}
