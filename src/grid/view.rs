//! Grid view traits and lightweight adapters

use crate::geometry::Position;

/// Read access to a `width` x `height` grid of values.
///
/// `get` is only required to answer for in-bounds positions; callers check
/// [`GridView::in_bounds`] first.
pub trait GridView {
    type Item;

    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn get(&self, pos: Position) -> Self::Item;

    #[inline]
    fn get_xy(&self, x: i32, y: i32) -> Self::Item {
        self.get(Position::new(x, y))
    }

    #[inline]
    fn get_index(&self, idx: usize) -> Self::Item {
        self.get(Position::from_index(idx, self.width()))
    }

    #[inline]
    fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width() && pos.y >= 0 && pos.y < self.height()
    }

    /// Number of cells
    fn count(&self) -> usize {
        self.width().max(0) as usize * self.height().max(0) as usize
    }

    /// Every position in row-major order
    fn positions(&self) -> Box<dyn Iterator<Item = Position> + '_> {
        let width = self.width();
        Box::new((0..self.count()).map(move |idx| Position::from_index(idx, width)))
    }
}

/// A grid view whose cells can be overwritten.
pub trait SettableGridView: GridView {
    fn set(&mut self, pos: Position, value: Self::Item);

    fn set_xy(&mut self, x: i32, y: i32, value: Self::Item) {
        self.set(Position::new(x, y), value);
    }
}

impl<G: GridView + ?Sized> GridView for &G {
    type Item = G::Item;

    fn width(&self) -> i32 {
        (**self).width()
    }

    fn height(&self) -> i32 {
        (**self).height()
    }

    fn get(&self, pos: Position) -> Self::Item {
        (**self).get(pos)
    }
}

/// A grid whose values are produced on demand by a closure.
pub struct LambdaGrid<F> {
    width: i32,
    height: i32,
    value_at: F,
}

impl<T, F: Fn(Position) -> T> LambdaGrid<F> {
    pub fn new(width: i32, height: i32, value_at: F) -> Self {
        Self { width, height, value_at }
    }
}

impl<T, F: Fn(Position) -> T> GridView for LambdaGrid<F> {
    type Item = T;

    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn get(&self, pos: Position) -> T {
        (self.value_at)(pos)
    }
}

/// Presents the values of another view through a translation function.
pub struct TranslationGrid<G, F> {
    base: G,
    translate: F,
}

impl<G: GridView, T, F: Fn(G::Item) -> T> TranslationGrid<G, F> {
    pub fn new(base: G, translate: F) -> Self {
        Self { base, translate }
    }

    /// The wrapped view
    pub fn base(&self) -> &G {
        &self.base
    }
}

impl<G: GridView, T, F: Fn(G::Item) -> T> GridView for TranslationGrid<G, F> {
    type Item = T;

    fn width(&self) -> i32 {
        self.base.width()
    }

    fn height(&self) -> i32 {
        self.base.height()
    }

    fn get(&self, pos: Position) -> T {
        (self.translate)(self.base.get(pos))
    }
}

/// Adapts a transparency map (`true` = see-through) to resistance values:
/// transparent cells resist nothing, opaque ones block completely.
pub fn transparency_to_resistance<G>(transparency: G) -> impl GridView<Item = f64>
where
    G: GridView<Item = bool>,
{
    TranslationGrid::new(transparency, |transparent: bool| if transparent { 0.0 } else { 1.0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lambda_grid() {
        let grid = LambdaGrid::new(4, 3, |p: Position| p.x * 10 + p.y);
        assert_eq!(grid.count(), 12);
        assert_eq!(grid.get_xy(3, 2), 32);
        assert_eq!(grid.get_index(5), 11);
        assert!(grid.in_bounds(Position::new(3, 2)));
        assert!(!grid.in_bounds(Position::new(4, 0)));
        assert!(!grid.in_bounds(Position::new(0, -1)));
    }

    #[test]
    fn test_positions_row_major() {
        let grid = LambdaGrid::new(2, 2, |_: Position| ());
        let all: Vec<_> = grid.positions().collect();
        assert_eq!(
            all,
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(0, 1),
                Position::new(1, 1)
            ]
        );
    }

    #[test]
    fn test_transparency_to_resistance() {
        let walls = LambdaGrid::new(3, 1, |p: Position| p.x != 1);
        let resistance = transparency_to_resistance(&walls);
        assert_eq!(resistance.width(), 3);
        assert_eq!(resistance.get_xy(0, 0), 0.0);
        assert_eq!(resistance.get_xy(1, 0), 1.0);
    }
}
