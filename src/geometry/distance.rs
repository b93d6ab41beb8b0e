//! Distance metrics and radius shapes
//!
//! A [`Distance`] turns a delta into a scalar. A [`Radius`] is the shape a
//! distance traces out when bounded, which is how callers usually think
//! about sight ranges.

use serde::{Deserialize, Serialize};

use super::Position;

/// A distance metric over grid deltas.
///
/// Every metric is zero at `(0, 0)` and never decreases as `|dx|` or `|dy|`
/// grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Distance {
    /// Straight-line distance
    #[default]
    Euclidean,
    /// `max(|dx|, |dy|)`: diagonals cost the same as orthogonal steps
    Chebyshev,
    /// `|dx| + |dy|`: no diagonal movement
    Manhattan,
    /// `max + min / 2`: diagonals cost one and a half steps
    Octagonal,
}

impl Distance {
    /// Distance covered by the delta `(dx, dy)`.
    pub fn calculate(self, dx: i32, dy: i32) -> f64 {
        let dx = f64::from(dx.abs());
        let dy = f64::from(dy.abs());
        match self {
            Distance::Euclidean => (dx * dx + dy * dy).sqrt(),
            Distance::Chebyshev => dx.max(dy),
            Distance::Manhattan => dx + dy,
            Distance::Octagonal => dx.max(dy) + 0.5 * dx.min(dy),
        }
    }

    /// Distance between two positions.
    pub fn calculate_between(self, a: Position, b: Position) -> f64 {
        self.calculate(b.x - a.x, b.y - a.y)
    }

    /// A value ordered like [`Distance::calculate`] but cheaper to compute.
    ///
    /// Only meaningful for ranking; Euclidean skips the square root.
    pub fn magnitude(self, dx: i32, dy: i32) -> f64 {
        match self {
            Distance::Euclidean => {
                let dx = f64::from(dx);
                let dy = f64::from(dy);
                dx * dx + dy * dy
            }
            other => other.calculate(dx, dy),
        }
    }
}

/// The shape traced by all cells within a fixed distance of a center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Radius {
    #[default]
    Circle,
    Square,
    Diamond,
    Octagon,
}

impl Radius {
    /// The metric whose bounded region has this shape
    pub fn distance(self) -> Distance {
        self.into()
    }

    /// Every position within `radius` of `center`, nearest first.
    ///
    /// Ties are broken by row, then column.
    pub fn positions(self, center: Position, radius: i32) -> Vec<Position> {
        let distance = self.distance();
        let radius = radius.max(0);
        let limit = f64::from(radius);
        let mut area: Vec<(f64, Position)> = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let d = distance.calculate(dx, dy);
                if d <= limit {
                    area.push((d, center + Position::new(dx, dy)));
                }
            }
        }
        area.sort_by(|(da, pa), (db, pb)| {
            da.total_cmp(db)
                .then_with(|| pa.y.cmp(&pb.y))
                .then_with(|| pa.x.cmp(&pb.x))
        });
        area.into_iter().map(|(_, pos)| pos).collect()
    }
}

impl From<Radius> for Distance {
    fn from(radius: Radius) -> Self {
        match radius {
            Radius::Circle => Distance::Euclidean,
            Radius::Square => Distance::Chebyshev,
            Radius::Diamond => Distance::Manhattan,
            Radius::Octagon => Distance::Octagonal,
        }
    }
}

impl From<Distance> for Radius {
    fn from(distance: Distance) -> Self {
        match distance {
            Distance::Euclidean => Radius::Circle,
            Distance::Chebyshev => Radius::Square,
            Distance::Manhattan => Radius::Diamond,
            Distance::Octagonal => Radius::Octagon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Distance; 4] = [
        Distance::Euclidean,
        Distance::Chebyshev,
        Distance::Manhattan,
        Distance::Octagonal,
    ];

    #[test]
    fn test_zero_delta_is_zero() {
        for d in ALL {
            assert_eq!(d.calculate(0, 0), 0.0);
            assert_eq!(d.magnitude(0, 0), 0.0);
        }
    }

    #[test]
    fn test_known_values() {
        assert!((Distance::Euclidean.calculate(3, -4) - 5.0).abs() < 1e-12);
        assert_eq!(Distance::Chebyshev.calculate(3, -4), 4.0);
        assert_eq!(Distance::Manhattan.calculate(3, -4), 7.0);
        assert_eq!(Distance::Octagonal.calculate(3, -4), 5.5);
        assert_eq!(Distance::Euclidean.magnitude(3, -4), 25.0);
    }

    #[test]
    fn test_monotonic_in_each_axis() {
        for d in ALL {
            for dy in -6..=6 {
                for dx in 0..6 {
                    assert!(d.calculate(dx + 1, dy) >= d.calculate(dx, dy));
                    assert!(d.calculate(-dx - 1, dy) >= d.calculate(-dx, dy));
                }
            }
        }
    }

    #[test]
    fn test_radius_shapes() {
        let center = Position::new(10, 10);
        assert_eq!(Radius::Square.positions(center, 1).len(), 9);
        assert_eq!(Radius::Diamond.positions(center, 1).len(), 5);
        assert_eq!(Radius::Circle.positions(center, 2).len(), 13);
        assert_eq!(Radius::Square.positions(center, 2).len(), 25);
        assert_eq!(Radius::Circle.positions(center, 0), vec![center]);
    }

    #[test]
    fn test_negative_radius_is_origin_only() {
        let center = Position::new(3, 3);
        for shape in [Radius::Circle, Radius::Square, Radius::Diamond, Radius::Octagon] {
            assert_eq!(shape.positions(center, -2), vec![center]);
        }
    }

    #[test]
    fn test_radius_area_is_nearest_first() {
        let area = Radius::Diamond.positions(Position::new(0, 0), 2);
        assert_eq!(area[0], Position::new(0, 0));
        assert_eq!(area[1], Position::new(0, -1));
        assert_eq!(area[4], Position::new(0, 1));
        let last = *area.last().unwrap();
        assert_eq!(last, Position::new(0, 2));
    }

    #[test]
    fn test_radius_distance_conversion() {
        for d in ALL {
            assert_eq!(Distance::from(Radius::from(d)), d);
        }
    }
}
