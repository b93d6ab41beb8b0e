//! Recursive shadowcasting
//!
//! Each octant is scanned row by row away from the origin while a window of
//! slopes `[end, start]` tracks the part of the octant that is still
//! unobstructed. Hitting a wall narrows the window for the rest of the row
//! and spawns a sub-scan for the part of the window left of the wall.

use std::collections::HashSet;
use std::f64::consts::TAU;

use crate::geometry::{Distance, Position};
use crate::grid::GridView;

/// Resistance at or above this value blocks sight completely.
pub const OPAQUE: f64 = 1.0;

/// Maps a local scan delta onto grid axes: `x = dx * xx + dy * xy`,
/// `y = dx * yx + dy * yy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Octant {
    pub xx: i32,
    pub xy: i32,
    pub yx: i32,
    pub yy: i32,
}

impl Octant {
    /// All eight octants, two per diagonal direction
    pub const ALL: [Octant; 8] = [
        Octant { xx: 0, xy: -1, yx: -1, yy: 0 },
        Octant { xx: -1, xy: 0, yx: 0, yy: -1 },
        Octant { xx: 0, xy: 1, yx: -1, yy: 0 },
        Octant { xx: 1, xy: 0, yx: 0, yy: -1 },
        Octant { xx: 0, xy: -1, yx: 1, yy: 0 },
        Octant { xx: -1, xy: 0, yx: 0, yy: 1 },
        Octant { xx: 0, xy: 1, yx: 1, yy: 0 },
        Octant { xx: 1, xy: 0, yx: 0, yy: 1 },
    ];

    #[inline]
    fn transform(&self, dx: i32, dy: i32) -> Position {
        Position::new(dx * self.xx + dy * self.xy, dx * self.yx + dy * self.yy)
    }
}

/// A viewing cone, in radians. `angle` 0 points up and grows clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    pub angle: f64,
    pub span: f64,
}

impl Cone {
    /// Build a cone from degrees, wrapping `angle` into `[0, 360)`.
    pub fn from_degrees(angle: f64, span: f64) -> Self {
        Self {
            angle: angle.rem_euclid(360.0).to_radians(),
            span: span.to_radians(),
        }
    }

    /// Whether the cell at `delta` from the origin falls inside the cone
    pub fn contains(&self, delta: Position) -> bool {
        let half = self.span * 0.5;
        let bearing = f64::from(delta.x).atan2(f64::from(-delta.y)).rem_euclid(TAU);
        let diff = (self.angle - bearing).abs();
        diff <= half || diff >= TAU - half
    }
}

/// Per-calculation state shared by every octant scan.
pub struct Caster<'a, G> {
    pub resistance: &'a G,
    pub origin: Position,
    pub radius: f64,
    pub decay: f64,
    pub distance: Distance,
    pub cone: Option<Cone>,
    pub light: &'a mut [f64],
    pub lit: &'a mut HashSet<Position>,
}

impl<G: GridView<Item = f64>> Caster<'_, G> {
    /// Scan one octant starting at `row` with the slope window `[end, start]`.
    pub fn cast(&mut self, row: i32, mut start_slope: f64, end_slope: f64, octant: Octant) {
        if start_slope < end_slope {
            return;
        }

        let width = self.resistance.width();
        let height = self.resistance.height();
        let mut next_start_slope = 0.0;
        let mut blocked = false;

        let mut distance = row;
        while f64::from(distance) <= self.radius && distance < width + height && !blocked {
            let dy = -distance;
            for dx in -distance..=0 {
                let delta = octant.transform(dx, dy);
                let current = self.origin + delta;

                let left_slope = (f64::from(dx) - 0.5) / (f64::from(dy) + 0.5);
                let right_slope = (f64::from(dx) + 0.5) / (f64::from(dy) - 0.5);

                if !self.resistance.in_bounds(current) || start_slope < right_slope {
                    continue;
                }
                if end_slope > left_slope {
                    break;
                }

                let delta_radius = self.distance.calculate(dx, dy);
                if delta_radius <= self.radius && self.cone.map_or(true, |c| c.contains(delta)) {
                    let brightness = 1.0 - self.decay * delta_radius;
                    if brightness > 0.0 {
                        self.light[current.to_index(width)] = brightness;
                        self.lit.insert(current);
                    }
                }

                let opaque = self.resistance.get(current) >= OPAQUE;
                if blocked {
                    if opaque {
                        next_start_slope = right_slope;
                        continue;
                    }
                    blocked = false;
                    start_slope = next_start_slope;
                } else if opaque && f64::from(distance) < self.radius {
                    blocked = true;
                    self.cast(distance + 1, start_slope, left_slope, octant);
                    next_start_slope = right_slope;
                }
            }
            distance += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octants_cover_every_neighbor() {
        // Row 1 of each octant touches the two neighbors on its edges
        let mut seen = HashSet::new();
        for octant in Octant::ALL {
            for dx in -1..=0 {
                seen.insert(octant.transform(dx, -1));
            }
        }
        assert_eq!(seen.len(), 8);
        assert!(!seen.contains(&Position::new(0, 0)));
    }

    #[test]
    fn test_cone_contains() {
        let up = Cone::from_degrees(0.0, 90.0);
        assert!(up.contains(Position::new(0, -3)));
        assert!(up.contains(Position::new(1, -3)));
        assert!(!up.contains(Position::new(3, 0)));
        assert!(!up.contains(Position::new(0, 3)));

        let wrapped = Cone::from_degrees(-90.0, 60.0);
        assert!(wrapped.contains(Position::new(-4, 0)));
        assert!(!wrapped.contains(Position::new(4, 0)));

        // A cone straddling the 0/360 seam
        let seam = Cone::from_degrees(350.0, 40.0);
        assert!(seam.contains(Position::new(1, -10)));
        assert!(seam.contains(Position::new(-1, -5)));
        assert!(!seam.contains(Position::new(1, -2)));
    }

    #[test]
    fn test_cone_full_circle() {
        let all = Cone::from_degrees(123.0, 360.0);
        for (x, y) in [(1, 0), (-1, 0), (0, 1), (0, -1), (3, 2), (-2, -5)] {
            assert!(all.contains(Position::new(x, y)));
        }
    }
}
