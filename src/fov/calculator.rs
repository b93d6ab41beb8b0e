//! FOV calculator
//!
//! Owns the light grid and the visible sets, and drives the shadowcaster
//! over all eight octants.

use std::collections::HashSet;

use super::shadowcast::{Caster, Cone, Octant};
use crate::config::SightConfig;
use crate::geometry::{Distance, Position};
use crate::grid::GridView;

/// Visibility computed from a single origin.
///
/// Every lit cell (light > 0) is in [`Fov::current_fov`] and every cell
/// outside it has light 0. Each `calculate*` call moves the current set to
/// the previous one before recomputing, which is what
/// [`Fov::newly_seen`] and [`Fov::newly_unseen`] compare.
#[derive(Debug, Clone, Default)]
pub struct Fov {
    width: i32,
    height: i32,
    light: Vec<f64>,
    current: HashSet<Position>,
    previous: HashSet<Position>,
}

impl Fov {
    /// Create an empty FOV; buffers are sized on the first calculation
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute unbounded circular visibility from `origin`.
    pub fn calculate<G>(&mut self, resistance: &G, origin: Position)
    where
        G: GridView<Item = f64>,
    {
        self.calculate_radius(resistance, origin, f64::MAX, Distance::Euclidean);
    }

    /// Compute visibility out to `radius`, measured with `distance`.
    ///
    /// Radii below 1 are treated as 1.
    pub fn calculate_radius<G>(
        &mut self,
        resistance: &G,
        origin: Position,
        radius: f64,
        distance: impl Into<Distance>,
    ) where
        G: GridView<Item = f64>,
    {
        self.run(resistance, origin, radius, distance.into(), None);
    }

    /// Compute visibility restricted to a cone.
    ///
    /// `angle` is the bearing of the cone's center line in degrees, 0 being
    /// up and growing clockwise; it is wrapped into `[0, 360)`. `span` is
    /// the full width of the cone in degrees. A span of 0 or less lights
    /// only the origin.
    pub fn calculate_cone<G>(
        &mut self,
        resistance: &G,
        origin: Position,
        radius: f64,
        distance: impl Into<Distance>,
        angle: f64,
        span: f64,
    ) where
        G: GridView<Item = f64>,
    {
        let cone = Cone::from_degrees(angle, span);
        self.run(resistance, origin, radius, distance.into(), Some(cone));
    }

    /// Compute visibility as described by a [`SightConfig`].
    pub fn calculate_with<G>(&mut self, resistance: &G, origin: Position, config: &SightConfig)
    where
        G: GridView<Item = f64>,
    {
        let radius = config.radius.unwrap_or(f64::MAX);
        match config.cone {
            Some(cone) => self.calculate_cone(
                resistance,
                origin,
                radius,
                config.shape,
                cone.angle,
                cone.span,
            ),
            None => self.calculate_radius(resistance, origin, radius, config.shape),
        }
    }

    fn run<G>(
        &mut self,
        resistance: &G,
        origin: Position,
        radius: f64,
        distance: Distance,
        cone: Option<Cone>,
    ) where
        G: GridView<Item = f64>,
    {
        self.previous = std::mem::take(&mut self.current);
        self.reset_light(resistance.width(), resistance.height());

        if !resistance.in_bounds(origin) {
            log::warn!(
                "FOV origin {} is outside the {}x{} grid",
                origin,
                self.width,
                self.height
            );
            return;
        }

        let radius = radius.max(1.0);
        let decay = 1.0 / (radius + 1.0);

        // Origin is always fully lit
        self.light[origin.to_index(self.width)] = 1.0;
        self.current.insert(origin);

        let sweep = cone.map_or(true, |c| c.span > 0.0);
        if sweep {
            let mut caster = Caster {
                resistance,
                origin,
                radius,
                decay,
                distance,
                cone,
                light: &mut self.light,
                lit: &mut self.current,
            };
            for octant in Octant::ALL {
                caster.cast(1, 1.0, 0.0, octant);
            }
        }

        log::debug!(
            "FOV from {}: {} visible, {} newly seen, {} newly unseen",
            origin,
            self.current.len(),
            self.newly_seen().count(),
            self.newly_unseen().count()
        );
    }

    /// Zero the light grid, reallocating only when the dimensions changed
    fn reset_light(&mut self, width: i32, height: i32) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.light = vec![0.0; width.max(0) as usize * height.max(0) as usize];
        } else {
            self.light.fill(0.0);
        }
    }

    /// Clear all light and both visible sets
    pub fn reset(&mut self) {
        self.light.fill(0.0);
        self.current.clear();
        self.previous.clear();
    }

    /// Light at a position, 0 when out of bounds
    pub fn light(&self, pos: Position) -> f64 {
        if self.in_bounds(pos) {
            self.light[pos.to_index(self.width)]
        } else {
            0.0
        }
    }

    /// Light at a row-major index
    pub fn light_at_index(&self, idx: usize) -> f64 {
        self.light.get(idx).copied().unwrap_or(0.0)
    }

    pub fn is_visible(&self, pos: Position) -> bool {
        self.current.contains(&pos)
    }

    /// Lit/unlit view of the light grid
    pub fn boolean(&self) -> BooleanFov<'_> {
        BooleanFov { fov: self }
    }

    /// Every position visible after the last calculation
    pub fn current_fov(&self) -> impl Iterator<Item = Position> + '_ {
        self.current.iter().copied()
    }

    /// Positions visible now that were not visible before the last calculation
    pub fn newly_seen(&self) -> impl Iterator<Item = Position> + '_ {
        self.current.difference(&self.previous).copied()
    }

    /// Positions visible before the last calculation that no longer are
    pub fn newly_unseen(&self) -> impl Iterator<Item = Position> + '_ {
        self.previous.difference(&self.current).copied()
    }
}

impl GridView for Fov {
    type Item = f64;

    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn get(&self, pos: Position) -> f64 {
        self.light(pos)
    }
}

/// `true` wherever the FOV's light is above zero
#[derive(Debug, Clone, Copy)]
pub struct BooleanFov<'a> {
    fov: &'a Fov,
}

impl GridView for BooleanFov<'_> {
    type Item = bool;

    fn width(&self) -> i32 {
        self.fov.width
    }

    fn height(&self) -> i32 {
        self.fov.height
    }

    fn get(&self, pos: Position) -> bool {
        self.fov.light(pos) > 0.0
    }
}
