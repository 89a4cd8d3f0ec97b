//! Search spaces over a level's terrain.

use delve_core::Point;
use delve_paths::{Neighbors, Pather, SearchSpace};

use crate::level::Level;
use crate::terrain::Terrain;

/// Penalties for routing a tunnel through non-walkable terrain.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TunnelCosts {
    /// Entering undug rock.
    pub empty: f64,
    /// Entering a wall.
    pub wall: f64,
    /// Entering a wall straight from another wall.
    pub double_wall: f64,
}

impl Default for TunnelCosts {
    fn default() -> Self {
        Self {
            empty: 5.0,
            wall: 5.5,
            double_wall: 20.0,
        }
    }
}

/// Every cell of the level, 4-way, priced by what a tunnel would have to
/// dig through. Walls and doors are only entered and left across their wall
/// line, never along it, and room corners are never entered.
#[derive(Debug, Clone, Copy)]
pub struct TunnelSpace<'a> {
    level: &'a Level,
    costs: TunnelCosts,
}

impl<'a> TunnelSpace<'a> {
    pub fn new(level: &'a Level, costs: TunnelCosts) -> Self {
        Self { level, costs }
    }
}

impl Pather for TunnelSpace<'_> {
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        let Some(&from) = self.level.node(p) else {
            return;
        };
        let level = self.level;
        Neighbors::Cardinal.extend(
            p,
            |q| {
                let step = q - p;
                from.passable(step) && level.node(q).is_some_and(|to| to.passable(step))
            },
            buf,
        );
    }
}

impl SearchSpace for TunnelSpace<'_> {
    fn penalty(&self, parent: Point, p: Point) -> f64 {
        match self.level.terrain(p) {
            Some(Terrain::Empty) => self.costs.empty,
            Some(Terrain::Wall)
                if matches!(self.level.terrain(parent), Some(Terrain::Wall | Terrain::Door)) =>
            {
                self.costs.double_wall
            }
            Some(Terrain::Wall) => self.costs.wall,
            Some(_) => 0.0,
            None => f64::INFINITY,
        }
    }
}

/// Walkable cells only.
#[derive(Debug, Clone, Copy)]
pub struct TravelSpace<'a> {
    level: &'a Level,
    neighbors: Neighbors,
}

impl<'a> TravelSpace<'a> {
    /// 8-way movement, for walking routes.
    pub fn new(level: &'a Level) -> Self {
        Self {
            level,
            neighbors: Neighbors::All,
        }
    }

    /// 4-way movement, matching how tunnels are dug.
    pub fn cardinal(level: &'a Level) -> Self {
        Self {
            level,
            neighbors: Neighbors::Cardinal,
        }
    }
}

impl Pather for TravelSpace<'_> {
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        self.neighbors.extend(p, |q| self.level.is_movable(q), buf);
    }
}

impl SearchSpace for TravelSpace<'_> {
    fn estimate(&self, p: Point, goal: Point) -> f64 {
        match self.neighbors {
            Neighbors::Cardinal => f64::from(delve_paths::manhattan(p, goal)),
            Neighbors::All => f64::from((p.x - goal.x).abs().max((p.y - goal.y).abs())),
        }
    }
}
