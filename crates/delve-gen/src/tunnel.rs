//! Digging tunnels between connected rooms.
//!
//! A connection is first tried as a straight dogleg: one door on each
//! facing wall, a corridor along the main axis and one bend. Rooms sharing
//! a wall line only need a door. When neither fits, the tunnel is routed
//! with a best-first search through the terrain. The search only passes
//! walls square on and away from corners, so every wall it meets gets one
//! door.

use delve_core::{Point, Range};
use delve_paths::{CostWeights, PathSearch};

use crate::connect::RoomConnection;
use crate::error::{ConnectivityError, GenError, GeometryError};
use crate::level::Level;
use crate::random::RandomSource;
use crate::room::Room;
use crate::space::{TunnelCosts, TunnelSpace};
use crate::terrain::Terrain;

/// Default limit on doors a single searched tunnel may open.
pub const DEFAULT_MAX_CROSSINGS: usize = 16;

/// Cells a straight tunnel will write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Plan {
    doors: Vec<Point>,
    tunnel: Vec<Point>,
}

impl Plan {
    /// Whether every write lands on terrain that accepts it. Doors may not
    /// open on another room's corner.
    fn fits(&self, level: &Level) -> bool {
        self.doors.iter().all(|&p| {
            level
                .node(p)
                .is_some_and(|n| matches!(n.terrain, Terrain::Wall | Terrain::Door) && !n.corner)
        })
            && self
                .tunnel
                .iter()
                .all(|&p| matches!(level.terrain(p), Some(Terrain::Empty | Terrain::Tunnel)))
    }

    fn apply(&self, level: &mut Level) -> Result<(), GeometryError> {
        for &p in &self.doors {
            level.add_door(p)?;
        }
        for &p in &self.tunnel {
            level.tunnel(p)?;
        }
        Ok(())
    }
}

/// A room's extent along the tunnel's main axis and across it.
#[derive(Debug, Clone, Copy)]
struct Extent {
    main: i32,
    main_len: i32,
    cross: i32,
    cross_len: i32,
}

impl Extent {
    fn of(room: &Room, horizontal: bool) -> Self {
        if horizontal {
            Self {
                main: room.x(),
                main_len: room.width(),
                cross: room.y(),
                cross_len: room.height(),
            }
        } else {
            Self {
                main: room.y(),
                main_len: room.height(),
                cross: room.x(),
                cross_len: room.width(),
            }
        }
    }
}

/// A door position on a wall `len` cells long starting at `start`, never
/// on a corner.
fn door_offset(random: &mut impl RandomSource, start: i32, len: i32) -> i32 {
    start + 1 + random.next_int_bounded(len - 2)
}

/// Where the corridor turns, strictly between the two walls.
fn bend_offset(random: &mut impl RandomSource, low: i32, high: i32) -> i32 {
    let span = high - low;
    if span < 4 {
        low + (span + 1) / 2
    } else {
        low + 1 + random.next_int_bounded(span - 1)
    }
}

/// Lay out a straight tunnel from `first` to `second`, or `None` when the
/// rooms are too close or overlap along the main axis.
fn plan_straight(first: &Room, second: &Room, random: &mut impl RandomSource) -> Option<Plan> {
    let (left, right) = if first.x() < second.x() { (first, second) } else { (second, first) };
    let (top, bottom) = if first.y() < second.y() { (first, second) } else { (second, first) };
    let horizontal = right.x() - left.right() > bottom.y() - top.bottom();
    let (low, high) = if horizontal { (left, right) } else { (top, bottom) };
    let low = Extent::of(low, horizontal);
    let high = Extent::of(high, horizontal);
    let at = |main: i32, cross: i32| {
        if horizontal {
            Point::new(main, cross)
        } else {
            Point::new(cross, main)
        }
    };

    let low_wall = low.main + low.main_len - 1;
    let high_wall = high.main;
    let span = high_wall - low_wall;

    if span == 0 {
        // Shared wall: a door anywhere both floors touch.
        let from = (low.cross + 1).max(high.cross + 1);
        let to = (low.cross + low.cross_len - 1).min(high.cross + high.cross_len - 1);
        if to <= from {
            return None;
        }
        let door = from + random.next_int_bounded(to - from);
        return Some(Plan {
            doors: vec![at(low_wall, door)],
            tunnel: Vec::new(),
        });
    }
    if span < 2 {
        return None;
    }

    let low_door = door_offset(random, low.cross, low.cross_len);
    let high_door = door_offset(random, high.cross, high.cross_len);
    let bend = bend_offset(random, low_wall, high_wall);

    let mut tunnel: Vec<Point> = (low_wall + 1..high_wall)
        .map(|i| at(i, if i <= bend { low_door } else { high_door }))
        .collect();
    tunnel.extend((low_door.min(high_door)..=low_door.max(high_door)).map(|i| at(bend, i)));

    Some(Plan {
        doors: vec![at(low_wall, low_door), at(high_wall, high_door)],
        tunnel,
    })
}

/// Turn the rock along `cells` into tunnel, leaving everything else.
fn carve(level: &mut Level, cells: &[Point]) -> Result<(), GeometryError> {
    for &p in cells {
        if level.terrain(p) == Some(Terrain::Empty) {
            level.tunnel(p)?;
        }
    }
    Ok(())
}

/// Digs the tunnels for room connections.
#[derive(Debug)]
pub struct Tunneler {
    search: PathSearch,
    costs: TunnelCosts,
    max_crossings: usize,
}

impl Tunneler {
    pub fn new(bounds: Range) -> Self {
        Self {
            search: PathSearch::new(bounds),
            costs: TunnelCosts::default(),
            max_crossings: DEFAULT_MAX_CROSSINGS,
        }
    }

    pub fn with_costs(mut self, costs: TunnelCosts) -> Self {
        self.costs = costs;
        self
    }

    pub fn with_weights(mut self, weights: CostWeights) -> Self {
        self.search = self.search.with_weights(weights);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.search = self.search.with_max_depth(max_depth);
        self
    }

    pub fn with_max_crossings(mut self, max_crossings: usize) -> Self {
        self.max_crossings = max_crossings;
        self
    }

    /// Dig a tunnel between rooms `a` and `b`.
    ///
    /// Returns `Ok(false)` when no tunnel could be dug; the pair is then
    /// recorded in [`Level::failed_connections`]. Errors mean a write hit
    /// terrain the plan had not expected.
    pub fn dig(
        &mut self,
        level: &mut Level,
        a: usize,
        b: usize,
        random: &mut impl RandomSource,
    ) -> Result<bool, GenError> {
        let count = level.rooms().len();
        let bad_room = |index: usize| ConnectivityError::BadRoomNumber {
            index,
            number: index,
            max: count.saturating_sub(1),
        };
        let first = level.room(a).cloned().ok_or_else(|| bad_room(a))?;
        let second = level.room(b).cloned().ok_or_else(|| bad_room(b))?;

        if let Some(plan) = plan_straight(&first, &second, random) {
            if plan.fits(level) {
                plan.apply(level)?;
                return Ok(true);
            }
            log::debug!("tunnel {first}<->{second}: straight route blocked, searching");
        }

        if self.search.range() != level.bounds() {
            self.search.set_range(level.bounds());
        }
        let dug = self.dig_searched(level, first.midpoint(), second.midpoint())?;
        if !dug {
            log::warn!("tunnel {first}<->{second}: abandoned");
            level.record_failed(a, b);
        }
        Ok(dug)
    }

    /// Route from `start` to `goal` through the terrain. The first wall
    /// crossing on the route becomes a door (two for back-to-back walls) and
    /// the search restarts just past it, until a route needs no more doors.
    fn dig_searched(
        &mut self,
        level: &mut Level,
        mut start: Point,
        goal: Point,
    ) -> Result<bool, GenError> {
        for _ in 0..=self.max_crossings {
            let found = self
                .search
                .travel_path(&TunnelSpace::new(level, self.costs), start, goal);
            let path = match found {
                Ok(Some(path)) => path,
                Ok(None) => {
                    log::warn!("no route from {start} to {goal}");
                    return Ok(false);
                }
                Err(err) => {
                    log::warn!("route from {start} to {goal} failed: {err}");
                    return Ok(false);
                }
            };

            let is_wall = |level: &Level, p: Point| level.terrain(p) == Some(Terrain::Wall);
            let wall = path.iter().position(|&p| is_wall(level, p));
            carve(level, &path[..wall.unwrap_or(path.len())])?;
            let Some(mut i) = wall else {
                return Ok(true);
            };
            while i < path.len() && is_wall(level, path[i]) {
                level.add_door(path[i])?;
                i += 1;
            }
            let Some(&past) = path.get(i) else {
                return Ok(true);
            };
            carve(level, &[past])?;
            if past == goal {
                return Ok(true);
            }
            start = past;
        }
        log::warn!("route to {goal} still crosses walls after {} crossings", self.max_crossings);
        Ok(false)
    }

    /// Dig every connection in order, marking the ones that were dug.
    /// Returns how many were dug.
    pub fn dig_all(
        &mut self,
        level: &mut Level,
        edges: &mut [RoomConnection],
        random: &mut impl RandomSource,
    ) -> Result<usize, GenError> {
        let mut dug = 0;
        for edge in edges.iter_mut() {
            if self.dig(level, edge.a(), edge.b(), random)? {
                edge.set_drawn();
                dug += 1;
            }
        }
        log::debug!("tunnels: dug {dug} of {}", edges.len());
        Ok(dug)
    }
}
