//! The generated level: a terrain grid plus the rooms drawn on it.

use std::fmt;
use std::io;

use delve_core::{Grid, Point, Range};
use delve_paths::{PathSearch, SearchError};

use crate::error::GeometryError;
use crate::room::Room;
use crate::space::TravelSpace;
use crate::terrain::Terrain;

/// One cell of the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub terrain: Terrain,
    /// Walls on the left or right edge of a room render as `|`. Doors
    /// keep the flag of the wall they replaced.
    pub side_wall: bool,
    /// Corner of at least one room.
    pub corner: bool,
    /// Debug label drawn instead of the terrain.
    pub label: Option<char>,
}

impl Node {
    /// Map character for this cell.
    pub fn ch(&self) -> char {
        match (self.label, self.terrain) {
            (Some(c), _) => c,
            (None, Terrain::Wall) if self.side_wall => '|',
            (None, t) => t.ch(),
        }
    }

    /// Whether a tunnel moving by the unit `step` may enter or leave this
    /// cell. Walls and doors are only passed straight through their wall
    /// line, and room corners not at all.
    pub fn passable(&self, step: Point) -> bool {
        match self.terrain {
            Terrain::Wall | Terrain::Door if self.corner => false,
            Terrain::Wall | Terrain::Door if self.side_wall => step.y == 0,
            Terrain::Wall | Terrain::Door => step.x == 0,
            _ => true,
        }
    }
}

/// A level under construction, and the finished result.
#[derive(Debug, Clone)]
pub struct Level {
    grid: Grid<Node>,
    rooms: Vec<Room>,
    failed: Vec<(usize, usize)>,
}

impl Level {
    /// Draw `rooms` onto an empty grid just large enough to hold them.
    ///
    /// Rooms are drawn in order, so a later room's walls replace an earlier
    /// room's where they share a wall line. Staircases already recorded on
    /// a room are drawn as well.
    pub fn from_rooms(rooms: Vec<Room>) -> Result<Self, GeometryError> {
        let mut width = 0;
        let mut height = 0;
        for room in &rooms {
            if room.x() < 0 || room.y() < 0 {
                return Err(GeometryError::OutOfBounds(room.origin()));
            }
            width = width.max(room.right());
            height = height.max(room.bottom());
        }

        let mut level = Self {
            grid: Grid::new(width, height),
            rooms,
            failed: Vec::new(),
        };
        for i in 0..level.rooms.len() {
            level.draw_room(i);
        }
        Ok(level)
    }

    fn draw_room(&mut self, i: usize) {
        let room = &self.rooms[i];
        let bounds = room.bounds();
        let stairs = room
            .staircase()
            .map(|s| (room.origin() + s.offset, s.up));
        for p in bounds.iter() {
            let top_or_bottom = p.y == bounds.min.y || p.y == bounds.max.y - 1;
            let left_or_right = p.x == bounds.min.x || p.x == bounds.max.x - 1;
            let corner = (top_or_bottom && left_or_right)
                || self.grid.get(p).is_some_and(|n| n.corner);
            let node = if top_or_bottom {
                Node {
                    terrain: Terrain::Wall,
                    corner,
                    ..Node::default()
                }
            } else if left_or_right {
                Node {
                    terrain: Terrain::Wall,
                    side_wall: true,
                    corner,
                    label: None,
                }
            } else {
                Node {
                    terrain: Terrain::Floor,
                    ..Node::default()
                }
            };
            self.grid.set(p, node);
        }
        if let Some((p, up)) = stairs {
            self.grid.set(p, Node {
                terrain: stairs_terrain(up),
                ..Node::default()
            });
        }
    }

    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    pub fn height(&self) -> i32 {
        self.grid.height()
    }

    pub fn bounds(&self) -> Range {
        self.grid.bounds()
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, number: usize) -> Option<&Room> {
        self.rooms.get(number)
    }

    pub fn node(&self, p: Point) -> Option<&Node> {
        self.grid.get(p)
    }

    pub fn terrain(&self, p: Point) -> Option<Terrain> {
        self.grid.get(p).map(|n| n.terrain)
    }

    pub fn is_movable(&self, p: Point) -> bool {
        self.terrain(p).is_some_and(Terrain::is_movable)
    }

    /// Cells outside the level count as obstructed.
    pub fn is_obstructed(&self, p: Point) -> bool {
        self.terrain(p).is_none_or(Terrain::is_obstructed)
    }

    fn checked_terrain(&self, p: Point) -> Result<Terrain, GeometryError> {
        self.terrain(p).ok_or(GeometryError::OutOfBounds(p))
    }

    fn put(&mut self, p: Point, terrain: Terrain) {
        if let Some(node) = self.grid.get_mut(p) {
            node.terrain = terrain;
        }
    }

    /// Turn the wall at `p` into a door. Putting a door where one already
    /// is succeeds and changes nothing.
    pub fn add_door(&mut self, p: Point) -> Result<(), GeometryError> {
        match self.checked_terrain(p)? {
            Terrain::Wall => {
                self.put(p, Terrain::Door);
                Ok(())
            }
            Terrain::Door => Ok(()),
            found => Err(GeometryError::DoorOnNonWall { at: p, found }),
        }
    }

    /// Place a staircase on the floor cell at `p` and record it on the room
    /// that contains it.
    pub fn add_staircase(&mut self, p: Point, up: bool) -> Result<(), GeometryError> {
        match self.checked_terrain(p)? {
            Terrain::Floor => {
                self.put(p, stairs_terrain(up));
                if let Some(room) = self.rooms.iter_mut().find(|r| r.interior().contains(p)) {
                    let offset = p - room.origin();
                    room.record_stairs(offset, up);
                }
                Ok(())
            }
            found => Err(GeometryError::StairsOnNonFloor { at: p, found }),
        }
    }

    /// Dig a tunnel cell at `p`. Digging an existing tunnel is a no-op.
    pub fn tunnel(&mut self, p: Point) -> Result<(), GeometryError> {
        match self.checked_terrain(p)? {
            Terrain::Empty => {
                self.put(p, Terrain::Tunnel);
                Ok(())
            }
            Terrain::Tunnel => Ok(()),
            found => Err(GeometryError::TunnelOnNonEmpty { at: p, found }),
        }
    }

    /// Position of the first cell holding `terrain`, row by row.
    pub fn find(&self, terrain: Terrain) -> Option<Point> {
        self.grid
            .iter()
            .find(|(_, n)| n.terrain == terrain)
            .map(|(p, _)| p)
    }

    pub fn count(&self, terrain: Terrain) -> usize {
        self.grid.count_fn(|_, n| n.terrain == terrain)
    }

    /// Show each room's letter in its top-left floor cell.
    pub fn label_rooms(&mut self) {
        for i in 0..self.rooms.len() {
            let p = self.rooms[i].origin() + Point::new(1, 1);
            let label = self.rooms[i].label();
            if let Some(node) = self.grid.get_mut(p) {
                if node.terrain == Terrain::Floor {
                    node.label = Some(label);
                }
            }
        }
    }

    pub(crate) fn record_failed(&mut self, a: usize, b: usize) {
        self.failed.push((a, b));
    }

    /// Connections that could not be dug.
    pub fn failed_connections(&self) -> &[(usize, usize)] {
        &self.failed
    }

    /// Rooms whose midpoint cannot be walked to from room 0's midpoint.
    pub fn unreachable_rooms(&self) -> Vec<usize> {
        let Some(first) = self.rooms.first() else {
            return Vec::new();
        };
        let mut search = PathSearch::new(self.bounds());
        search.cc_map(&TravelSpace::cardinal(self), first.midpoint());
        self.rooms
            .iter()
            .filter(|r| !search.cc_at(r.midpoint()))
            .map(Room::number)
            .collect()
    }

    /// Walking route from `from` to `to`, 8-way, `to` last.
    pub fn travel_path(&self, from: Point, to: Point) -> Result<Option<Vec<Point>>, SearchError> {
        PathSearch::new(self.bounds()).travel_path(&TravelSpace::new(self), from, to)
    }

    /// The map as one string per row.
    pub fn strings(&self) -> Vec<String> {
        self.grid
            .rows()
            .map(|row| row.iter().map(Node::ch).collect())
            .collect()
    }

    /// Write the map, one row per line.
    pub fn show(&self, w: &mut impl io::Write) -> io::Result<()> {
        for line in self.strings() {
            writeln!(w, "{line}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.strings().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{line}")?;
        }
        Ok(())
    }
}

fn stairs_terrain(up: bool) -> Terrain {
    if up { Terrain::UpStairs } else { Terrain::DownStairs }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level() -> Level {
        Level::from_rooms(vec![Room::new(0, 0, 0, 5, 4), Room::new(1, 7, 1, 4, 4)]).unwrap()
    }

    #[test]
    fn draws_rooms_with_side_walls() {
        let level = level();
        assert_eq!(level.width(), 11);
        assert_eq!(level.height(), 5);
        assert_eq!(
            level.strings(),
            vec![
                "-----      ",
                "|...|  ----",
                "|...|  |..|",
                "-----  |..|",
                "       ----",
            ]
        );
    }

    #[test]
    fn later_rooms_overwrite_shared_walls() {
        let level =
            Level::from_rooms(vec![Room::new(0, 0, 0, 5, 5), Room::new(1, 4, 1, 5, 4)]).unwrap();
        assert_eq!(level.strings()[1], "|...-----");
        assert_eq!(level.strings()[2], "|...|...|");
    }

    #[test]
    fn walls_are_only_passed_straight_through() {
        let mut level =
            Level::from_rooms(vec![Room::new(0, 0, 0, 5, 5), Room::new(1, 4, 1, 5, 4)]).unwrap();
        let node = |level: &Level, x, y| *level.node(Point::new(x, y)).unwrap();
        // Room 1's corner sits on room 0's side wall.
        assert!(node(&level, 4, 1).corner);
        assert!(node(&level, 0, 0).corner);
        assert!(!node(&level, 4, 2).corner);
        assert!(!node(&level, 4, 1).passable(Point::new(1, 0)));

        let side = node(&level, 0, 2);
        assert!(side.passable(Point::new(1, 0)));
        assert!(!side.passable(Point::new(0, 1)));
        let top = node(&level, 2, 0);
        assert!(top.passable(Point::new(0, -1)));
        assert!(!top.passable(Point::new(-1, 0)));
        assert!(node(&level, 2, 2).passable(Point::new(0, 1)));

        level.add_door(Point::new(0, 2)).unwrap();
        let door = node(&level, 0, 2);
        assert!(door.side_wall);
        assert_eq!(door.ch(), '+');
        assert!(door.passable(Point::new(-1, 0)));
        assert!(!door.passable(Point::new(0, -1)));
    }

    #[test]
    fn doors_only_on_walls() {
        let mut level = level();
        level.add_door(Point::new(4, 1)).unwrap();
        assert_eq!(level.terrain(Point::new(4, 1)), Some(Terrain::Door));
        assert_eq!(level.node(Point::new(4, 1)).map(Node::ch), Some('+'));
        // Again on the same door.
        level.add_door(Point::new(4, 1)).unwrap();
        assert_eq!(
            level.add_door(Point::new(1, 1)),
            Err(GeometryError::DoorOnNonWall {
                at: Point::new(1, 1),
                found: Terrain::Floor
            })
        );
        assert_eq!(
            level.add_door(Point::new(40, 1)),
            Err(GeometryError::OutOfBounds(Point::new(40, 1)))
        );
    }

    #[test]
    fn stairs_only_on_floor() {
        let mut level = level();
        level.add_staircase(Point::new(2, 2), true).unwrap();
        assert_eq!(level.find(Terrain::UpStairs), Some(Point::new(2, 2)));
        let stairs = level.room(0).and_then(Room::staircase).unwrap();
        assert_eq!(stairs.offset, Point::new(2, 2));
        assert!(matches!(
            level.add_staircase(Point::new(0, 0), false),
            Err(GeometryError::StairsOnNonFloor { .. })
        ));
        assert!(matches!(
            level.add_staircase(Point::new(2, 2), false),
            Err(GeometryError::StairsOnNonFloor { .. })
        ));
    }

    #[test]
    fn tunnels_only_through_rock() {
        let mut level = level();
        level.tunnel(Point::new(5, 2)).unwrap();
        level.tunnel(Point::new(5, 2)).unwrap();
        assert_eq!(level.count(Terrain::Tunnel), 1);
        assert!(matches!(
            level.tunnel(Point::new(4, 2)),
            Err(GeometryError::TunnelOnNonEmpty { .. })
        ));
    }

    #[test]
    fn reachability_and_travel() {
        let mut level = level();
        assert_eq!(level.unreachable_rooms(), vec![1]);
        level.add_door(Point::new(4, 2)).unwrap();
        level.tunnel(Point::new(5, 2)).unwrap();
        level.tunnel(Point::new(6, 2)).unwrap();
        level.add_door(Point::new(7, 2)).unwrap();
        assert!(level.unreachable_rooms().is_empty());

        let path = level
            .travel_path(Point::new(1, 1), Point::new(9, 3))
            .unwrap()
            .unwrap();
        assert_eq!(path.last(), Some(&Point::new(9, 3)));
        assert!(path.iter().all(|&p| level.is_movable(p)));
        assert!(path.contains(&Point::new(5, 2)));
    }

    #[test]
    fn labels_and_output() {
        let mut level = level();
        level.label_rooms();
        assert_eq!(level.strings()[1], "|A..|  ----");
        assert_eq!(level.strings()[2], "|...|  |B.|");
        let mut out = Vec::new();
        level.show(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 5);
        assert_eq!(text.trim_end_matches('\n'), level.to_string());
    }
}
