//! Room connection graph.
//!
//! Every room gets a fixed number of connection slots. Rooms first link to
//! a few random neighbours, then isolated groups are bridged until every
//! room can be reached from room 0.

use std::cell::OnceCell;
use std::collections::VecDeque;
use std::fmt;

use delve_paths::manhattan;

use crate::error::ConnectivityError;
use crate::random::RandomSource;
use crate::room::Room;

/// Default number of consecutive failed bridge attempts before giving up.
pub const DEFAULT_FAILURE_BUDGET: usize = 10;

/// Which rooms count as neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Topology {
    /// Rooms laid out row by row on a `width x height` grid. Neighbours are
    /// the grid cells to the left, above, to the right and below.
    Grid { width: i32, height: i32 },
    /// The `count` rooms whose midpoints are closest, by Manhattan distance.
    Nearest { count: usize },
}

/// Order in which connections are handed to the tunnel carver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeOrder {
    /// Rooms from last to first, each room's links in the order they were
    /// made.
    #[default]
    Descending,
    /// Shortest wall-to-wall distance first, ties in creation order.
    Nearest,
}

/// A link between two rooms. `a`/`b` and `b`/`a` are the same link.
#[derive(Debug, Clone)]
pub struct RoomConnection {
    a: usize,
    b: usize,
    distance: OnceCell<f64>,
    drawn: bool,
}

impl RoomConnection {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            a,
            b,
            distance: OnceCell::new(),
            drawn: false,
        }
    }

    pub fn a(&self) -> usize {
        self.a
    }

    pub fn b(&self) -> usize {
        self.b
    }

    pub fn contains(&self, room: usize) -> bool {
        self.a == room || self.b == room
    }

    /// The room at the far end of the link from `room`.
    pub fn other_end(&self, room: usize) -> Option<usize> {
        if room == self.a {
            Some(self.b)
        } else if room == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    /// Whether this links `a` and `b`, in either order.
    pub fn matches(&self, a: usize, b: usize) -> bool {
        (self.a == a && self.b == b) || (self.a == b && self.b == a)
    }

    /// Wall-to-wall distance between the two rooms, computed once.
    pub fn distance(&self, rooms: &[Room]) -> f64 {
        *self.distance.get_or_init(|| match (rooms.get(self.a), rooms.get(self.b)) {
            (Some(a), Some(b)) => a.distance(b),
            _ => f64::INFINITY,
        })
    }

    pub fn is_drawn(&self) -> bool {
        self.drawn
    }

    pub fn set_drawn(&mut self) {
        self.drawn = true;
    }
}

impl PartialEq for RoomConnection {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other.a, other.b)
    }
}

impl fmt::Display for RoomConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}<->#{}", self.a, self.b)?;
        if let Some(d) = self.distance.get() {
            write!(f, "(dist {d:.1})")?;
        }
        if self.drawn {
            write!(f, " drawn")?;
        }
        Ok(())
    }
}

/// Connections between a set of rooms.
#[derive(Debug)]
pub struct ConnectionGraph<'a> {
    rooms: &'a [Room],
    capacity: Vec<usize>,
    /// Preferred link targets per room.
    neighbors: Vec<Vec<usize>>,
    /// Rooms tried, in order, when bridging an isolated room.
    bridges: Vec<Vec<usize>>,
    connections: Vec<RoomConnection>,
    /// Connection indices per room, in the order they were made.
    slots: Vec<Vec<usize>>,
}

impl<'a> ConnectionGraph<'a> {
    /// Prepare an empty graph over `rooms`, which must be numbered by their
    /// position in the slice.
    pub fn new(rooms: &'a [Room], topology: Topology) -> Result<Self, ConnectivityError> {
        let n = rooms.len();
        if n < 2 {
            return Err(ConnectivityError::TooFewRooms(n));
        }
        for (index, room) in rooms.iter().enumerate() {
            if room.number() != index {
                return Err(ConnectivityError::BadRoomNumber {
                    index,
                    number: room.number(),
                    max: n - 1,
                });
            }
        }

        let (capacity, neighbors, bridges) = match topology {
            Topology::Grid { width, height } => {
                if width < 1 || height < 1 || (width * height) as usize != n {
                    return Err(ConnectivityError::GridMismatch {
                        rooms: n,
                        width,
                        height,
                    });
                }
                let neighbors: Vec<Vec<usize>> =
                    (0..n).map(|k| grid_neighbors(k, width, height)).collect();
                let capacity = (0..n)
                    .map(|k| {
                        let i = k as i32 % width;
                        let j = k as i32 / width;
                        2 + usize::from(i > 0 && i < width - 1)
                            + usize::from(j > 0 && j < height - 1)
                    })
                    .collect();
                (capacity, neighbors.clone(), neighbors)
            }
            Topology::Nearest { count } => {
                let ranked: Vec<Vec<usize>> = (0..n)
                    .map(|k| {
                        let mid = rooms[k].midpoint();
                        let mut others: Vec<usize> = (0..n).filter(|&o| o != k).collect();
                        others.sort_by_key(|&o| (manhattan(mid, rooms[o].midpoint()), o));
                        others
                    })
                    .collect();
                let count = count.clamp(1, n - 1);
                let neighbors = ranked.iter().map(|r| r[..count].to_vec()).collect();
                (vec![count; n], neighbors, ranked)
            }
        };

        Ok(Self {
            rooms,
            capacity,
            neighbors,
            bridges,
            connections: Vec::new(),
            slots: vec![Vec::new(); n],
        })
    }

    pub fn rooms(&self) -> &'a [Room] {
        self.rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Maximum number of links for `room`.
    pub fn capacity(&self, room: usize) -> usize {
        self.capacity.get(room).copied().unwrap_or(0)
    }

    pub fn neighbors(&self, room: usize) -> &[usize] {
        self.neighbors.get(room).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_full(&self, room: usize) -> bool {
        self.slots
            .get(room)
            .is_none_or(|s| s.len() >= self.capacity(room))
    }

    pub fn is_linked(&self, a: usize, b: usize) -> bool {
        self.slots
            .get(a)
            .is_some_and(|s| s.iter().any(|&c| self.connections[c].matches(a, b)))
    }

    /// Rooms linked to `room`, in the order the links were made.
    pub fn linked(&self, room: usize) -> Vec<usize> {
        self.slots.get(room).map_or_else(Vec::new, |s| {
            s.iter()
                .filter_map(|&c| self.connections[c].other_end(room))
                .collect()
        })
    }

    pub fn connections(&self) -> &[RoomConnection] {
        &self.connections
    }

    /// Link two rooms. Nothing happens if either room is full, they are
    /// already linked, or `a == b`.
    pub fn add(&mut self, a: usize, b: usize) -> bool {
        if a == b || a >= self.len() || b >= self.len() {
            return false;
        }
        if self.is_full(a) || self.is_full(b) || self.is_linked(a, b) {
            return false;
        }
        let id = self.connections.len();
        self.connections.push(RoomConnection::new(a, b));
        self.slots[a].push(id);
        self.slots[b].push(id);
        true
    }

    /// Rooms reachable from room 0 over the current links.
    pub fn reachable(&self) -> Vec<bool> {
        let mut seen = vec![false; self.len()];
        let mut queue = VecDeque::from([0]);
        seen[0] = true;
        while let Some(room) = queue.pop_front() {
            for other in self.linked(room) {
                if !seen[other] {
                    seen[other] = true;
                    queue.push_back(other);
                }
            }
        }
        seen
    }

    pub fn is_connected(&self) -> bool {
        self.reachable().into_iter().all(|s| s)
    }

    /// Link every room to a random number of its neighbours, then bridge
    /// isolated groups until all rooms are reachable.
    ///
    /// Gives up after `failure_budget` bridge attempts in a row that find
    /// no room to link to.
    pub fn connect(
        &mut self,
        random: &mut impl RandomSource,
        failure_budget: usize,
    ) -> Result<(), ConnectivityError> {
        for room in 0..self.len() {
            let count = 1 + random.next_int_bounded(self.capacity(room) as i32 - 1);
            for _ in 0..count {
                let neighbors = self.neighbors(room);
                if neighbors.is_empty() {
                    break;
                }
                let other = neighbors[random.next_index(neighbors.len())];
                self.add(room, other);
            }
        }
        log::debug!(
            "connect: {} initial links between {} rooms",
            self.connections.len(),
            self.len()
        );

        let mut seen = self.reachable();
        let mut failures = 0;
        while seen.iter().any(|&s| !s) {
            if failures >= failure_budget {
                return Err(ConnectivityError::CannotBridge);
            }
            let unconnected: Vec<usize> = (0..self.len())
                .filter(|&r| !seen[r] && !self.is_full(r))
                .collect();
            if unconnected.is_empty() {
                return Err(ConnectivityError::NoUnconnectedRoom);
            }
            let room = unconnected[random.next_index(unconnected.len())];
            let bridge = self.bridges[room]
                .iter()
                .copied()
                .find(|&o| seen[o] && !self.is_full(o));
            match bridge {
                Some(other) => {
                    self.add(room, other);
                    log::trace!("connect: bridged room {room} to {other}");
                    seen = self.reachable();
                    failures = 0;
                }
                None => failures += 1,
            }
        }
        Ok(())
    }

    /// Every distinct connection once, in `order`. With
    /// [`EdgeOrder::Descending`] each edge starts at the room being visited.
    pub fn edges(&self, order: EdgeOrder) -> Vec<RoomConnection> {
        match order {
            EdgeOrder::Descending => {
                let mut edges: Vec<RoomConnection> = Vec::with_capacity(self.connections.len());
                for room in (0..self.len()).rev() {
                    for other in self.linked(room) {
                        if !edges.iter().any(|e| e.matches(room, other)) {
                            edges.push(RoomConnection::new(room, other));
                        }
                    }
                }
                edges
            }
            EdgeOrder::Nearest => {
                let mut edges = self.connections.clone();
                // Stable sort keeps creation order among equal distances.
                edges.sort_by(|x, y| x.distance(self.rooms).total_cmp(&y.distance(self.rooms)));
                edges
            }
        }
    }
}

/// Grid neighbours of zone `k`: left, up, right, down.
fn grid_neighbors(k: usize, width: i32, height: i32) -> Vec<usize> {
    let k = k as i32;
    let i = k % width;
    let j = k / width;
    let mut out = Vec::with_capacity(4);
    if i > 0 {
        out.push(k - 1);
    }
    if j > 0 {
        out.push(k - width);
    }
    if i < width - 1 {
        out.push(k + 1);
    }
    if j < height - 1 {
        out.push(k + width);
    }
    out.into_iter().map(|v| v as usize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::zones;
    use crate::random::{RngSource, ScriptedRandom};

    fn strip(n: usize) -> Vec<Room> {
        (0..n).map(|i| Room::new(i, i as i32 * 6, 0, 5, 5)).collect()
    }

    #[test]
    fn grid_neighbour_order() {
        assert_eq!(grid_neighbors(0, 3, 3), vec![1, 3]);
        assert_eq!(grid_neighbors(4, 3, 3), vec![3, 1, 5, 7]);
        assert_eq!(grid_neighbors(8, 3, 3), vec![7, 5]);
    }

    #[test]
    fn grid_capacity_counts_interior_axes() {
        let rooms = strip(9);
        let graph = ConnectionGraph::new(&rooms, Topology::Grid { width: 3, height: 3 }).unwrap();
        let caps: Vec<usize> = (0..9).map(|r| graph.capacity(r)).collect();
        assert_eq!(caps, vec![2, 3, 2, 3, 4, 3, 2, 3, 2]);
    }

    #[test]
    fn rejects_bad_room_lists() {
        let one = strip(1);
        assert_eq!(
            ConnectionGraph::new(&one, Topology::Nearest { count: 2 }).unwrap_err(),
            ConnectivityError::TooFewRooms(1)
        );
        let mut rooms = strip(3);
        rooms[1].set_number(5);
        assert_eq!(
            ConnectionGraph::new(&rooms, Topology::Nearest { count: 2 }).unwrap_err(),
            ConnectivityError::BadRoomNumber {
                index: 1,
                number: 5,
                max: 2
            }
        );
        let rooms = strip(5);
        assert!(matches!(
            ConnectionGraph::new(&rooms, Topology::Grid { width: 2, height: 2 }),
            Err(ConnectivityError::GridMismatch { .. })
        ));
    }

    #[test]
    fn add_refuses_duplicates_self_links_and_full_rooms() {
        let rooms = strip(4);
        let mut graph = ConnectionGraph::new(&rooms, Topology::Grid { width: 4, height: 1 }).unwrap();
        assert!(graph.add(0, 1));
        assert!(!graph.add(1, 0));
        assert!(!graph.add(2, 2));
        assert!(graph.add(0, 2));
        // Room 0 has two slots.
        assert!(graph.is_full(0));
        assert!(!graph.add(0, 3));
        assert_eq!(graph.linked(0), vec![1, 2]);
        assert_eq!(graph.linked(2), vec![0]);
        assert!(graph.is_linked(1, 0));
    }

    #[test]
    fn scripted_zone_graph() {
        let mut random = ScriptedRandom::new(0..100);
        let rooms = zones::build_rooms(&mut random, 20, 20, 3, 3).unwrap();
        let mut graph = ConnectionGraph::new(&rooms, Topology::Grid { width: 3, height: 3 }).unwrap();
        graph.connect(&mut random, DEFAULT_FAILURE_BUDGET).unwrap();
        let slots: Vec<Vec<usize>> = (0..9).map(|r| graph.linked(r)).collect();
        assert_eq!(
            slots,
            vec![
                vec![3, 1],
                vec![0, 4],
                vec![5],
                vec![0, 4],
                vec![3, 1, 5, 7],
                vec![2, 4, 8],
                vec![7],
                vec![4, 6, 8],
                vec![7, 5],
            ]
        );
        assert!(graph.is_connected());
    }

    #[test]
    fn descending_edges_skip_duplicates() {
        let rooms = strip(3);
        let mut graph = ConnectionGraph::new(&rooms, Topology::Grid { width: 3, height: 1 }).unwrap();
        graph.add(0, 1);
        graph.add(2, 1);
        let edges = graph.edges(EdgeOrder::Descending);
        assert_eq!(edges.len(), 2);
        assert_eq!((edges[0].a(), edges[0].b()), (2, 1));
        assert_eq!((edges[1].a(), edges[1].b()), (1, 0));
    }

    #[test]
    fn nearest_edges_sort_by_distance() {
        let rooms = vec![
            Room::new(0, 0, 0, 5, 5),
            Room::new(1, 20, 0, 5, 5),
            Room::new(2, 6, 0, 5, 5),
        ];
        let mut graph = ConnectionGraph::new(&rooms, Topology::Nearest { count: 2 }).unwrap();
        assert_eq!(graph.neighbors(0), &[2, 1]);
        graph.add(0, 1);
        graph.add(0, 2);
        let edges = graph.edges(EdgeOrder::Nearest);
        assert!(edges[0].matches(0, 2));
        assert_eq!(edges[0].distance(&rooms), 2.0);
        assert!(edges[1].matches(1, 0));
    }

    #[test]
    fn seeded_graphs_are_connected() {
        for seed in 0..25 {
            let mut random = RngSource::seeded(seed);
            let rooms = zones::build_rooms(&mut random, 60, 48, 4, 4).unwrap();
            let mut graph = ConnectionGraph::new(&rooms, Topology::Grid { width: 4, height: 4 }).unwrap();
            if graph.connect(&mut random, DEFAULT_FAILURE_BUDGET).is_ok() {
                assert!(graph.is_connected());
                for r in 0..rooms.len() {
                    assert!(graph.linked(r).len() <= graph.capacity(r));
                }
            }
        }
    }

    #[test]
    fn connection_display() {
        let rooms = strip(2);
        let mut c = RoomConnection::new(0, 1);
        assert_eq!(c.to_string(), "#0<->#1");
        c.distance(&rooms);
        c.set_drawn();
        assert_eq!(c.to_string(), "#0<->#1(dist 2.0) drawn");
        assert_eq!(c, RoomConnection::new(1, 0));
        assert_eq!(c.other_end(1), Some(0));
        assert_eq!(c.other_end(7), None);
    }
}
