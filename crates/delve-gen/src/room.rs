//! Rectangular rooms.

use std::fmt;

use delve_core::{Point, Range};
use delve_paths::euclidean;

use crate::error::RoomError;

/// A staircase inside a room, relative to the room's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Staircase {
    pub offset: Point,
    pub up: bool,
}

/// An axis-aligned room: a floor area enclosed by a one-cell wall.
///
/// `x`, `y`, `width` and `height` include the walls, so the smallest useful
/// room is 3x3 and the layouts never go below 4x4.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Room {
    number: usize,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    stairs: Option<Staircase>,
}

impl Room {
    pub fn new(number: usize, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            number,
            x,
            y,
            width,
            height,
            stairs: None,
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub(crate) fn set_number(&mut self, number: usize) {
        self.number = number;
    }

    /// Letter used when labelling the room on a debug map.
    pub fn label(&self) -> char {
        u32::try_from(self.number)
            .ok()
            .and_then(|n| char::from_u32('A' as u32 + n))
            .unwrap_or('?')
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// One past the rightmost column.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// One past the bottom row.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Cells covered by the room, walls included.
    pub fn bounds(&self) -> Range {
        Range::sized(self.x, self.y, self.width, self.height)
    }

    /// Floor cells.
    pub fn interior(&self) -> Range {
        self.bounds().inner()
    }

    pub fn midpoint(&self) -> Point {
        self.bounds().center()
    }

    pub fn change_width(&mut self, amount: i32) {
        self.width += amount;
    }

    pub fn change_height(&mut self, amount: i32) {
        self.height += amount;
    }

    pub fn inc_x(&mut self) {
        self.x += 1;
    }

    pub fn dec_x(&mut self) {
        self.x -= 1;
    }

    pub fn inc_y(&mut self) {
        self.y += 1;
    }

    pub fn dec_y(&mut self) {
        self.y -= 1;
    }

    /// Distance between the facing wall columns of two rooms. Zero when
    /// they share a wall column, negative when they overlap horizontally.
    pub fn gap_x(&self, other: &Room) -> i32 {
        let (left, right) = if self.x <= other.x { (self, other) } else { (other, self) };
        right.x - (left.right() - 1)
    }

    /// Distance between the facing wall rows; see [`gap_x`](Self::gap_x).
    pub fn gap_y(&self, other: &Room) -> i32 {
        let (top, bottom) = if self.y <= other.y { (self, other) } else { (other, self) };
        bottom.y - (top.bottom() - 1)
    }

    /// Number of columns both rooms cover.
    pub fn overlap_x(&self, other: &Room) -> i32 {
        (self.right().min(other.right()) - self.x.max(other.x)).max(0)
    }

    /// Number of rows both rooms cover.
    pub fn overlap_y(&self, other: &Room) -> i32 {
        (self.bottom().min(other.bottom()) - self.y.max(other.y)).max(0)
    }

    /// Straight-line distance between the rooms' facing walls.
    pub fn distance(&self, other: &Room) -> f64 {
        let gap = Point::new(self.gap_x(other).max(0), self.gap_y(other).max(0));
        euclidean(Point::ZERO, gap)
    }

    pub fn staircase(&self) -> Option<Staircase> {
        self.stairs
    }

    /// Put a staircase at floor offset `(x, y)`.
    ///
    /// On rooms wider (taller) than 4 cells the offset is kept at least 3
    /// cells from the left (top) wall.
    pub fn add_stairs(&mut self, x: i32, y: i32, up: bool) -> Result<Staircase, RoomError> {
        if let Some(s) = self.stairs {
            return Err(RoomError::StairsExist {
                room: self.number,
                at: self.origin() + s.offset,
            });
        }
        if x < 1 || x >= self.width - 1 || y < 1 || y >= self.height - 1 {
            return Err(RoomError::BadStairsOffset {
                room: self.number,
                offset: Point::new(x, y),
            });
        }
        let clamp = |v: i32, dim: i32| if dim > 4 { v.clamp(3.min(dim - 2), dim - 2) } else { v };
        let stairs = Staircase {
            offset: Point::new(clamp(x, self.width), clamp(y, self.height)),
            up,
        };
        self.stairs = Some(stairs);
        Ok(stairs)
    }

    /// Record a staircase placed directly on the level.
    pub(crate) fn record_stairs(&mut self, offset: Point, up: bool) {
        if self.stairs.is_none() {
            self.stairs = Some(Staircase { offset, up });
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{},{}]{}x{}",
            self.label(),
            self.x,
            self.y,
            self.width,
            self.height
        )
    }
}
