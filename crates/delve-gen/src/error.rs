use delve_core::Point;
use delve_paths::SearchError;
use thiserror::Error;

use crate::terrain::Terrain;

/// A write targeted terrain of the wrong kind.
///
/// Raised while carving, these point at a logic error rather than a bad
/// layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("cannot add door at {at}: found {found:?}, not a wall")]
    DoorOnNonWall { at: Point, found: Terrain },
    #[error("cannot add staircase at {at}: found {found:?}, not floor")]
    StairsOnNonFloor { at: Point, found: Terrain },
    #[error("cannot tunnel at {at}: found {found:?}, not empty")]
    TunnelOnNonEmpty { at: Point, found: Terrain },
    #[error("{0} is outside the level")]
    OutOfBounds(Point),
}

/// The room graph could not be made fully connected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectivityError {
    #[error("expect at least 2 rooms, not {0}")]
    TooFewRooms(usize),
    #[error("bad room number {number} at index {index} (must be between 0 and {max})")]
    BadRoomNumber {
        index: usize,
        number: usize,
        max: usize,
    },
    #[error("{rooms} rooms do not fill a {width}x{height} grid")]
    GridMismatch { rooms: usize, width: i32, height: i32 },
    #[error("cannot find unconnected room")]
    NoUnconnectedRoom,
    #[error("cannot connect two loops of connections")]
    CannotBridge,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room {room}: staircase is already located at {at}")]
    StairsExist { room: usize, at: Point },
    #[error("room {room}: bad staircase offset {offset}")]
    BadStairsOffset { room: usize, offset: Point },
}

/// Everything that can stop a generation run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenError {
    #[error("layout: {0}")]
    Layout(String),
    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Room(#[from] RoomError),
    #[error("rooms {rooms:?} are unreachable ({} connections abandoned)", .failed.len())]
    Unreachable {
        rooms: Vec<usize>,
        failed: Vec<(usize, usize)>,
    },
}

impl GenError {
    /// Whether a run with a different seed may succeed. A room list that
    /// does not fit its graph fails the same way on every seed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenError::Layout(_)
                | GenError::Connectivity(
                    ConnectivityError::NoUnconnectedRoom | ConnectivityError::CannotBridge
                )
                | GenError::Unreachable { .. }
        )
    }
}
