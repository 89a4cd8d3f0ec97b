//! Staircase placement.

use delve_core::Point;

use crate::error::{ConnectivityError, GenError};
use crate::level::Level;
use crate::random::RandomSource;
use crate::room::Room;

/// Offset of a staircase along a room side `len` cells long, walls
/// included.
fn zone_offset(random: &mut impl RandomSource, len: i32) -> i32 {
    match len {
        len if len < 5 => 1 + random.next_int_bounded(2),
        5 => 3,
        _ => 2 + random.next_int_bounded(len - 4),
    }
}

/// Rooms in opposite parts of a `grid_width x grid_height` zone grid: a
/// top-row room and its mirror on the bottom row, or a left-column room and
/// its mirror in the right column.
fn opposite_zones(
    random: &mut impl RandomSource,
    grid_width: i32,
    grid_height: i32,
) -> (usize, usize) {
    let (one, other) = if random.next_bool() {
        let x = random.next_int_bounded(grid_width);
        (x, (grid_height - 1) * grid_width + (grid_width - x) - 1)
    } else {
        let y = random.next_int_bounded(grid_height);
        (y * grid_width, (grid_height - (y + 1)) * grid_width + (grid_width - 1))
    };
    (one as usize, other as usize)
}

/// Put the staircases of a zone level in opposite zones.
///
/// Rooms must be numbered row by row over the zone grid.
pub fn place_zone_stairs(
    level: &mut Level,
    random: &mut impl RandomSource,
    grid_width: i32,
    grid_height: i32,
    up: bool,
    down: bool,
) -> Result<(), GenError> {
    let (one, other) = opposite_zones(random, grid_width, grid_height);
    let (up_room, down_room) = if random.next_bool() { (one, other) } else { (other, one) };

    for (room, is_up) in [(up_room, true), (down_room, false)] {
        if (is_up && !up) || (!is_up && !down) {
            continue;
        }
        let Some((origin, width, height)) =
            level.room(room).map(|r| (r.origin(), r.width(), r.height()))
        else {
            return Err(ConnectivityError::BadRoomNumber {
                index: room,
                number: room,
                max: level.rooms().len().saturating_sub(1),
            }
            .into());
        };
        let at = origin + Point::new(zone_offset(random, width), zone_offset(random, height));
        level.add_staircase(at, is_up)?;
        log::debug!("stairs: {} in room {room} at {at}", if is_up { "up" } else { "down" });
    }
    Ok(())
}

/// Put the staircases in two different random rooms, before the rooms are
/// drawn.
pub fn place_room_stairs(
    rooms: &mut [Room],
    random: &mut impl RandomSource,
    up: bool,
    down: bool,
) -> Result<(), GenError> {
    if rooms.len() < 2 {
        return Err(ConnectivityError::TooFewRooms(rooms.len()).into());
    }

    let mut up_room = None;
    if up {
        let i = random.next_index(rooms.len());
        let room = &mut rooms[i];
        let x = random.next_int_bounded(room.width() - 2) + 1;
        let y = random.next_int_bounded(room.height() - 2) + 1;
        room.add_stairs(x, y, true)?;
        up_room = Some(i);
    }
    if down {
        let i = loop {
            let i = random.next_index(rooms.len());
            if Some(i) != up_room {
                break i;
            }
        };
        let room = &mut rooms[i];
        let x = random.next_int_bounded(room.width() - 2) + 1;
        let y = random.next_int_bounded(room.height() - 2) + 1;
        room.add_stairs(x, y, false)?;
    }
    Ok(())
}
