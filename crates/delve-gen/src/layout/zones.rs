//! One room per zone of a regular grid.

use crate::error::GenError;
use crate::layout::{MIN_ROOM_SIZE, fix_neighbors};
use crate::random::RandomSource;
use crate::room::Room;

/// Split `width x height` into `grid_width x grid_height` zones and place
/// one randomly sized room in each, numbered row by row.
///
/// Each side is at least half its zone (and at least [`MIN_ROOM_SIZE`]),
/// and the room is shifted to a random position inside the zone. Draws
/// happen in the order width, height, x offset, y offset; offsets are only
/// drawn when the room is smaller than its zone.
pub fn build_rooms(
    random: &mut impl RandomSource,
    width: i32,
    height: i32,
    grid_width: i32,
    grid_height: i32,
) -> Result<Vec<Room>, GenError> {
    if grid_width < 1 || grid_height < 1 {
        return Err(GenError::Layout(format!(
            "bad zone grid {grid_width}x{grid_height}"
        )));
    }
    let cell_w = width / grid_width;
    let cell_h = height / grid_height;
    if cell_w < MIN_ROOM_SIZE || cell_h < MIN_ROOM_SIZE {
        return Err(GenError::Layout(format!(
            "{cell_w}x{cell_h} zones cannot hold a {MIN_ROOM_SIZE}x{MIN_ROOM_SIZE} room"
        )));
    }

    let mut rooms = Vec::with_capacity((grid_width * grid_height) as usize);
    for r in 0..grid_width * grid_height {
        let i = r % grid_width;
        let j = r / grid_width;

        let w = (cell_w / 2 + random.next_int_bounded((cell_w + 1) / 2)).max(MIN_ROOM_SIZE);
        let h = (cell_h / 2 + random.next_int_bounded((cell_h + 1) / 2)).max(MIN_ROOM_SIZE);
        let x = cell_w * i + if w < cell_w { random.next_int_bounded(cell_w - w) } else { 0 };
        let y = cell_h * j + if h < cell_h { random.next_int_bounded(cell_h - h) } else { 0 };

        rooms.push(Room::new(r as usize, x, y, w, h));
    }

    fix_neighbors(&mut rooms);
    Ok(rooms)
}
