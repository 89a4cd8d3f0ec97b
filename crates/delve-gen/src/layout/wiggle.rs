//! Uniform grid of rooms nudged around by random mutations.

use crate::error::GenError;
use crate::layout::{MIN_ROOM_SIZE, fix_neighbors};
use crate::random::RandomSource;
use crate::room::Room;

/// Default number of mutations.
pub const DEFAULT_ITERATIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Top,
    Right,
    Bottom,
}

impl Side {
    fn from_index(i: i32) -> Side {
        match i {
            0 => Side::Left,
            1 => Side::Top,
            2 => Side::Right,
            _ => Side::Bottom,
        }
    }

    fn across(random: &mut impl RandomSource) -> Side {
        if random.next_bool() { Side::Left } else { Side::Right }
    }

    fn down(random: &mut impl RandomSource) -> Side {
        if random.next_bool() { Side::Top } else { Side::Bottom }
    }
}

/// Whether any room's edge lines up with the `side` edge of `room`.
///
/// Only the edge coordinate is compared, so rooms in other rows or
/// columns block the move as well.
fn has_neighbor(room: &Room, rooms: &[Room], side: Side) -> bool {
    rooms.iter().any(|other| match side {
        Side::Left => room.x() == other.right(),
        Side::Top => room.y() == other.bottom(),
        Side::Right => other.x() == room.right(),
        Side::Bottom => other.y() == room.bottom(),
    })
}

fn shrink(room: &mut Room, random: &mut impl RandomSource) {
    let side = if room.width() > room.height() {
        Side::across(random)
    } else {
        Side::down(random)
    };
    match side {
        Side::Left if room.width() > MIN_ROOM_SIZE => {
            room.inc_x();
            room.change_width(-1);
        }
        Side::Right if room.width() > MIN_ROOM_SIZE => room.change_width(-1),
        Side::Top if room.height() > MIN_ROOM_SIZE => {
            room.inc_y();
            room.change_height(-1);
        }
        Side::Bottom if room.height() > MIN_ROOM_SIZE => room.change_height(-1),
        _ => {}
    }
}

fn grow(rooms: &mut [Room], i: usize, width: i32, height: i32, random: &mut impl RandomSource) {
    let side = if rooms[i].width() < rooms[i].height() {
        Side::across(random)
    } else {
        Side::down(random)
    };
    if has_neighbor(&rooms[i], rooms, side) {
        return;
    }
    let room = &mut rooms[i];
    match side {
        Side::Left if room.x() > 0 => {
            room.dec_x();
            room.change_width(1);
        }
        Side::Top if room.y() > 0 => {
            room.dec_y();
            room.change_height(1);
        }
        Side::Right if room.right() < width => room.change_width(1),
        Side::Bottom if room.bottom() < height => room.change_height(1),
        _ => {}
    }
}

fn shift(rooms: &mut [Room], i: usize, width: i32, height: i32, random: &mut impl RandomSource) {
    let side = Side::from_index(random.next_int_bounded(4));
    if has_neighbor(&rooms[i], rooms, side) {
        return;
    }
    let room = &mut rooms[i];
    match side {
        Side::Left if room.x() > 0 => room.dec_x(),
        Side::Top if room.y() > 0 => room.dec_y(),
        Side::Right if room.right() < width => room.inc_x(),
        Side::Bottom if room.bottom() < height => room.inc_y(),
        _ => {}
    }
}

/// Tile `width x height` with a `grid_width x grid_height` grid of equal
/// rooms, then apply `iterations` random shrink, grow or move steps.
///
/// Growing and moving are refused whenever another room's edge sits on the
/// edge being pushed, which keeps floors from overlapping.
pub fn build_rooms(
    random: &mut impl RandomSource,
    width: i32,
    height: i32,
    grid_width: i32,
    grid_height: i32,
    iterations: usize,
) -> Result<Vec<Room>, GenError> {
    if grid_width < 1 || grid_height < 1 || grid_width * grid_height < 2 {
        return Err(GenError::Layout(format!(
            "bad zone grid {grid_width}x{grid_height}"
        )));
    }
    let zone_w = width / grid_width - 2;
    let zone_h = height / grid_height - 2;
    if zone_w < MIN_ROOM_SIZE || zone_h < MIN_ROOM_SIZE {
        return Err(GenError::Layout(format!(
            "{zone_w}x{zone_h} zones are smaller than {MIN_ROOM_SIZE}x{MIN_ROOM_SIZE}"
        )));
    }

    let mut rooms = Vec::with_capacity((grid_width * grid_height) as usize);
    for gy in 0..grid_height {
        for gx in 0..grid_width {
            rooms.push(Room::new(
                rooms.len(),
                gx * zone_w,
                gy * zone_h,
                zone_w,
                zone_h,
            ));
        }
    }

    for _ in 0..iterations {
        let i = random.next_index(rooms.len());
        match random.next_int_bounded(3) {
            0 => shrink(&mut rooms[i], random),
            1 => grow(&mut rooms, i, width, height, random),
            _ => shift(&mut rooms, i, width, height, random),
        }
    }

    fix_neighbors(&mut rooms);
    Ok(rooms)
}
