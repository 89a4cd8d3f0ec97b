//! Recursive binary space partition with random splits, joins and kills.
//!
//! The whole area is split into pieces that share their wall lines, then a
//! work queue of pieces is shuffled through twenty random operations. Any
//! piece still three times the minimum size on a side is split again, and
//! surplus pieces are dropped at random.

use std::collections::VecDeque;

use crate::error::GenError;
use crate::layout::{MIN_ROOM_SIZE, fix_neighbors};
use crate::random::RandomSource;
use crate::room::Room;

const ROUNDS: usize = 20;

/// Split `room` into two or three pieces along its longer side and queue
/// them. With `kill_one` a small room loses one of its pieces.
fn split_room(
    room: &Room,
    out: &mut VecDeque<Room>,
    random: &mut impl RandomSource,
    max_width: i32,
    max_height: i32,
    kill_one: bool,
) {
    let mut num = random.next_int_bounded(2) + 2;
    let along_y = room.width() < room.height();
    let (start, len) = if along_y {
        (room.y(), room.height())
    } else {
        (room.x(), room.width())
    };

    let mut piece = len / num;
    while piece < MIN_ROOM_SIZE {
        num -= 1;
        if num < 2 {
            out.push_back(room.clone());
            return;
        }
        piece = len / num;
    }

    let kill = if !kill_one || room.height() > max_height / 3 || room.width() > max_width / 3 {
        None
    } else if num % 2 == 1 {
        Some(num / 2)
    } else {
        Some(random.next_int_bounded(num))
    };

    let mut at = start;
    for i in 0..num {
        let size = if i == num - 1 { start + len - at } else { piece };
        if kill != Some(i) {
            out.push_back(if along_y {
                Room::new(0, room.x(), at, room.width(), size)
            } else {
                Room::new(0, at, room.y(), size, room.height())
            });
        }
        // Neighbouring pieces share a wall line.
        at += piece - 1;
    }
}

/// The room covering both `room` and `other`, if they share a full wall.
fn joined(room: &Room, other: &Room) -> Option<Room> {
    if other.x() == room.x() && other.width() == room.width() {
        if other.y() == room.bottom() - 1 {
            return Some(Room::new(
                0,
                room.x(),
                room.y(),
                room.width(),
                room.height() + other.height() - 1,
            ));
        }
        if other.bottom() - 1 == room.y() {
            return Some(Room::new(
                0,
                other.x(),
                other.y(),
                other.width(),
                other.height() + room.height() - 1,
            ));
        }
    } else if other.y() == room.y() && other.height() == room.height() {
        if other.x() == room.right() - 1 {
            return Some(Room::new(
                0,
                room.x(),
                room.y(),
                room.width() + other.width() - 1,
                room.height(),
            ));
        }
        if other.right() - 1 == room.x() {
            return Some(Room::new(
                0,
                other.x(),
                other.y(),
                other.width() + room.width() - 1,
                other.height(),
            ));
        }
    }
    None
}

fn join_room(room: Room, queue: &mut VecDeque<Room>) {
    let found = queue
        .iter()
        .enumerate()
        .find_map(|(i, other)| joined(&room, other).map(|merged| (i, merged)));
    match found {
        Some((i, merged)) => {
            queue.remove(i);
            queue.push_back(merged);
        }
        None => queue.push_back(room),
    }
}

fn is_oversized(room: &Room) -> bool {
    room.width() >= MIN_ROOM_SIZE * 3 || room.height() >= MIN_ROOM_SIZE * 3
}

/// Partition `width x height` into at most `max_rooms` rooms.
///
/// Pieces that cannot keep [`MIN_ROOM_SIZE`] are dropped, so fewer rooms
/// than requested is normal; fewer than two is a layout error.
pub fn build_rooms(
    random: &mut impl RandomSource,
    width: i32,
    height: i32,
    max_rooms: usize,
) -> Result<Vec<Room>, GenError> {
    if width < MIN_ROOM_SIZE * 2 || height < MIN_ROOM_SIZE {
        return Err(GenError::Layout(format!(
            "{width}x{height} is too small to partition"
        )));
    }

    let mut queue = VecDeque::new();
    split_room(
        &Room::new(0, 0, 0, width, height),
        &mut queue,
        random,
        width,
        height,
        false,
    );

    for _ in 0..ROUNDS {
        let Some(room) = queue.pop_front() else {
            break;
        };
        let op = random.next_int_bounded(100);
        if op < 60 || queue.len() == 1 {
            if room.width() >= MIN_ROOM_SIZE * 2 || room.height() >= MIN_ROOM_SIZE * 2 {
                split_room(&room, &mut queue, random, width, height, false);
            } else if op > 10 {
                split_room(&room, &mut queue, random, width, height, true);
            } else {
                log::trace!("partition: dropped {room} instead of splitting");
            }
        } else if op < 80 {
            join_room(room, &mut queue);
        } else if op < 95 || room.width() > width / 3 || room.height() > height / 3 {
            queue.push_back(room);
        } else {
            log::trace!("partition: dropped {room}");
        }
    }

    while let Some(i) = queue.iter().position(is_oversized) {
        let Some(room) = queue.remove(i) else {
            break;
        };
        let mut pieces = VecDeque::new();
        split_room(&room, &mut pieces, random, width, height, true);
        queue.extend(pieces);
    }

    while queue.len() > max_rooms {
        let i = random.next_index(queue.len());
        queue.remove(i);
    }

    let mut rooms: Vec<Room> = queue.into_iter().collect();
    for (i, room) in rooms.iter_mut().enumerate() {
        room.set_number(i);
    }
    fix_neighbors(&mut rooms);

    if rooms.len() < 2 {
        return Err(GenError::Layout(format!(
            "partition left {} room(s)",
            rooms.len()
        )));
    }
    Ok(rooms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{RngSource, ScriptedRandom};

    #[test]
    fn split_pieces_share_walls() {
        // num = 2 + 1 = 3 pieces of a 22-wide room.
        let mut random = ScriptedRandom::new([1]);
        let mut out = VecDeque::new();
        split_room(&Room::new(0, 0, 0, 22, 10), &mut out, &mut random, 80, 40, false);
        let xs: Vec<(i32, i32)> = out.iter().map(|r| (r.x(), r.width())).collect();
        assert_eq!(xs, vec![(0, 7), (6, 7), (12, 10)]);
        assert!(out.iter().all(|r| r.height() == 10));
    }

    #[test]
    fn small_split_kills_middle_piece() {
        let mut random = ScriptedRandom::new([1]);
        let mut out = VecDeque::new();
        split_room(&Room::new(0, 0, 0, 6, 13), &mut out, &mut random, 80, 40, true);
        // 13 rows into 3 pieces of 4, middle one dropped.
        let ys: Vec<(i32, i32)> = out.iter().map(|r| (r.y(), r.height())).collect();
        assert_eq!(ys, vec![(0, 4), (6, 7)]);
    }

    #[test]
    fn too_small_to_split_is_kept() {
        let mut random = ScriptedRandom::new([0]);
        let mut out = VecDeque::new();
        let room = Room::new(0, 3, 3, 7, 5);
        split_room(&room, &mut out, &mut random, 80, 40, false);
        assert_eq!(out.into_iter().collect::<Vec<_>>(), vec![room]);
    }

    #[test]
    fn joins_rooms_on_a_shared_wall() {
        let a = Room::new(0, 0, 0, 6, 5);
        let b = Room::new(0, 5, 0, 4, 5);
        assert_eq!(joined(&a, &b), Some(Room::new(0, 0, 0, 9, 5)));
        assert_eq!(joined(&b, &a), Some(Room::new(0, 0, 0, 9, 5)));
        let c = Room::new(0, 0, 4, 6, 7);
        assert_eq!(joined(&a, &c), Some(Room::new(0, 0, 0, 6, 11)));
        assert_eq!(joined(&b, &c), None);
    }

    #[test]
    fn partition_rooms_fit_and_respect_limits() {
        for seed in 0..20 {
            let mut random = RngSource::seeded(seed);
            let Ok(rooms) = build_rooms(&mut random, 80, 40, 12) else {
                continue;
            };
            assert!(rooms.len() >= 2 && rooms.len() <= 12);
            for (i, r) in rooms.iter().enumerate() {
                assert_eq!(r.number(), i);
                assert!(r.width() >= MIN_ROOM_SIZE && r.height() >= MIN_ROOM_SIZE);
                assert!(r.x() >= 0 && r.right() <= 80);
                assert!(r.y() >= 0 && r.bottom() <= 40);
                assert!(r.width() <= MIN_ROOM_SIZE * 3 && r.height() <= MIN_ROOM_SIZE * 3);
            }
            for (i, a) in rooms.iter().enumerate() {
                for b in &rooms[i + 1..] {
                    assert!(!a.interior().overlaps(b.interior()), "{a} overlaps {b}");
                }
            }
        }
    }
}
