//! Room layout builders.
//!
//! Every builder returns rooms numbered `0..n` and finishes with
//! [`fix_neighbors`], so rooms that end up flush against each other share a
//! single wall line.

pub mod partition;
pub mod wiggle;
pub mod zones;

use crate::room::Room;

/// Smallest room side, walls included.
pub const MIN_ROOM_SIZE: i32 = 4;

/// Whether the floor rows of two rooms overlap.
fn interiors_overlap_y(a: &Room, b: &Room) -> bool {
    (a.bottom() - 1).min(b.bottom() - 1) > (a.y() + 1).max(b.y() + 1)
}

/// Whether the floor columns of two rooms overlap.
fn interiors_overlap_x(a: &Room, b: &Room) -> bool {
    (a.right() - 1).min(b.right() - 1) > (a.x() + 1).max(b.x() + 1)
}

fn fix_horizontal(rooms: &mut [Room], left: usize, right: usize) {
    if rooms[left].width() < rooms[right].width() {
        rooms[left].change_width(1);
    } else {
        rooms[right].dec_x();
        rooms[right].change_width(1);
    }
}

fn fix_vertical(rooms: &mut [Room], top: usize, bottom: usize) {
    if rooms[top].height() < rooms[bottom].height() {
        rooms[top].change_height(1);
    } else {
        rooms[bottom].dec_y();
        rooms[bottom].change_height(1);
    }
}

/// Merge the walls of rooms that sit flush against each other.
///
/// Two rooms are flush when one ends on the column (row) where the other
/// starts and their floors face each other. The smaller room grows by one
/// cell towards its neighbour, otherwise the neighbour moves back by one
/// cell and grows to compensate. Passes repeat until nothing changes.
pub fn fix_neighbors(rooms: &mut [Room]) {
    for _ in 0..rooms.len().max(1) {
        let mut changed = false;
        for i in 0..rooms.len() {
            for j in 0..rooms.len() {
                if i == j {
                    continue;
                }
                if rooms[i].right() == rooms[j].x() && interiors_overlap_y(&rooms[i], &rooms[j]) {
                    fix_horizontal(rooms, i, j);
                    changed = true;
                }
                if rooms[i].bottom() == rooms[j].y() && interiors_overlap_x(&rooms[i], &rooms[j]) {
                    fix_vertical(rooms, i, j);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_rooms_share_one_wall() {
        let mut rooms = vec![Room::new(0, 0, 0, 5, 6), Room::new(1, 5, 1, 6, 6)];
        fix_neighbors(&mut rooms);
        // Smaller left room grows into the shared column.
        assert_eq!(rooms[0].width(), 6);
        assert_eq!(rooms[0].right() - 1, rooms[1].x());
        assert!(!rooms[0].interior().overlaps(rooms[1].interior()));
    }

    #[test]
    fn larger_left_room_pulls_neighbour_back() {
        let mut rooms = vec![Room::new(0, 0, 0, 6, 6), Room::new(1, 0, 6, 6, 4)];
        fix_neighbors(&mut rooms);
        assert_eq!(rooms[1].y(), 5);
        assert_eq!(rooms[1].height(), 5);
        assert_eq!(rooms[0].bottom() - 1, rooms[1].y());
    }

    #[test]
    fn separated_or_diagonal_rooms_are_untouched() {
        let mut rooms = vec![
            Room::new(0, 0, 0, 5, 5),
            Room::new(1, 7, 0, 5, 5),
            // Flush on x but only corner-to-corner.
            Room::new(2, 12, 5, 5, 5),
        ];
        let before = rooms.clone();
        fix_neighbors(&mut rooms);
        assert_eq!(rooms, before);
    }
}
