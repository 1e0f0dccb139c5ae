use crate::mesh::ExitSide;
use screeps::*;

//
// NOTE: Room coordinates follow the world grid: E0 is x = 0 and W0 is x = -1, S0 is y = 0 and
//       N0 is y = -1. Moving north decreases y.
//

pub fn room_coords(room_name: RoomName) -> (i32, i32) {
    (room_name.x_coord(), room_name.y_coord())
}

pub fn room_from_coords(x: i32, y: i32) -> Option<RoomName> {
    // `RoomName::from_coords` is not public; offsetting from E0S0 (coords (0, 0)) is equivalent.
    RoomName::from_packed(0x8080).checked_add((x, y))
}

pub fn side_offset(side: ExitSide) -> (i32, i32) {
    match side {
        ExitSide::Top => (0, -1),
        ExitSide::Right => (1, 0),
        ExitSide::Bottom => (0, 1),
        ExitSide::Left => (-1, 0),
    }
}

/// The room on the other side of the given edge of `room_name`.
pub fn neighbor(room_name: RoomName, side: ExitSide) -> Option<RoomName> {
    room_name.checked_add(side_offset(side))
}

/// Number of room transitions needed to cross between two rooms on an unobstructed map.
pub fn linear_distance(from: RoomName, to: RoomName) -> u32 {
    let (fx, fy) = room_coords(from);
    let (tx, ty) = room_coords(to);

    (fx - tx).unsigned_abs().max((fy - ty).unsigned_abs())
}
