use crate::room::utility::*;
use screeps::*;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

const ROOM_COORD_BIAS: i32 = 128;

/// Compact, totally ordered key for a position. Rendered as eight hex digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionKey(u32);

impl PositionKey {
    pub fn new(pos: Position) -> Option<PositionKey> {
        let (room_x, room_y) = room_coords(pos.room_name());

        let room_x = u8::try_from(room_x + ROOM_COORD_BIAS).ok()?;
        let room_y = u8::try_from(room_y + ROOM_COORD_BIAS).ok()?;

        Some(PositionKey(
            (room_x as u32) << 24 | (room_y as u32) << 16 | (pos.x().u8() as u32) << 8 | pos.y().u8() as u32,
        ))
    }

    pub fn packed(&self) -> u32 {
        self.0
    }

    pub fn to_position(self) -> Option<Position> {
        let room_x = (self.0 >> 24) as i32 - ROOM_COORD_BIAS;
        let room_y = ((self.0 >> 16) & 0xff) as i32 - ROOM_COORD_BIAS;
        let x = RoomCoordinate::new(((self.0 >> 8) & 0xff) as u8).ok()?;
        let y = RoomCoordinate::new((self.0 & 0xff) as u8).ok()?;

        let room_name = room_from_coords(room_x, room_y)?;

        Some(Position::new(x, y, room_name))
    }
}

impl Display for PositionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl FromStr for PositionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 {
            return Err(format!("Position key must be 8 hex digits: {}", s));
        }

        u32::from_str_radix(s, 16).map(PositionKey).map_err(|e| e.to_string())
    }
}

pub fn encode_position(pos: Position) -> Result<String, String> {
    PositionKey::new(pos)
        .map(|key| key.to_string())
        .ok_or_else(|| format!("Position out of encodable range: {}", pos))
}

pub fn decode_position(data: &str) -> Result<Position, String> {
    let key: PositionKey = data.parse()?;

    key.to_position().ok_or_else(|| format!("Position key does not describe a tile: {}", data))
}
