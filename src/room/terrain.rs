use bitflags::*;
use screeps::*;
use std::collections::HashMap;

pub const ROOM_TILES: usize = ROOM_SIZE as usize * ROOM_SIZE as usize;

pub const PLAIN_COST: u8 = 1;
pub const SWAMP_COST: u8 = 5;
pub const OBSTACLE_COST: u8 = u8::MAX;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TerrainFlags: u8 {
        const WALL = 0b0000_0001;
        const SWAMP = 0b0000_0010;
    }
}

pub fn xy(x: u8, y: u8) -> Option<RoomXY> {
    RoomXY::checked_new(x, y).ok()
}

#[inline]
pub fn tile_index(xy: RoomXY) -> usize {
    xy.y.u8() as usize * ROOM_SIZE as usize + xy.x.u8() as usize
}

/// Terrain and cost matrix for one room, frozen for the duration of a mesh generation.
///
/// A cost of zero means "use the terrain default", matching the game's cost matrix convention.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomTerrainSnapshot {
    terrain: Vec<TerrainFlags>,
    costs: Vec<u8>,
}

impl Default for RoomTerrainSnapshot {
    fn default() -> Self {
        RoomTerrainSnapshot::plain()
    }
}

impl RoomTerrainSnapshot {
    pub fn plain() -> RoomTerrainSnapshot {
        RoomTerrainSnapshot {
            terrain: vec![TerrainFlags::empty(); ROOM_TILES],
            costs: vec![0; ROOM_TILES],
        }
    }

    /// Build from the game's raw terrain buffer (one byte per tile, row major).
    pub fn from_raw_terrain(raw: &[u8]) -> Result<RoomTerrainSnapshot, String> {
        if raw.len() != ROOM_TILES {
            return Err(format!("Terrain buffer has {} tiles, expected {}", raw.len(), ROOM_TILES));
        }

        Ok(RoomTerrainSnapshot {
            terrain: raw.iter().map(|b| TerrainFlags::from_bits_truncate(*b)).collect(),
            costs: vec![0; ROOM_TILES],
        })
    }

    /// Build from a picture of the room, one string per row: `#` wall, `~` swamp, `o` a tile
    /// carrying a high (soft blocking) cost, `X` an impassable structure, anything else plain.
    /// Missing rows and columns are plain.
    pub fn from_rows(rows: &[&str]) -> RoomTerrainSnapshot {
        let mut snapshot = RoomTerrainSnapshot::plain();

        for (y, row) in rows.iter().enumerate().take(ROOM_SIZE as usize) {
            for (x, c) in row.chars().enumerate().take(ROOM_SIZE as usize) {
                let Some(tile) = xy(x as u8, y as u8) else {
                    continue;
                };

                match c {
                    '#' => snapshot.set_terrain(tile, TerrainFlags::WALL),
                    '~' => snapshot.set_terrain(tile, TerrainFlags::SWAMP),
                    'o' => snapshot.set_cost(tile, 100),
                    'X' => snapshot.set_cost(tile, OBSTACLE_COST),
                    _ => {}
                }
            }
        }

        snapshot
    }

    pub fn set_terrain(&mut self, xy: RoomXY, flags: TerrainFlags) {
        self.terrain[tile_index(xy)] = flags;
    }

    pub fn set_cost(&mut self, xy: RoomXY, cost: u8) {
        self.costs[tile_index(xy)] = cost;
    }

    pub fn terrain(&self, xy: RoomXY) -> TerrainFlags {
        self.terrain[tile_index(xy)]
    }

    pub fn is_wall(&self, xy: RoomXY) -> bool {
        self.terrain(xy).contains(TerrainFlags::WALL)
    }

    pub fn cost(&self, xy: RoomXY) -> u8 {
        let flags = self.terrain(xy);

        if flags.contains(TerrainFlags::WALL) {
            return OBSTACLE_COST;
        }

        match self.costs[tile_index(xy)] {
            0 if flags.contains(TerrainFlags::SWAMP) => SWAMP_COST,
            0 => PLAIN_COST,
            cost => cost,
        }
    }

    pub fn is_passable(&self, xy: RoomXY) -> bool {
        self.cost(xy) < OBSTACLE_COST
    }

    /// Tiles that are impassable or costly enough that the mesh treats them as walls.
    pub fn is_soft_blocked(&self, xy: RoomXY, threshold: u8) -> bool {
        !self.is_passable(xy) || self.cost(xy) > threshold
    }
}

/// Supplies terrain for a room, or `None` when the room's terrain is not available.
pub trait TerrainClassifier {
    fn classify(&self, room_name: RoomName) -> Option<RoomTerrainSnapshot>;
}

#[derive(Clone, Debug, Default)]
pub struct StaticTerrain {
    rooms: HashMap<RoomName, RoomTerrainSnapshot>,
}

impl StaticTerrain {
    pub fn new() -> StaticTerrain {
        StaticTerrain::default()
    }

    pub fn with(mut self, room_name: RoomName, snapshot: RoomTerrainSnapshot) -> StaticTerrain {
        self.insert(room_name, snapshot);
        self
    }

    pub fn insert(&mut self, room_name: RoomName, snapshot: RoomTerrainSnapshot) {
        self.rooms.insert(room_name, snapshot);
    }
}

impl TerrainClassifier for StaticTerrain {
    fn classify(&self, room_name: RoomName) -> Option<RoomTerrainSnapshot> {
        self.rooms.get(&room_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn costs_follow_terrain_defaults() {
        let snapshot = RoomTerrainSnapshot::from_rows(&["", " #~oX"]);

        assert_eq!(snapshot.cost(xy(0, 1).unwrap()), PLAIN_COST);
        assert_eq!(snapshot.cost(xy(1, 1).unwrap()), OBSTACLE_COST);
        assert_eq!(snapshot.cost(xy(2, 1).unwrap()), SWAMP_COST);
        assert_eq!(snapshot.cost(xy(3, 1).unwrap()), 100);
        assert!(!snapshot.is_passable(xy(4, 1).unwrap()));
    }

    #[test]
    fn soft_blocking_uses_threshold() {
        let snapshot = RoomTerrainSnapshot::from_rows(&["~o"]);

        assert!(!snapshot.is_soft_blocked(xy(0, 0).unwrap(), 50));
        assert!(snapshot.is_soft_blocked(xy(1, 0).unwrap(), 50));
        assert!(!snapshot.is_soft_blocked(xy(1, 0).unwrap(), 100));
    }

    #[test]
    fn raw_terrain_requires_full_room() {
        assert!(RoomTerrainSnapshot::from_raw_terrain(&[0; 10]).is_err());

        let mut raw = vec![0u8; ROOM_TILES];
        raw[51] = 1;
        raw[52] = 2;

        let snapshot = RoomTerrainSnapshot::from_raw_terrain(&raw).unwrap();

        assert!(snapshot.is_wall(xy(1, 1).unwrap()));
        assert_eq!(snapshot.cost(xy(2, 1).unwrap()), SWAMP_COST);
    }
}
