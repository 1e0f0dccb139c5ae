use crate::mesh::*;
use crate::pathing::pathfinder::*;
use crate::room::data::*;
use crate::room::terrain::*;
use screeps::*;

impl GameTime {
    pub fn current() -> GameTime {
        GameTime(game::time())
    }
}

/// Single room searches through the game's own pathfinder.
pub struct ScreepsPathfinder;

impl RoomPathfinder for ScreepsPathfinder {
    fn search(&mut self, origin: Position, goal: Position, range: u32) -> PathfindingResult {
        let options = pathfinder::SearchOptions::default().max_rooms(1);
        let result = pathfinder::search(origin, goal, range, Some(options));

        PathfindingResult {
            path: result.path(),
            incomplete: result.incomplete(),
        }
    }
}

/// Terrain from the game map. Cost matrix entries are left at their terrain defaults.
pub struct ScreepsTerrainClassifier;

impl TerrainClassifier for ScreepsTerrainClassifier {
    fn classify(&self, room_name: RoomName) -> Option<RoomTerrainSnapshot> {
        let terrain = game::map::get_room_terrain(room_name)?;

        RoomTerrainSnapshot::from_raw_terrain(&terrain.get_raw_buffer().to_vec()).ok()
    }
}

/// Risk from currently visible rooms. Rooms without visibility are treated as neutral.
pub struct VisibleRoomRisk {
    username: String,
    friends: Vec<String>,
}

impl VisibleRoomRisk {
    pub fn new(username: String, friends: Vec<String>) -> VisibleRoomRisk {
        VisibleRoomRisk { username, friends }
    }

    fn disposition(&self, name: Option<String>) -> RoomDisposition {
        RoomDisposition::of_user(name, &self.username, &self.friends)
    }
}

impl RoomRiskClassifier for VisibleRoomRisk {
    fn classify(&self, room_name: RoomName) -> RoomRisk {
        let Some(room) = game::rooms().get(room_name) else {
            return RoomRisk::default();
        };

        let controller = room.controller();

        let owner = controller.as_ref().and_then(|c| c.owner()).map(|owner| owner.username());
        let reservation = controller.as_ref().and_then(|c| c.reservation()).map(|r| r.username());

        let hazardous = room
            .find(find::HOSTILE_STRUCTURES, None)
            .iter()
            .any(|structure| matches!(structure, StructureObject::StructureKeeperLair(_)));

        RoomRisk {
            owner: self.disposition(owner),
            reservation: self.disposition(reservation),
            hazardous,
        }
    }
}

pub struct SegmentMeshStorage;

impl MeshStorage for SegmentMeshStorage {
    fn get_cache(&self, segment: u8) -> Result<RoomMeshes, String> {
        let segments = RawMemory::segments();
        let raw_data = segments.get(segment).ok_or("Mesh memory segment not active")?;
        let raw_data: String = raw_data.into();

        crate::serialize::decode_from_string(&raw_data)
    }

    fn set_cache(&mut self, segment: u8, data: &RoomMeshes) -> Result<(), String> {
        let encoded = crate::serialize::encode_to_string(data)?;

        if encoded.len() > MEMORY_SEGMENT_SIZE_LIMIT as usize {
            return Err(format!("Encoded meshes exceed segment size - Segment: {} - Size: {}", segment, encoded.len()));
        }

        RawMemory::segments().set(segment, encoded.into());

        Ok(())
    }
}
