use super::distances::*;
use super::exits::*;
use super::regions::*;
use super::*;
use crate::features::MeshFeatures;
use crate::pathing::pathfinder::*;
use crate::room::terrain::*;
use log::*;
use shrinkwraprs::*;
use std::collections::HashMap;

#[derive(Shrinkwrap, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[shrinkwrap(mutable)]
#[serde(transparent)]
pub struct RoomMeshes(pub HashMap<RoomName, RoomMesh>);

/// Backing storage for persisted meshes, typically a memory segment.
pub trait MeshStorage {
    fn get_cache(&self, segment: u8) -> Result<RoomMeshes, String>;

    fn set_cache(&mut self, segment: u8, data: &RoomMeshes) -> Result<(), String>;
}

struct MeshPersistence {
    storage: Box<dyn MeshStorage>,
    segment: u8,
}

/// Build a mesh for a room from scratch.
pub fn generate_mesh(
    room_name: RoomName,
    snapshot: &RoomTerrainSnapshot,
    pathfinder: &mut dyn RoomPathfinder,
    tick: u32,
    features: &MeshFeatures,
) -> RoomMesh {
    let mut annotations = AnnotationGrid::new(snapshot, features.soft_block_cost);

    let exits = detect_exits(snapshot, features.soft_block_cost, &mut annotations);
    let regions = partition_regions(&mut annotations, &exits, features.center_search_radius);
    let path_table = build_path_table(room_name, &exits, &regions, pathfinder);

    RoomMesh {
        generated_at: tick,
        exits,
        path_table,
        regions: if regions.len() > 1 { Some(regions) } else { None },
    }
}

/// Owns every room mesh and decides when one needs rebuilding.
pub struct MeshStore {
    meshes: RoomMeshes,
    features: MeshFeatures,
    persistence: Option<MeshPersistence>,
    dirty: bool,
}

impl Default for MeshStore {
    fn default() -> Self {
        MeshStore::new(MeshFeatures::default())
    }
}

#[cfg_attr(feature = "profile", screeps_timing_annotate::timing)]
impl MeshStore {
    pub fn new(features: MeshFeatures) -> MeshStore {
        MeshStore {
            meshes: RoomMeshes::default(),
            features,
            persistence: None,
            dirty: false,
        }
    }

    pub fn with_storage(features: MeshFeatures, storage: Box<dyn MeshStorage>, segment: u8) -> MeshStore {
        MeshStore {
            persistence: Some(MeshPersistence { storage, segment }),
            ..MeshStore::new(features)
        }
    }

    pub fn features(&self) -> &MeshFeatures {
        &self.features
    }

    pub fn get(&self, room_name: RoomName) -> Option<&RoomMesh> {
        self.meshes.get(&room_name)
    }

    pub fn contains(&self, room_name: RoomName) -> bool {
        self.meshes.contains_key(&room_name)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn rooms(&self) -> impl Iterator<Item = RoomName> + '_ {
        self.meshes.keys().copied()
    }

    pub fn insert(&mut self, room_name: RoomName, mesh: RoomMesh) {
        self.meshes.insert(room_name, mesh);
        self.dirty = true;
    }

    pub fn remove(&mut self, room_name: RoomName) -> Option<RoomMesh> {
        let removed = self.meshes.remove(&room_name);

        if removed.is_some() {
            self.dirty = true;
        }

        removed
    }

    /// Missing meshes count as stale.
    pub fn is_stale(&self, room_name: RoomName, tick: u32) -> bool {
        self.get(room_name)
            .map(|mesh| mesh.age(tick) >= self.features.staleness_interval)
            .unwrap_or(true)
    }

    /// Rebuild the room's mesh unless a fresh one exists. Returns true if the mesh was rebuilt.
    ///
    /// Rooms whose terrain is unavailable are left untouched.
    pub fn generate_for_room(
        &mut self,
        room_name: RoomName,
        tick: u32,
        classifier: &dyn TerrainClassifier,
        pathfinder: &mut dyn RoomPathfinder,
    ) -> bool {
        if !self.is_stale(room_name, tick) {
            return false;
        }

        let Some(snapshot) = classifier.classify(room_name) else {
            warn!("No terrain available for room {}, skipping mesh generation", room_name);
            return false;
        };

        let mesh = generate_mesh(room_name, &snapshot, pathfinder, tick, &self.features);

        info!("Generated mesh for room {} - {}", room_name, mesh.summary());

        self.insert(room_name, mesh);

        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn load_from_storage(&mut self) -> Result<(), String> {
        let persistence = self.persistence.as_ref().ok_or("Mesh store has no storage")?;

        let meshes = persistence
            .storage
            .get_cache(persistence.segment)
            .map_err(|err| format!("Failed to load room meshes from segment {}: {}", persistence.segment, err))?;

        self.meshes = meshes;
        self.dirty = false;

        Ok(())
    }

    /// Write the meshes to storage if anything changed since the last flush.
    pub fn flush_storage(&mut self) {
        if !self.dirty {
            return;
        }

        if let Some(persistence) = self.persistence.as_mut() {
            match persistence.storage.set_cache(persistence.segment, &self.meshes) {
                Ok(()) => self.dirty = false,
                Err(err) => error!("Failed to store room meshes: {}", err),
            }
        }
    }
}

/// Storage that keeps encoded segments in memory, the way the game's segment store behaves
/// within a single global reset.
#[derive(Clone, Debug, Default)]
pub struct InMemoryMeshStorage {
    segments: std::rc::Rc<std::cell::RefCell<HashMap<u8, String>>>,
}

impl InMemoryMeshStorage {
    pub fn new() -> InMemoryMeshStorage {
        InMemoryMeshStorage::default()
    }

    pub fn raw_segment(&self, segment: u8) -> Option<String> {
        self.segments.borrow().get(&segment).cloned()
    }
}

impl MeshStorage for InMemoryMeshStorage {
    fn get_cache(&self, segment: u8) -> Result<RoomMeshes, String> {
        let segments = self.segments.borrow();
        let raw_data = segments.get(&segment).ok_or("Mesh memory segment not active")?;

        crate::serialize::decode_from_string(raw_data)
    }

    fn set_cache(&mut self, segment: u8, data: &RoomMeshes) -> Result<(), String> {
        let encoded = crate::serialize::encode_to_string(data)?;

        self.segments.borrow_mut().insert(segment, encoded);

        Ok(())
    }
}
