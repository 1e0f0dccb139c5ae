use super::store::*;
use crate::pathing::pathfinder::*;
use crate::room::terrain::*;
use log::*;
use screeps::*;
use specs::prelude::*;
use std::collections::{HashSet, VecDeque};

/// Current game tick, refreshed by the host at the start of each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameTime(pub u32);

/// Rooms waiting for a mesh to be (re)built, oldest first. A room is queued at most once.
#[derive(Clone, Debug, Default)]
pub struct MeshRequests {
    queue: VecDeque<RoomName>,
    pending: HashSet<RoomName>,
}

impl MeshRequests {
    pub fn new() -> MeshRequests {
        MeshRequests::default()
    }

    pub fn request(&mut self, room_name: RoomName) -> bool {
        if self.pending.insert(room_name) {
            self.queue.push_back(room_name);
            true
        } else {
            false
        }
    }

    pub fn pop(&mut self) -> Option<RoomName> {
        let room_name = self.queue.pop_front()?;

        self.pending.remove(&room_name);

        Some(room_name)
    }

    pub fn contains(&self, room_name: RoomName) -> bool {
        self.pending.contains(&room_name)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Extend<RoomName> for MeshRequests {
    fn extend<T: IntoIterator<Item = RoomName>>(&mut self, iter: T) {
        for room_name in iter {
            self.request(room_name);
        }
    }
}

#[derive(SystemData)]
pub struct MeshGenerationSystemData<'a> {
    game_time: ReadExpect<'a, GameTime>,
    mesh_store: WriteExpect<'a, MeshStore>,
    mesh_requests: WriteExpect<'a, MeshRequests>,
}

/// Builds meshes for requested rooms, bounded by `max_generations_per_tick`. Requests for rooms
/// whose mesh is still fresh are dropped without counting against the bound.
pub struct MeshGenerationSystem<C, P> {
    classifier: C,
    pathfinder: P,
}

impl<C, P> MeshGenerationSystem<C, P>
where
    C: TerrainClassifier,
    P: RoomPathfinder,
{
    pub fn new(classifier: C, pathfinder: P) -> MeshGenerationSystem<C, P> {
        MeshGenerationSystem { classifier, pathfinder }
    }
}

#[cfg_attr(feature = "profile", screeps_timing_annotate::timing)]
impl<'a, C, P> System<'a> for MeshGenerationSystem<C, P>
where
    C: TerrainClassifier,
    P: RoomPathfinder,
{
    type SystemData = MeshGenerationSystemData<'a>;

    fn run(&mut self, mut data: Self::SystemData) {
        let tick = data.game_time.0;
        let max_generations = data.mesh_store.features().max_generations_per_tick;

        let mut generated = 0;

        while generated < max_generations {
            let Some(room_name) = data.mesh_requests.pop() else {
                break;
            };

            if data
                .mesh_store
                .generate_for_room(room_name, tick, &self.classifier, &mut self.pathfinder)
            {
                generated += 1;
            }
        }

        if !data.mesh_requests.is_empty() {
            debug!(
                "Generated {} room meshes, {} requests deferred",
                generated,
                data.mesh_requests.len()
            );
        }
    }
}

#[derive(SystemData)]
pub struct MeshStoreSystemData<'a> {
    mesh_store: WriteExpect<'a, MeshStore>,
}

/// Writes changed meshes back to storage.
pub struct MeshStoreSystem;

#[cfg_attr(feature = "profile", screeps_timing_annotate::timing)]
impl<'a> System<'a> for MeshStoreSystem {
    type SystemData = MeshStoreSystemData<'a>;

    fn run(&mut self, mut data: Self::SystemData) {
        data.mesh_store.flush_storage();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::MeshFeatures;

    fn rooms() -> Vec<RoomName> {
        ["W1N1", "W2N1", "W3N1"]
            .iter()
            .map(|name| RoomName::new(name).unwrap())
            .collect()
    }

    fn terrain() -> StaticTerrain {
        rooms()
            .into_iter()
            .fold(StaticTerrain::new(), |terrain, room| terrain.with(room, RoomTerrainSnapshot::plain()))
    }

    fn world(features: MeshFeatures) -> World {
        let mut world = World::new();

        world.insert(GameTime(50));
        world.insert(MeshStore::new(features));
        world.insert(MeshRequests::new());

        world
    }

    #[test]
    fn requests_are_deduplicated() {
        let room = rooms()[0];
        let mut requests = MeshRequests::new();

        assert!(requests.request(room));
        assert!(!requests.request(room));
        assert_eq!(requests.len(), 1);

        assert_eq!(requests.pop(), Some(room));
        assert!(!requests.contains(room));
        assert!(requests.request(room));
    }

    #[test]
    fn generation_is_bounded_per_tick() {
        let world = world(MeshFeatures::default());
        let terrain = terrain();
        let mut system = MeshGenerationSystem::new(terrain.clone(), GridPathfinder::new(terrain));

        world.write_resource::<MeshRequests>().extend(rooms());

        system.run_now(&world);

        assert_eq!(world.read_resource::<MeshStore>().len(), 1);
        assert_eq!(world.read_resource::<MeshRequests>().len(), 2);

        system.run_now(&world);
        system.run_now(&world);

        let store = world.read_resource::<MeshStore>();

        assert_eq!(store.len(), 3);
        assert!(rooms().into_iter().all(|room| store.contains(room)));
        assert!(world.read_resource::<MeshRequests>().is_empty());
    }

    #[test]
    fn fresh_rooms_do_not_consume_the_budget() {
        let world = world(MeshFeatures::default());
        let terrain = terrain();
        let mut system = MeshGenerationSystem::new(terrain.clone(), GridPathfinder::new(terrain));
        let rooms = rooms();

        world.write_resource::<MeshRequests>().request(rooms[0]);
        system.run_now(&world);

        world.write_resource::<MeshRequests>().extend(vec![rooms[0], rooms[1]]);
        system.run_now(&world);

        assert_eq!(world.read_resource::<MeshStore>().len(), 2);
        assert!(world.read_resource::<MeshRequests>().is_empty());
    }

    #[test]
    fn store_system_flushes_changes() {
        let storage = InMemoryMeshStorage::new();
        let terrain = terrain();
        let mut pathfinder = GridPathfinder::new(terrain.clone());

        let mut world = World::new();
        let mut store = MeshStore::with_storage(MeshFeatures::default(), Box::new(storage.clone()), 12);
        store.generate_for_room(rooms()[0], 1, &terrain, &mut pathfinder);
        world.insert(store);

        MeshStoreSystem.run_now(&world);

        assert!(!world.read_resource::<MeshStore>().is_dirty());
        assert!(storage.raw_segment(12).is_some());
    }
}
