use crate::features::*;
use crate::mesh::*;
use crate::pathing::router::*;
use crate::position::*;
use crate::screepsinterface::*;
use log::*;
use screeps::*;
use specs::prelude::*;
use std::cell::RefCell;

const MESH_SEGMENT: u8 = 60;

struct GameEnvironment {
    world: World,
    mesh_generation: MeshGenerationSystem<ScreepsTerrainClassifier, ScreepsPathfinder>,
    risk: VisibleRoomRisk,
    features: Features,
    loaded: bool,
}

thread_local! {
    static ENVIRONMENT: RefCell<Option<GameEnvironment>> = const { RefCell::new(None) };
}

fn create_environment(username: String, features: Features) -> GameEnvironment {
    info!("Initializing navigation environment");

    let mut world = World::new();

    world.insert(GameTime::current());
    world.insert(MeshStore::with_storage(
        features.mesh.clone(),
        Box::new(SegmentMeshStorage),
        MESH_SEGMENT,
    ));
    world.insert(MeshRequests::new());

    GameEnvironment {
        world,
        mesh_generation: MeshGenerationSystem::new(ScreepsTerrainClassifier, ScreepsPathfinder),
        risk: VisibleRoomRisk::new(username, features.routing.friends.clone()),
        features,
        loaded: false,
    }
}

pub fn setup(username: String, features: Features) {
    ENVIRONMENT.with(|environment| {
        *environment.borrow_mut() = Some(create_environment(username, features));
    });
}

#[cfg_attr(feature = "profile", screeps_timing_annotate::timing)]
pub fn tick() {
    ENVIRONMENT.with(|environment| {
        let mut environment = environment.borrow_mut();

        let Some(GameEnvironment {
            world,
            mesh_generation,
            loaded,
            ..
        }) = environment.as_mut()
        else {
            warn!("Navigation environment not set up, skipping tick");
            return;
        };

        RawMemory::set_active_segments(&[MESH_SEGMENT]);

        if !*loaded {
            if !RawMemory::segments().keys().any(|segment| segment == MESH_SEGMENT) {
                info!("Mesh segment is not ready, delaying mesh generation");
                return;
            }

            if let Err(err) = world.write_resource::<MeshStore>().load_from_storage() {
                warn!("Starting with an empty mesh store - {}", err);
            }

            *loaded = true;
        }

        world.insert(GameTime::current());

        mesh_generation.run_now(world);
        MeshStoreSystem.run_now(world);
    });
}

/// Route between two encoded positions. Rooms without a mesh are queued for generation, and a
/// failed search returns `None`.
pub fn find_route(start: &str, end: &str, allow_danger: bool) -> Result<Option<Vec<String>>, String> {
    let start = decode_position(start)?;
    let end = decode_position(end)?;

    ENVIRONMENT.with(|environment| {
        let environment = environment.borrow();
        let environment = environment.as_ref().ok_or("Navigation environment not set up")?;

        let result = {
            let store = environment.world.read_resource::<MeshStore>();
            let router = CrossRoomRouter::new(&store, &environment.risk, &environment.features.routing);
            let options = RouteOptions::default().allow_danger(allow_danger);

            router.find_path(start, end, &options, &mut ScreepsPathfinder)
        };

        environment
            .world
            .write_resource::<MeshRequests>()
            .extend(result.missing_rooms.iter().copied());

        if result.incomplete {
            return Ok(None);
        }

        result.path.into_iter().map(encode_position).collect::<Result<Vec<_>, _>>().map(Some)
    })
}
