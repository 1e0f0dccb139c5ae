use screeps::*;
use screeps_ibex_nav::features::*;
use screeps_ibex_nav::mesh::*;
use screeps_ibex_nav::pathing::pathfinder::*;
use screeps_ibex_nav::pathing::router::*;
use screeps_ibex_nav::room::data::*;
use screeps_ibex_nav::room::terrain::*;
use specs::prelude::*;

fn room(name: &str) -> RoomName {
    RoomName::new(name).unwrap()
}

fn pos(x: u8, y: u8, room_name: &str) -> Position {
    Position::new(RoomCoordinate::new(x).unwrap(), RoomCoordinate::new(y).unwrap(), room(room_name))
}

fn exit(side: ExitSide, ordinal: u8) -> ExitId {
    ExitId::new(side, ordinal).unwrap()
}

fn wall_with_gap(gap: Option<(u8, char)>) -> RoomTerrainSnapshot {
    let rows: Vec<String> = (0..ROOM_SIZE)
        .map(|y| {
            (0..ROOM_SIZE)
                .map(|x| match gap {
                    Some((gap_y, tile)) if x == 25 && y == gap_y => tile,
                    _ if x == 25 => '#',
                    _ => '.',
                })
                .collect()
        })
        .collect();

    let rows: Vec<&str> = rows.iter().map(|row| row.as_str()).collect();

    RoomTerrainSnapshot::from_rows(&rows)
}

fn build(store: &mut MeshStore, terrain: &StaticTerrain, rooms: &[&str]) -> GridPathfinder<StaticTerrain> {
    let mut pathfinder = GridPathfinder::new(terrain.clone());

    for name in rooms {
        assert!(store.generate_for_room(room(name), 1, terrain, &mut pathfinder));
    }

    pathfinder
}

#[test]
fn open_room_has_four_exits_and_one_region() {
    let terrain = StaticTerrain::new().with(room("W8S3"), RoomTerrainSnapshot::plain());
    let mut store = MeshStore::default();
    build(&mut store, &terrain, &["W8S3"]);

    let mesh = store.get(room("W8S3")).unwrap();

    let sides: Vec<ExitSide> = mesh.exits.iter().map(|exit| exit.side()).collect();
    assert_eq!(sides, ExitSide::ALL.to_vec());
    assert!(mesh.regions.is_none());

    for exit in mesh.exits.iter() {
        assert!(mesh.path_table.center_distance(exit.id).is_some());
    }
}

#[test]
fn soft_blocked_gap_splits_room() {
    let terrain = StaticTerrain::new().with(room("W8S3"), wall_with_gap(Some((24, 'o'))));
    let mut store = MeshStore::default();
    build(&mut store, &terrain, &["W8S3"]);

    let mesh = store.get(room("W8S3")).unwrap();
    let regions = mesh.regions.as_ref().unwrap();

    assert_eq!(regions.len(), 2);
    assert!(regions[0].exits.iter().all(|exit| !regions[1].exits.contains(exit)));
    assert!(mesh.exits_reachable_from(exit(ExitSide::Left, 0)).contains(&exit(ExitSide::Top, 0)));
    assert!(!mesh.exits_reachable_from(exit(ExitSide::Left, 0)).contains(&exit(ExitSide::Right, 0)));
    assert_eq!(mesh.path_table.distance(exit(ExitSide::Left, 0), exit(ExitSide::Right, 0)), None);
}

#[test]
fn open_gap_connects_both_halves() {
    let terrain = StaticTerrain::new().with(room("W8S3"), wall_with_gap(Some((24, '.'))));
    let mut store = MeshStore::default();
    build(&mut store, &terrain, &["W8S3"]);

    let mesh = store.get(room("W8S3")).unwrap();

    assert!(mesh.regions.is_none());
    assert_eq!(mesh.exits.len(), 6);
    assert_eq!(mesh.path_table.distance(exit(ExitSide::Left, 0), exit(ExitSide::Right, 0)), Some(49));
}

#[test]
fn recorded_distances_match_the_pathfinder() {
    let snapshot = RoomTerrainSnapshot::from_rows(&[
        "..................................................",
        "..........~~~~~~~~~~..............................",
        "..........~~~~~~~~~~.............#################",
        "..........~~~~~~~~~~..............................",
        "......................############................",
        "......................#..........#................",
        "......................#..........#................",
        "......................############................",
    ]);

    let terrain = StaticTerrain::new().with(room("E4N4"), snapshot);
    let mut store = MeshStore::default();
    let mut pathfinder = build(&mut store, &terrain, &["E4N4"]);

    let mesh = store.get(room("E4N4")).unwrap();

    for (from, to, distance) in mesh.path_table.iter() {
        let origin = mesh.exit(from).unwrap().center;
        let target = match to {
            PathTarget::Exit(id) => mesh.exit(id).unwrap().center,
            PathTarget::Center => mesh.region_of(from).map(|region| region.center).unwrap_or(RoomXY::checked_new(24, 24).unwrap()),
        };

        let result = pathfinder.search(
            Position::new(origin.x, origin.y, room("E4N4")),
            Position::new(target.x, target.y, room("E4N4")),
            0,
        );

        assert!(result.complete());
        assert_eq!(result.path.len() as u32, distance);
    }
}

#[test]
fn routes_around_a_corner() {
    let rooms = ["E1S1", "E2S1", "E2S2"];
    let terrain = rooms
        .iter()
        .fold(StaticTerrain::new(), |terrain, name| terrain.with(room(name), RoomTerrainSnapshot::plain()));

    let mut store = MeshStore::default();
    let mut pathfinder = build(&mut store, &terrain, &rooms);
    let features = RoutingFeatures::default();
    let risk = StaticRisk::new();

    let result = CrossRoomRouter::new(&store, &risk, &features).find_path(
        pos(25, 25, "E1S1"),
        pos(10, 10, "E2S2"),
        &RouteOptions::default(),
        &mut pathfinder,
    );

    assert!(!result.incomplete);
    assert_eq!(result.cost, 25.0 + 25.0 + 24.0);
    assert_eq!(
        result.path,
        vec![pos(49, 24, "E1S1"), pos(24, 49, "E2S1"), pos(24, 0, "E2S2")]
    );
}

#[test]
fn requested_meshes_are_generated_persisted_and_reloaded() {
    let rooms = ["W1N1", "W2N1", "W3N1"];
    let terrain = rooms
        .iter()
        .fold(StaticTerrain::new(), |terrain, name| terrain.with(room(name), RoomTerrainSnapshot::plain()));

    let storage = InMemoryMeshStorage::new();
    let features = Features::default();

    let mut world = World::new();
    world.insert(GameTime(1_000));
    world.insert(MeshStore::with_storage(features.mesh.clone(), Box::new(storage.clone()), 61));
    world.insert(MeshRequests::new());

    let mut generation = MeshGenerationSystem::new(terrain.clone(), GridPathfinder::new(terrain.clone()));
    let mut pathfinder = GridPathfinder::new(terrain);
    let risk = StaticRisk::new();

    let start = pos(25, 25, "W1N1");
    let end = pos(25, 25, "W3N1");

    let first = {
        let store = world.read_resource::<MeshStore>();
        CrossRoomRouter::new(&store, &risk, &features.routing).find_path(start, end, &RouteOptions::default(), &mut pathfinder)
    };

    assert!(first.incomplete);
    assert_eq!(first.missing_rooms, vec![room("W1N1")]);

    world.write_resource::<MeshRequests>().extend(first.missing_rooms);
    world.write_resource::<MeshRequests>().extend(vec![room("W2N1"), room("W3N1")]);

    for _ in 0..rooms.len() {
        generation.run_now(&world);
        MeshStoreSystem.run_now(&world);
    }

    let mut restored = MeshStore::with_storage(features.mesh.clone(), Box::new(storage), 61);
    restored.load_from_storage().unwrap();

    assert_eq!(restored.len(), 3);

    let routed = CrossRoomRouter::new(&restored, &risk, &features.routing).find_path(
        start,
        end,
        &RouteOptions::default(),
        &mut pathfinder,
    );

    assert!(!routed.incomplete);
    assert_eq!(routed.path.len(), 3);
    assert_eq!(routed.path[0].room_name(), room("W1N1"));
    assert_eq!(routed.path[2].room_name(), room("W3N1"));
}

#[test]
fn regeneration_keeps_exit_ids() {
    let terrain = StaticTerrain::new().with(room("W8S3"), wall_with_gap(Some((24, 'o'))));
    let mut store = MeshStore::default();
    let mut pathfinder = build(&mut store, &terrain, &["W8S3"]);

    let first = store.get(room("W8S3")).unwrap().clone();

    assert!(store.generate_for_room(room("W8S3"), 1 + 10_000, &terrain, &mut pathfinder));

    let second = store.get(room("W8S3")).unwrap();

    assert_eq!(second.generated_at, 10_001);
    assert_eq!(second.exits, first.exits);
    assert_eq!(second.regions, first.regions);
}

fn border_with_walls(x: u8, walls: &[u8]) -> RoomTerrainSnapshot {
    let mut snapshot = RoomTerrainSnapshot::plain();

    for y in walls {
        snapshot.set_terrain(RoomXY::checked_new(x, *y).unwrap(), TerrainFlags::WALL);
    }

    snapshot
}

#[test]
fn opposite_exit_is_mirrored_across_the_border() {
    let terrain = StaticTerrain::new()
        .with(room("E1N1"), border_with_walls(49, &[10, 30]))
        .with(room("E2N1"), border_with_walls(0, &[10, 30]));

    let mut store = MeshStore::default();
    build(&mut store, &terrain, &["E1N1", "E2N1"]);

    let west = store.get(room("E1N1")).unwrap();
    let east = store.get(room("E2N1")).unwrap();

    let right: Vec<_> = west.exits.iter().filter(|exit| exit.side() == ExitSide::Right).collect();

    assert_eq!(right.len(), 3);

    for exit in right {
        let mirrored = east.exit(exit.id.opposite()).unwrap();

        assert_eq!(mirrored.side(), ExitSide::Left);
        assert_eq!(mirrored.center.x.u8(), 0);
        assert_eq!(exit.center.x.u8(), 49);
        assert_eq!(mirrored.center.y, exit.center.y);
    }
}

#[test]
fn neighbor_without_a_matching_exit_is_not_entered() {
    let walled: Vec<u8> = (0..ROOM_SIZE).collect();
    let terrain = StaticTerrain::new()
        .with(room("E1N1"), RoomTerrainSnapshot::plain())
        .with(room("E2N1"), border_with_walls(0, &walled))
        .with(room("E3N1"), RoomTerrainSnapshot::plain());

    let mut store = MeshStore::default();
    let mut pathfinder = build(&mut store, &terrain, &["E1N1", "E2N1", "E3N1"]);

    assert!(store
        .get(room("E2N1"))
        .unwrap()
        .exits
        .iter()
        .all(|exit| exit.side() != ExitSide::Left));

    let risk = StaticRisk::new();
    let features = RoutingFeatures::default();

    let result = CrossRoomRouter::new(&store, &risk, &features).find_path(
        pos(25, 25, "E1N1"),
        pos(25, 25, "E3N1"),
        &RouteOptions::default(),
        &mut pathfinder,
    );

    assert!(result.incomplete);
    assert!(result.path.is_empty());
    assert!(!result.missing_rooms.contains(&room("E2N1")));
    assert!(result.missing_rooms.contains(&room("E1N2")));
}
