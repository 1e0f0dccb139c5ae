use crate::mesh::regions::NEIGHBORS_8;
use crate::room::terrain::*;
use pathfinding::directed::astar::*;
use screeps::*;
use std::collections::HashMap;

/// Result of a pathfinding search. The path does not include the origin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathfindingResult {
    pub path: Vec<Position>,
    pub incomplete: bool,
}

impl PathfindingResult {
    pub fn failed() -> PathfindingResult {
        PathfindingResult {
            path: Vec::new(),
            incomplete: true,
        }
    }

    pub fn complete(&self) -> bool {
        !self.incomplete
    }
}

/// Shortest path search confined to a single room.
pub trait RoomPathfinder {
    fn search(&mut self, origin: Position, goal: Position, range: u32) -> PathfindingResult;
}

impl<T> RoomPathfinder for &mut T
where
    T: RoomPathfinder + ?Sized,
{
    fn search(&mut self, origin: Position, goal: Position, range: u32) -> PathfindingResult {
        (**self).search(origin, goal, range)
    }
}

/// A* over a room's terrain snapshot, moving in eight directions.
pub struct GridPathfinder<C> {
    classifier: C,
    snapshots: HashMap<RoomName, Option<RoomTerrainSnapshot>>,
    searches: u32,
}

impl<C> GridPathfinder<C>
where
    C: TerrainClassifier,
{
    pub fn new(classifier: C) -> GridPathfinder<C> {
        GridPathfinder {
            classifier,
            snapshots: HashMap::new(),
            searches: 0,
        }
    }

    /// Number of searches run so far.
    pub fn searches(&self) -> u32 {
        self.searches
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }
}

impl<C> RoomPathfinder for GridPathfinder<C>
where
    C: TerrainClassifier,
{
    fn search(&mut self, origin: Position, goal: Position, range: u32) -> PathfindingResult {
        self.searches += 1;

        let room_name = origin.room_name();

        if goal.room_name() != room_name {
            return PathfindingResult::failed();
        }

        let classifier = &self.classifier;
        let snapshot = self.snapshots.entry(room_name).or_insert_with(|| classifier.classify(room_name));

        let Some(snapshot) = snapshot.as_ref() else {
            return PathfindingResult::failed();
        };

        let goal_xy = goal.xy();

        let result = astar(
            &origin.xy(),
            |tile| {
                NEIGHBORS_8
                    .iter()
                    .filter_map(|(dx, dy)| tile.checked_add((*dx, *dy)))
                    .filter(|next| snapshot.is_passable(*next))
                    .map(|next| (next, snapshot.cost(next) as u32))
                    .collect::<Vec<_>>()
            },
            |tile| (tile.get_range_to(goal_xy) as u32).saturating_sub(range),
            |tile| tile.get_range_to(goal_xy) as u32 <= range,
        );

        match result {
            Some((tiles, _)) => PathfindingResult {
                path: tiles
                    .into_iter()
                    .skip(1)
                    .map(|tile| Position::new(tile.x, tile.y, room_name))
                    .collect(),
                incomplete: false,
            },
            None => PathfindingResult::failed(),
        }
    }
}
