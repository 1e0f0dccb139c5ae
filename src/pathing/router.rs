use super::pathfinder::*;
use crate::features::RoutingFeatures;
use crate::mesh::*;
use crate::room::data::*;
use crate::room::utility::*;
use log::*;
use screeps::*;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RouteOptions {
    /// Branches whose accumulated cost exceeds this are abandoned.
    pub max_path_length: Option<u32>,
    /// Permit crossing rooms owned by hostile players, at a cost.
    pub allow_danger: bool,
}

impl RouteOptions {
    pub fn max_path_length(mut self, max_path_length: u32) -> Self {
        self.max_path_length = Some(max_path_length);
        self
    }

    pub fn allow_danger(mut self, allow_danger: bool) -> Self {
        self.allow_danger = allow_danger;
        self
    }
}

/// Outcome of a route search. The path is the sequence of exit centers to walk through, ending at
/// the exit by which the destination room is entered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteResult {
    pub path: Vec<Position>,
    pub incomplete: bool,
    pub cost: f64,
    /// Rooms the search wanted to expand into but had no mesh for.
    pub missing_rooms: Vec<RoomName>,
}

impl RouteResult {
    fn failed(missing_rooms: Vec<RoomName>) -> RouteResult {
        RouteResult {
            path: Vec::new(),
            incomplete: true,
            cost: 0.0,
            missing_rooms,
        }
    }
}

struct SearchNode {
    room_name: RoomName,
    exit: ExitId,
    position: Position,
    accumulated: f64,
    parent: Option<usize>,
}

struct OpenEntry {
    priority: f64,
    sequence: usize,
    node: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// BinaryHeap pops the greatest entry: lowest priority first, then earliest pushed.
impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

struct Search<'s> {
    nodes: Vec<SearchNode>,
    open: BinaryHeap<OpenEntry>,
    open_keys: HashSet<(RoomName, ExitId)>,
    closed: HashSet<(RoomName, ExitId)>,
    missing_rooms: Vec<RoomName>,
    max_cost: Option<f64>,
    features: &'s RoutingFeatures,
    end_room: RoomName,
}

impl<'s> Search<'s> {
    fn heuristic(&self, room_name: RoomName) -> f64 {
        let rooms_between = linear_distance(room_name, self.end_room).saturating_sub(1);

        (rooms_between * self.features.room_heuristic_cost) as f64
    }

    fn is_known(&self, key: &(RoomName, ExitId)) -> bool {
        self.open_keys.contains(key) || self.closed.contains(key)
    }

    fn missing(&mut self, room_name: RoomName) {
        if !self.missing_rooms.contains(&room_name) {
            self.missing_rooms.push(room_name);
        }
    }

    fn push(&mut self, node: SearchNode, heuristic: f64) {
        if let Some(max_cost) = self.max_cost {
            if node.accumulated > max_cost {
                trace!(
                    "Abandoning branch at exit {} of {} - cost {} exceeds {}",
                    node.exit,
                    node.room_name,
                    node.accumulated,
                    max_cost
                );
                return;
            }
        }

        let index = self.nodes.len();

        self.open_keys.insert((node.room_name, node.exit));
        self.open.push(OpenEntry {
            priority: node.accumulated + heuristic,
            sequence: index,
            node: index,
        });
        self.nodes.push(node);
    }

    fn reconstruct(&self, index: usize) -> Vec<Position> {
        let mut path = Vec::new();
        let mut cursor = Some(index);

        while let Some(current) = cursor {
            let node = &self.nodes[current];

            path.push(node.position);
            cursor = node.parent;
        }

        path.reverse();

        path
    }
}

fn exit_position(mesh: &RoomMesh, room_name: RoomName, exit: ExitId) -> Option<Position> {
    mesh.exit(exit)
        .map(|exit| Position::new(exit.center.x, exit.center.y, room_name))
}

/// Best-first search over the exit graph formed by the stored room meshes.
pub struct CrossRoomRouter<'a> {
    store: &'a MeshStore,
    risk: &'a dyn RoomRiskClassifier,
    features: &'a RoutingFeatures,
}

#[cfg_attr(feature = "profile", screeps_timing_annotate::timing)]
impl<'a> CrossRoomRouter<'a> {
    pub fn new(store: &'a MeshStore, risk: &'a dyn RoomRiskClassifier, features: &'a RoutingFeatures) -> CrossRoomRouter<'a> {
        CrossRoomRouter { store, risk, features }
    }

    /// Exits the start position can walk to, paired with the distance from each to its region's
    /// center.
    fn start_exits(&self, mesh: &RoomMesh, start: Position, pathfinder: &mut dyn RoomPathfinder) -> Vec<(ExitId, f64)> {
        let room_name = start.room_name();

        let exits: Vec<ExitId> = match &mesh.regions {
            None => mesh.exit_ids().collect(),
            Some(regions) => regions
                .iter()
                .filter(|region| !region.exits.is_empty())
                .filter(|region| {
                    let center = Position::new(region.center.x, region.center.y, room_name);

                    pathfinder.search(start, center, 0).complete()
                })
                .flat_map(|region| region.exits.iter().copied())
                .collect(),
        };

        exits
            .into_iter()
            .map(|exit| {
                let distance = mesh
                    .path_table
                    .center_distance(exit)
                    .unwrap_or(self.features.fallback_exit_distance);

                (exit, distance as f64)
            })
            .collect()
    }

    pub fn find_path(
        &self,
        start: Position,
        end: Position,
        options: &RouteOptions,
        pathfinder: &mut dyn RoomPathfinder,
    ) -> RouteResult {
        let start_room = start.room_name();
        let end_room = end.room_name();

        let Some(start_mesh) = self.store.get(start_room) else {
            debug!("No mesh for start room {}, unable to route to {}", start_room, end_room);
            return RouteResult::failed(vec![start_room]);
        };

        if start_room == end_room {
            debug!("Route from {} to {} stays within {}, routing via an exit", start, end, start_room);
        }

        let mut search = Search {
            nodes: Vec::new(),
            open: BinaryHeap::new(),
            open_keys: HashSet::new(),
            closed: HashSet::new(),
            missing_rooms: Vec::new(),
            max_cost: options.max_path_length.map(|max| max as f64),
            features: self.features,
            end_room,
        };

        let start_heuristic = search.heuristic(start_room);

        for (exit, distance) in self.start_exits(start_mesh, start, pathfinder) {
            let Some(position) = exit_position(start_mesh, start_room, exit) else {
                continue;
            };

            search.push(
                SearchNode {
                    room_name: start_room,
                    exit,
                    position,
                    accumulated: distance,
                    parent: None,
                },
                start_heuristic,
            );
        }

        while let Some(entry) = search.open.pop() {
            let (room_name, exit, accumulated) = {
                let node = &search.nodes[entry.node];
                (node.room_name, node.exit, node.accumulated)
            };

            search.open_keys.remove(&(room_name, exit));
            search.closed.insert((room_name, exit));

            if room_name == end_room {
                let path = search.reconstruct(entry.node);

                debug!(
                    "Route from {} to {} found - waypoints: {} - cost: {} - nodes: {}",
                    start,
                    end,
                    path.len(),
                    accumulated,
                    search.nodes.len()
                );

                return RouteResult {
                    path,
                    incomplete: false,
                    cost: accumulated,
                    missing_rooms: search.missing_rooms,
                };
            }

            let Some(next_room) = neighbor(room_name, exit.side()) else {
                continue;
            };

            let multiplier = match self.risk.classify(next_room).multiplier(options.allow_danger, self.features) {
                Some(multiplier) => multiplier,
                None => {
                    trace!("Refusing to enter hostile room {}", next_room);
                    continue;
                }
            };

            let Some(next_mesh) = self.store.get(next_room) else {
                trace!("No mesh for room {}", next_room);
                search.missing(next_room);
                continue;
            };

            let entry_exit = exit.opposite();

            let Some(entry_position) = exit_position(next_mesh, next_room, entry_exit) else {
                trace!("Room {} has no exit {} matching exit {} of {}", next_room, entry_exit, exit, room_name);
                continue;
            };

            trace!("Expanding exit {} of {} into {} (x{})", exit, room_name, next_room, multiplier);

            if next_room == end_room {
                if search.is_known(&(next_room, entry_exit)) {
                    continue;
                }

                let distance = next_mesh
                    .path_table
                    .center_distance(entry_exit)
                    .unwrap_or(self.features.fallback_exit_distance);

                search.push(
                    SearchNode {
                        room_name: next_room,
                        exit: entry_exit,
                        position: entry_position,
                        accumulated: accumulated + multiplier * distance as f64,
                        parent: Some(entry.node),
                    },
                    0.0,
                );

                continue;
            }

            let heuristic = search.heuristic(next_room);

            for next_exit in next_mesh.exits_reachable_from(entry_exit) {
                if next_exit == entry_exit || search.is_known(&(next_room, next_exit)) {
                    continue;
                }

                let Some(distance) = next_mesh.path_table.distance(entry_exit, next_exit) else {
                    continue;
                };

                let Some(position) = exit_position(next_mesh, next_room, next_exit) else {
                    continue;
                };

                search.push(
                    SearchNode {
                        room_name: next_room,
                        exit: next_exit,
                        position,
                        accumulated: accumulated + multiplier * distance as f64,
                        parent: Some(entry.node),
                    },
                    heuristic,
                );
            }
        }

        debug!(
            "No route from {} to {} - nodes: {} - missing meshes: {}",
            start,
            end,
            search.nodes.len(),
            search.missing_rooms.len()
        );

        RouteResult::failed(search.missing_rooms)
    }
}
