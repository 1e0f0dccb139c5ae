use super::*;
use crate::pathing::pathfinder::*;
use log::*;
use std::collections::HashSet;

fn distance_between(pathfinder: &mut dyn RoomPathfinder, room_name: RoomName, from: RoomXY, to: RoomXY) -> Option<u32> {
    let result = pathfinder.search(
        Position::new(from.x, from.y, room_name),
        Position::new(to.x, to.y, room_name),
        0,
    );

    if result.incomplete {
        None
    } else {
        Some(result.path.len() as u32)
    }
}

/// Measure every exit's distance to its region center and to each other exit of the same region.
///
/// Each unordered pair of exits is searched once. Pairs the pathfinder cannot connect are left
/// out of the table.
pub fn build_path_table(
    room_name: RoomName,
    exits: &[Exit],
    regions: &[Region],
    pathfinder: &mut dyn RoomPathfinder,
) -> PathTable {
    let mut table = PathTable::new();
    let mut searched: HashSet<(ExitId, ExitId)> = HashSet::new();

    let center_of = |id: ExitId| exits.iter().find(|exit| exit.id == id).map(|exit| exit.center);

    for region in regions.iter() {
        for exit_id in region.exits.iter() {
            let Some(exit_center) = center_of(*exit_id) else {
                continue;
            };

            if let Some(distance) = distance_between(pathfinder, room_name, exit_center, region.center) {
                table.insert(*exit_id, PathTarget::Center, distance);
            }

            for other_id in region.exits.iter().filter(|other| *other != exit_id) {
                if searched.contains(&(*other_id, *exit_id)) {
                    continue;
                }

                searched.insert((*exit_id, *other_id));

                let Some(other_center) = center_of(*other_id) else {
                    continue;
                };

                match distance_between(pathfinder, room_name, exit_center, other_center) {
                    Some(distance) => table.insert(*exit_id, PathTarget::Exit(*other_id), distance),
                    None => trace!("No path between exits {} and {} in {}", exit_id, other_id, room_name),
                }
            }
        }
    }

    table
}
