use super::regions::*;
use super::*;
use crate::room::terrain::*;
use log::*;

fn border_tile(side: ExitSide, index: u8) -> Option<RoomXY> {
    let max = ROOM_SIZE - 1;

    match side {
        ExitSide::Top => xy(index, 0),
        ExitSide::Right => xy(max, index),
        ExitSide::Bottom => xy(index, max),
        ExitSide::Left => xy(0, index),
    }
}

/// Non-corner border tiles of a side, in scan order. Opposite sides scan in the same direction so
/// that ordinals line up across a room border.
pub fn border_tiles(side: ExitSide) -> impl Iterator<Item = RoomXY> {
    (1..ROOM_SIZE - 1).filter_map(move |index| border_tile(side, index))
}

fn is_exit_tile(snapshot: &RoomTerrainSnapshot, tile: RoomXY, soft_block_cost: u8) -> bool {
    !snapshot.is_soft_blocked(tile, soft_block_cost)
}

fn runs(snapshot: &RoomTerrainSnapshot, side: ExitSide, soft_block_cost: u8) -> Vec<Vec<RoomXY>> {
    let mut runs = Vec::new();
    let mut current: Vec<RoomXY> = Vec::new();

    for tile in border_tiles(side) {
        if is_exit_tile(snapshot, tile, soft_block_cost) {
            current.push(tile);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

/// Find the exit groups of a room and mark their tiles in `annotations`.
pub fn detect_exits(snapshot: &RoomTerrainSnapshot, soft_block_cost: u8, annotations: &mut AnnotationGrid) -> Vec<Exit> {
    let mut exits = Vec::new();

    for side in ExitSide::ALL.iter() {
        let side_runs = runs(snapshot, *side, soft_block_cost);

        if side_runs.len() > EXIT_SIDE_STRIDE as usize {
            warn!(
                "Room side {:?} has {} exit runs, only the first {} are tracked",
                side,
                side_runs.len(),
                EXIT_SIDE_STRIDE
            );
        }

        for (ordinal, run) in side_runs.iter().enumerate() {
            let Some(id) = ExitId::new(*side, ordinal as u8) else {
                break;
            };

            for tile in run.iter() {
                annotations.set(*tile, Annotation::Exit(id));
            }

            exits.push(Exit {
                id,
                center: run[(run.len() - 1) / 2],
            });
        }
    }

    exits
}
