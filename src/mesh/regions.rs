use super::*;
use crate::room::terrain::*;
use itertools::iproduct;
use std::collections::BTreeSet;

pub static NEIGHBORS_8: [(i8, i8); 8] = [(-1, -1), (-1, 0), (-1, 1), (0, 1), (1, 1), (1, 0), (1, -1), (0, -1)];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Annotation {
    Open,
    Blocked,
    Exit(ExitId),
    Region(u16),
}

/// Scratch buffer that labels each tile of a room while its mesh is being built.
#[derive(Clone, Debug)]
pub struct AnnotationGrid {
    cells: Vec<Annotation>,
}

impl AnnotationGrid {
    /// Border tiles start out blocked; exit detection marks the ones that lead out of the room.
    pub fn new(snapshot: &RoomTerrainSnapshot, soft_block_cost: u8) -> AnnotationGrid {
        let cells = iproduct!(0..ROOM_SIZE, 0..ROOM_SIZE)
            .map(|(y, x)| {
                let Some(tile) = xy(x, y) else {
                    return Annotation::Blocked;
                };

                if tile.is_room_edge() || snapshot.is_soft_blocked(tile, soft_block_cost) {
                    Annotation::Blocked
                } else {
                    Annotation::Open
                }
            })
            .collect();

        AnnotationGrid { cells }
    }

    pub fn get(&self, xy: RoomXY) -> Annotation {
        self.cells[tile_index(xy)]
    }

    pub fn set(&mut self, xy: RoomXY, annotation: Annotation) {
        self.cells[tile_index(xy)] = annotation;
    }

    pub fn region_of(&self, xy: RoomXY) -> Option<u16> {
        match self.get(xy) {
            Annotation::Region(index) => Some(index),
            _ => None,
        }
    }

    fn tiles_of_exit(&self, id: ExitId) -> impl Iterator<Item = RoomXY> + '_ {
        iproduct!(0..ROOM_SIZE, 0..ROOM_SIZE)
            .filter_map(|(y, x)| xy(x, y))
            .filter(move |tile| tile.is_room_edge() && self.get(*tile) == Annotation::Exit(id))
    }
}

struct FloodFill {
    index: u16,
    first: Option<RoomXY>,
    min: (u8, u8),
    max: (u8, u8),
    exits: BTreeSet<ExitId>,
}

impl FloodFill {
    fn new(index: u16) -> FloodFill {
        FloodFill {
            index,
            first: None,
            min: (u8::MAX, u8::MAX),
            max: (0, 0),
            exits: BTreeSet::new(),
        }
    }

    fn visit(&mut self, annotations: &mut AnnotationGrid, tile: RoomXY) {
        annotations.set(tile, Annotation::Region(self.index));

        self.first.get_or_insert(tile);

        let (x, y) = (tile.x.u8(), tile.y.u8());

        self.min = (self.min.0.min(x), self.min.1.min(y));
        self.max = (self.max.0.max(x), self.max.1.max(y));
    }

    fn run(&mut self, annotations: &mut AnnotationGrid, seeds: &[RoomXY]) {
        let mut stack = Vec::with_capacity(64);

        for seed in seeds {
            if annotations.get(*seed) == Annotation::Open {
                self.visit(annotations, *seed);
                stack.push(*seed);
            }
        }

        while let Some(tile) = stack.pop() {
            for (dx, dy) in NEIGHBORS_8.iter() {
                let Some(next) = tile.checked_add((*dx, *dy)) else {
                    continue;
                };

                match annotations.get(next) {
                    Annotation::Open => {
                        self.visit(annotations, next);
                        stack.push(next);
                    }
                    Annotation::Exit(id) => {
                        self.exits.insert(id);
                    }
                    Annotation::Blocked | Annotation::Region(_) => {}
                }
            }
        }
    }

    fn center(&self, annotations: &AnnotationGrid, search_radius: u8, fallback: RoomXY) -> RoomXY {
        let Some(first) = self.first else {
            return fallback;
        };

        let in_region = |tile: RoomXY| annotations.get(tile) == Annotation::Region(self.index);

        let midpoint = xy(
            self.min.0 + (self.max.0 - self.min.0) / 2,
            self.min.1 + (self.max.1 - self.min.1) / 2,
        );

        let Some(midpoint) = midpoint else {
            return first;
        };

        if in_region(midpoint) {
            return midpoint;
        }

        for radius in 1..=search_radius as i8 {
            for (dy, dx) in iproduct!(-radius..=radius, -radius..=radius) {
                if dx.abs() != radius && dy.abs() != radius {
                    continue;
                }

                if let Some(tile) = midpoint.checked_add((dx, dy)) {
                    if in_region(tile) {
                        return tile;
                    }
                }
            }
        }

        first
    }
}

/// Split the room into regions by flood filling from each exit not yet claimed by an earlier
/// region, then from any open tile no exit can reach.
///
/// An exit belongs to the first region whose fill touches it, even when its border run also
/// opens onto later regions.
pub fn partition_regions(annotations: &mut AnnotationGrid, exits: &[Exit], center_search_radius: u8) -> Vec<Region> {
    let mut regions: Vec<Region> = Vec::new();
    let mut touched: BTreeSet<ExitId> = BTreeSet::new();

    for exit in exits.iter() {
        if touched.contains(&exit.id) {
            continue;
        }

        let seeds: Vec<RoomXY> = annotations
            .tiles_of_exit(exit.id)
            .flat_map(|tile| NEIGHBORS_8.iter().filter_map(move |(dx, dy)| tile.checked_add((*dx, *dy))))
            .collect();

        let mut fill = FloodFill::new(regions.len() as u16);
        fill.exits.insert(exit.id);
        fill.run(annotations, &seeds);
        fill.exits.retain(|id| *id == exit.id || !touched.contains(id));

        touched.extend(fill.exits.iter().copied());

        regions.push(Region {
            center: fill.center(annotations, center_search_radius, exit.center),
            exits: fill.exits.into_iter().collect(),
        });
    }

    for (y, x) in iproduct!(1..ROOM_SIZE - 1, 1..ROOM_SIZE - 1) {
        let Some(tile) = xy(x, y) else {
            continue;
        };

        if annotations.get(tile) != Annotation::Open {
            continue;
        }

        let mut fill = FloodFill::new(regions.len() as u16);
        fill.run(annotations, &[tile]);
        fill.exits.retain(|id| !touched.contains(id));

        touched.extend(fill.exits.iter().copied());

        regions.push(Region {
            center: fill.center(annotations, center_search_radius, tile),
            exits: fill.exits.into_iter().collect(),
        });
    }

    regions
}
