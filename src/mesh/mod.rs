//! Per-room navigation mesh: border exits, interior regions and the tile distances between them.
//!
//! A mesh is built once per room (`MeshStore::generate_for_room`) and then consulted by the
//! cross-room router, which searches the much smaller graph of exits instead of individual tiles.

pub mod distances;
pub mod exits;
pub mod regions;
pub mod store;
pub mod system;

use itertools::Itertools;
use screeps::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use self::store::*;
pub use self::system::*;

pub const EXIT_SIDE_STRIDE: u8 = 20;
pub const EXIT_ID_SPACE: u8 = EXIT_SIDE_STRIDE * 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExitSide {
    Top,
    Right,
    Bottom,
    Left,
}

impl ExitSide {
    pub const ALL: [ExitSide; 4] = [ExitSide::Top, ExitSide::Right, ExitSide::Bottom, ExitSide::Left];

    fn multiplier(self) -> u8 {
        match self {
            ExitSide::Top => 0,
            ExitSide::Right => 1,
            ExitSide::Bottom => 2,
            ExitSide::Left => 3,
        }
    }

    pub fn opposite(self) -> ExitSide {
        match self {
            ExitSide::Top => ExitSide::Bottom,
            ExitSide::Right => ExitSide::Left,
            ExitSide::Bottom => ExitSide::Top,
            ExitSide::Left => ExitSide::Right,
        }
    }
}

/// Identifies an exit group within a room. The side is encoded in the id, so the matching exit
/// of the neighboring room is found arithmetically (see `opposite`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ExitId(u8);

impl ExitId {
    pub fn new(side: ExitSide, ordinal: u8) -> Option<ExitId> {
        if ordinal < EXIT_SIDE_STRIDE {
            Some(ExitId(side.multiplier() * EXIT_SIDE_STRIDE + ordinal))
        } else {
            None
        }
    }

    pub fn from_raw(id: u8) -> Option<ExitId> {
        if id < EXIT_ID_SPACE {
            Some(ExitId(id))
        } else {
            None
        }
    }

    pub fn raw(self) -> u8 {
        self.0
    }

    pub fn side(self) -> ExitSide {
        ExitSide::ALL[(self.0 / EXIT_SIDE_STRIDE) as usize]
    }

    pub fn ordinal(self) -> u8 {
        self.0 % EXIT_SIDE_STRIDE
    }

    /// The id of the same exit as seen from the room across the border.
    pub fn opposite(self) -> ExitId {
        ExitId((self.0 + EXIT_ID_SPACE / 2) % EXIT_ID_SPACE)
    }
}

impl TryFrom<u8> for ExitId {
    type Error = String;

    fn try_from(id: u8) -> Result<ExitId, String> {
        ExitId::from_raw(id).ok_or_else(|| format!("Exit id out of range: {}", id))
    }
}

impl From<ExitId> for u8 {
    fn from(id: ExitId) -> u8 {
        id.0
    }
}

impl std::fmt::Display for ExitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    #[serde(rename = "i")]
    pub id: ExitId,
    #[serde(rename = "c")]
    pub center: RoomXY,
}

impl Exit {
    pub fn side(&self) -> ExitSide {
        self.id.side()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    #[serde(rename = "e")]
    pub exits: Vec<ExitId>,
    #[serde(rename = "c")]
    pub center: RoomXY,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PathTarget {
    #[serde(rename = "e")]
    Exit(ExitId),
    #[serde(rename = "c")]
    Center,
}

/// Tile distances between exits of the same region and from each exit to its region's center.
///
/// Pairs are recorded in one direction only; `distance` checks both.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathTable(BTreeMap<ExitId, BTreeMap<PathTarget, u32>>);

impl PathTable {
    pub fn new() -> PathTable {
        PathTable::default()
    }

    pub fn insert(&mut self, from: ExitId, to: PathTarget, distance: u32) {
        self.0.entry(from).or_default().insert(to, distance);
    }

    pub fn get(&self, from: ExitId, to: PathTarget) -> Option<u32> {
        self.0.get(&from).and_then(|targets| targets.get(&to)).copied()
    }

    pub fn contains(&self, from: ExitId, to: PathTarget) -> bool {
        self.get(from, to).is_some()
    }

    pub fn distance(&self, a: ExitId, b: ExitId) -> Option<u32> {
        self.get(a, PathTarget::Exit(b)).or_else(|| self.get(b, PathTarget::Exit(a)))
    }

    pub fn center_distance(&self, exit: ExitId) -> Option<u32> {
        self.get(exit, PathTarget::Center)
    }

    pub fn len(&self) -> usize {
        self.0.values().map(|targets| targets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExitId, PathTarget, u32)> + '_ {
        self.0
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |(to, distance)| (*from, *to, *distance)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMesh {
    #[serde(rename = "g")]
    pub generated_at: u32,
    #[serde(rename = "e")]
    pub exits: Vec<Exit>,
    #[serde(rename = "p")]
    pub path_table: PathTable,
    /// Absent when every exit is reachable from every other.
    #[serde(rename = "r")]
    pub regions: Option<Vec<Region>>,
}

impl RoomMesh {
    pub fn age(&self, tick: u32) -> u32 {
        tick.saturating_sub(self.generated_at)
    }

    pub fn exit(&self, id: ExitId) -> Option<&Exit> {
        self.exits.iter().find(|exit| exit.id == id)
    }

    pub fn exit_ids(&self) -> impl Iterator<Item = ExitId> + '_ {
        self.exits.iter().map(|exit| exit.id)
    }

    pub fn region_of(&self, exit: ExitId) -> Option<&Region> {
        self.regions
            .as_ref()
            .and_then(|regions| regions.iter().find(|region| region.exits.contains(&exit)))
    }

    /// Exits that share a region with `exit`, including `exit` itself.
    pub fn exits_reachable_from(&self, exit: ExitId) -> Vec<ExitId> {
        match &self.regions {
            Some(_) => self.region_of(exit).map(|region| region.exits.clone()).unwrap_or_default(),
            None => self.exit_ids().collect(),
        }
    }

    pub fn summary(&self) -> String {
        let regions = self
            .regions
            .as_ref()
            .map(|regions| regions.iter().map(|region| format!("[{}]", region.exits.iter().join(","))).join(" "))
            .unwrap_or_else(|| "single".to_owned());

        format!(
            "generated {} - exits: {} - regions: {} - distances: {}",
            self.generated_at,
            self.exits.iter().map(|exit| exit.id).join(","),
            regions,
            self.path_table.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_ids_encode_side_and_ordinal() {
        let id = ExitId::new(ExitSide::Bottom, 3).unwrap();

        assert_eq!(id.raw(), 43);
        assert_eq!(id.side(), ExitSide::Bottom);
        assert_eq!(id.ordinal(), 3);
        assert_eq!(ExitId::new(ExitSide::Left, EXIT_SIDE_STRIDE), None);
        assert_eq!(ExitId::from_raw(80), None);
    }

    #[test]
    fn stored_exit_ids_are_range_checked() {
        let id: ExitId = serde_json::from_str("43").unwrap();

        assert_eq!(id, ExitId::new(ExitSide::Bottom, 3).unwrap());
        assert_eq!(serde_json::to_string(&id).unwrap(), "43");
        assert!(serde_json::from_str::<ExitId>("80").is_err());
        assert!(serde_json::from_str::<Exit>(r#"{ "i": 200, "c": { "x": 0, "y": 10 } }"#).is_err());
    }

    #[test]
    fn opposite_is_an_involution() {
        for raw in 0..EXIT_ID_SPACE {
            let id = ExitId::from_raw(raw).unwrap();

            assert_eq!(id.opposite().opposite(), id);
            assert_eq!(id.opposite().side(), id.side().opposite());
            assert_eq!(id.opposite().ordinal(), id.ordinal());
        }
    }

    #[test]
    fn path_table_lookup_checks_both_directions() {
        let a = ExitId::new(ExitSide::Top, 0).unwrap();
        let b = ExitId::new(ExitSide::Left, 1).unwrap();
        let c = ExitId::new(ExitSide::Right, 0).unwrap();

        let mut table = PathTable::new();
        table.insert(a, PathTarget::Exit(b), 17);
        table.insert(a, PathTarget::Center, 9);

        assert_eq!(table.distance(a, b), Some(17));
        assert_eq!(table.distance(b, a), Some(17));
        assert_eq!(table.distance(a, c), None);
        assert_eq!(table.center_distance(a), Some(9));
        assert_eq!(table.center_distance(b), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn single_region_meshes_connect_every_exit() {
        let top = ExitId::new(ExitSide::Top, 0).unwrap();
        let bottom = ExitId::new(ExitSide::Bottom, 0).unwrap();
        let center = RoomXY::checked_new(25, 25).unwrap();

        let mut mesh = RoomMesh {
            generated_at: 5,
            exits: vec![Exit { id: top, center }, Exit { id: bottom, center }],
            path_table: PathTable::new(),
            regions: None,
        };

        assert_eq!(mesh.exits_reachable_from(top), vec![top, bottom]);
        assert_eq!(mesh.age(20), 15);
        assert_eq!(mesh.age(1), 0);

        mesh.regions = Some(vec![
            Region { exits: vec![top], center },
            Region { exits: vec![bottom], center },
        ]);

        assert_eq!(mesh.exits_reachable_from(top), vec![top]);
        assert!(mesh.summary().contains("[0] [40]"));
    }
}
