use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshFeatures {
    /// Minimum age in ticks before a room mesh is regenerated.
    pub staleness_interval: u32,
    /// Tiles with a cost above this are walls as far as exits and regions are concerned.
    pub soft_block_cost: u8,
    /// How far to look for a region tile when the bounding box midpoint falls outside the region.
    pub center_search_radius: u8,
    pub max_generations_per_tick: u32,
}

impl Default for MeshFeatures {
    fn default() -> Self {
        MeshFeatures {
            staleness_interval: 10_000,
            soft_block_cost: 50,
            center_search_radius: 10,
            max_generations_per_tick: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingFeatures {
    /// Distance assumed from a start exit to its region center when none was recorded.
    pub fallback_exit_distance: u32,
    /// Estimated cost of crossing one room, used by the search heuristic.
    pub room_heuristic_cost: u32,
    pub hostile_owner_multiplier: f64,
    pub hostile_reservation_multiplier: f64,
    pub hazard_multiplier: f64,
    /// Players whose rooms are treated as friendly rather than hostile.
    pub friends: Vec<String>,
}

impl Default for RoutingFeatures {
    fn default() -> Self {
        RoutingFeatures {
            fallback_exit_distance: 50,
            room_heuristic_cost: 50,
            hostile_owner_multiplier: 5.0,
            hostile_reservation_multiplier: 1.5,
            hazard_multiplier: 2.0,
            friends: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    pub mesh: MeshFeatures,
    pub routing: RoutingFeatures,
}

pub fn load(data: &str) -> Result<Features, String> {
    serde_json::from_str(data).map_err(|e| e.to_string())
}
