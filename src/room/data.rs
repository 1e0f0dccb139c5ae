use crate::features::RoutingFeatures;
use screeps::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoomDisposition {
    #[default]
    #[serde(rename = "n")]
    Neutral,
    #[serde(rename = "m")]
    Mine,
    #[serde(rename = "f")]
    Friendly(String),
    #[serde(rename = "h")]
    Hostile(String),
}

impl Display for RoomDisposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomDisposition::Neutral => write!(f, "Neutral"),
            RoomDisposition::Mine => write!(f, "Mine"),
            RoomDisposition::Friendly(name) => write!(f, "Friendly: {}", name),
            RoomDisposition::Hostile(name) => write!(f, "Hostile: {}", name),
        }
    }
}

impl RoomDisposition {
    /// Classify the owner or reserver of a room relative to our own account.
    pub fn of_user(name: Option<String>, username: &str, friends: &[String]) -> RoomDisposition {
        match name {
            None => RoomDisposition::Neutral,
            Some(name) if name == username => RoomDisposition::Mine,
            Some(name) if friends.iter().any(|friend_name| *friend_name == name) => RoomDisposition::Friendly(name),
            Some(name) => RoomDisposition::Hostile(name),
        }
    }

    pub fn neutral(&self) -> bool {
        matches!(self, RoomDisposition::Neutral)
    }

    pub fn mine(&self) -> bool {
        matches!(self, RoomDisposition::Mine)
    }

    pub fn hostile(&self) -> bool {
        matches!(self, RoomDisposition::Hostile(_))
    }

    pub fn friendly(&self) -> bool {
        matches!(self, RoomDisposition::Friendly(_))
    }
}

/// What is known about a room's danger at the time of a route query.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomRisk {
    #[serde(rename = "o")]
    pub owner: RoomDisposition,
    #[serde(rename = "r")]
    pub reservation: RoomDisposition,
    /// Guarded structures such as source keeper lairs.
    #[serde(rename = "h")]
    pub hazardous: bool,
}

impl RoomRisk {
    pub fn hostile_owner(name: &str) -> RoomRisk {
        RoomRisk {
            owner: RoomDisposition::Hostile(name.to_owned()),
            ..Default::default()
        }
    }

    pub fn hostile_reservation(name: &str) -> RoomRisk {
        RoomRisk {
            reservation: RoomDisposition::Hostile(name.to_owned()),
            ..Default::default()
        }
    }

    pub fn hazard() -> RoomRisk {
        RoomRisk {
            hazardous: true,
            ..Default::default()
        }
    }

    /// Cost multiplier for crossing the room, or `None` if the room must not be entered.
    pub fn multiplier(&self, allow_danger: bool, features: &RoutingFeatures) -> Option<f64> {
        if self.owner.hostile() {
            if allow_danger {
                Some(features.hostile_owner_multiplier)
            } else {
                None
            }
        } else if self.reservation.hostile() {
            Some(features.hostile_reservation_multiplier)
        } else if self.hazardous {
            Some(features.hazard_multiplier)
        } else {
            Some(1.0)
        }
    }
}

pub trait RoomRiskClassifier {
    fn classify(&self, room_name: RoomName) -> RoomRisk;
}

/// Fixed risk table. Rooms without an entry are neutral.
#[derive(Clone, Debug, Default)]
pub struct StaticRisk {
    rooms: HashMap<RoomName, RoomRisk>,
}

impl StaticRisk {
    pub fn new() -> StaticRisk {
        StaticRisk::default()
    }

    pub fn with(mut self, room_name: RoomName, risk: RoomRisk) -> StaticRisk {
        self.set(room_name, risk);
        self
    }

    pub fn set(&mut self, room_name: RoomName, risk: RoomRisk) {
        self.rooms.insert(room_name, risk);
    }
}

impl RoomRiskClassifier for StaticRisk {
    fn classify(&self, room_name: RoomName) -> RoomRisk {
        self.rooms.get(&room_name).cloned().unwrap_or_default()
    }
}
