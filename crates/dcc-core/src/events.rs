//! Mission outcome reports consumed by the engine and campaign events it emits.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{EntityId, Position};

/// Pilot that ejected during the flown mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DownedPilotReport {
    pub aircraft_id: EntityId,
    pub coalition: Coalition,
    pub name: String,
    pub position: Position,
    pub time: f64,
}

/// Outcome of a flown mission as reported by the game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MissionState {
    #[serde(default)]
    pub mission_id: Option<String>,
    /// Mission time at the end of the flight (campaign timer seconds).
    pub time: f64,
    #[serde(default)]
    pub killed_aircrafts: Vec<EntityId>,
    #[serde(default)]
    pub killed_ground_units: Vec<EntityId>,
    #[serde(default)]
    pub destroyed_structures: Vec<EntityId>,
    #[serde(default)]
    pub destroyed_sams: Vec<EntityId>,
    #[serde(default)]
    pub downed_pilots: Vec<DownedPilotReport>,
}

/// Notable campaign changes, drained by the host after each command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CampaignEvent {
    PackageCreated {
        package_id: EntityId,
        coalition: Coalition,
        task: Task,
    },
    PackageCompleted {
        package_id: EntityId,
        coalition: Coalition,
        task: Task,
        losses: u32,
    },
    GroundGroupDeployed {
        group_id: EntityId,
        coalition: Coalition,
        target_objective: String,
    },
    ObjectiveCaptured {
        objective: String,
        coalition: Coalition,
    },
    PilotRescued {
        pilot: String,
        coalition: Coalition,
    },
    StructureRepaired {
        structure: String,
        coalition: Coalition,
    },
    Reinforced {
        coalition: Coalition,
        aircraft: u32,
    },
    CampaignWon {
        winner: Coalition,
    },
}
