//! Campaign state views: the read-only picture handed to the host and to
//! the mission export step after each command.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::{CallSign, FlightGroupTask, Loadout, Waypoint};
use crate::enums::*;
use crate::types::{EntityId, Position};

/// Complete campaign state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignStateView {
    pub active: bool,
    pub name: String,
    pub scenario: Option<String>,
    pub timer: f64,
    pub paused: bool,
    pub multiplier: f64,
    pub winner: Option<Coalition>,
    pub hardcore: Hardcore,
    pub next_day: bool,
    pub mission_id: Option<String>,
    pub selected_flight_group: Option<EntityId>,
    pub ai_skill: AiSkill,
    pub round: u32,
    pub blue_faction: Option<FactionView>,
    pub red_faction: Option<FactionView>,
    /// Objectives keyed by name.
    pub objectives: BTreeMap<String, ObjectiveView>,
}

impl CampaignStateView {
    pub fn faction(&self, coalition: Coalition) -> Option<&FactionView> {
        match coalition {
            Coalition::Blue => self.blue_faction.as_ref(),
            Coalition::Red => self.red_faction.as_ref(),
            Coalition::Neutral => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionView {
    pub name: String,
    pub coalition: Coalition,
    pub country_name: String,
    pub awacs_frequency: f64,
    pub deployment_score: f64,
    pub repair_score: f64,
    pub reinforcement_timer: f64,
    pub inventory: InventoryView,
    pub home_bases: Vec<HomeBaseView>,
    pub packages: Vec<PackageView>,
    pub ground_groups: Vec<GroundGroupView>,
    pub sams: Vec<SamView>,
    pub downed_pilots: Vec<DownedPilotView>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryView {
    pub aircrafts: BTreeMap<EntityId, AircraftView>,
    pub ground_units: BTreeMap<EntityId, GroundUnitView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftView {
    pub id: EntityId,
    pub aircraft_type: String,
    pub display_name: String,
    pub home_base_id: EntityId,
    pub home_base_name: String,
    pub state: AircraftState,
    pub flight_group_id: Option<EntityId>,
    pub call_sign: Option<CallSign>,
    pub name: Option<String>,
    pub onboard_number: u32,
    pub is_client: bool,
    pub loadout: Option<Loadout>,
    /// Remaining air-to-air rounds by weapon name.
    pub a2a_weapons: BTreeMap<String, u32>,
    pub a2a_range: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundUnitView {
    pub id: EntityId,
    pub name: String,
    pub unit_type: String,
    pub category: GroundUnitCategory,
    pub group_id: EntityId,
    pub alive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeBaseView {
    pub id: EntityId,
    pub name: String,
    pub kind: EntityType,
    pub position: Position,
    pub aircraft_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageView {
    pub id: EntityId,
    pub task: Task,
    pub start_time: f64,
    pub end_time: f64,
    pub task_end_time: f64,
    pub frequency: f64,
    pub cruise_speed: f64,
    pub flight_groups: Vec<FlightGroupView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightGroupView {
    pub id: EntityId,
    pub name: String,
    pub task: FlightGroupTask,
    pub state: FlightGroupState,
    pub home_base_id: EntityId,
    pub home_base_name: String,
    pub start_time: f64,
    pub time_on_target: f64,
    pub task_end_time: f64,
    pub landing_time: f64,
    pub aircraft_ids: Vec<EntityId>,
    pub waypoints: Vec<Waypoint>,
    pub has_client: bool,
    pub losses: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundGroupView {
    pub id: EntityId,
    pub name: String,
    pub group_type: GroundGroupType,
    pub state: GroundGroupState,
    pub position: Position,
    pub start_objective: String,
    pub target_objective: String,
    pub alive_units: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamView {
    pub id: EntityId,
    pub name: String,
    pub position: Position,
    pub range: f64,
    pub operational: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownedPilotView {
    pub id: EntityId,
    pub name: String,
    pub position: Position,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureView {
    pub id: EntityId,
    pub name: String,
    pub kind: EntityType,
    pub structure_type: StructureType,
    pub position: Position,
    pub alive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveView {
    pub id: EntityId,
    pub name: String,
    pub coalition: Coalition,
    pub position: Position,
    pub deployment_timer: f64,
    pub deployment_delay: f64,
    pub structures: Vec<StructureView>,
    pub incoming_ground_groups: BTreeMap<Coalition, EntityId>,
}
