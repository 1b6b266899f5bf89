//! Entity components stored in the campaign registry.
//!
//! Every registry entity carries an [`EntityMeta`] plus exactly one of the
//! record components below. Records are plain data: all relations between
//! entities are held as [`EntityId`]s and resolved through the registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{
    Coalition, EntityType, GroundGroupState, GroundGroupType, GroundUnitCategory,
    LauncherKind, QueryKey, StructureType, Task, WaypointKind, WeaponKind,
};
use crate::types::{EntityId, Position};

/// Common header of every entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    pub id: EntityId,
    pub coalition: Coalition,
    pub entity_type: EntityType,
}

// --- Aircraft ---

/// Radio call sign of a single aircraft: `Name-group-unit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CallSign {
    pub name: String,
    pub group: u32,
    pub unit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Pylon {
    pub num: u32,
    pub clsid: String,
    pub launcher_kind: LauncherKind,
    pub weapon: Option<String>,
    pub weapon_kind: Option<WeaponKind>,
    /// Effective range of the carried weapon in meters, 0 when unknown.
    pub range: f64,
    /// Rounds remaining.
    pub count: u32,
    pub total: u32,
}

/// Stores fitted to an aircraft for one flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Loadout {
    pub name: String,
    /// Loadout key it was resolved from: a task name or `"default"`.
    pub task: String,
    pub pylons: Vec<Pylon>,
}

impl Loadout {
    /// Pylons carrying air-to-air weapons.
    pub fn a2a_pylons(&self) -> impl Iterator<Item = &Pylon> {
        self.pylons
            .iter()
            .filter(|p| p.weapon_kind.map(|k| k.is_air_to_air()).unwrap_or(false))
    }

    /// Remaining air-to-air rounds aggregated by weapon name.
    pub fn a2a_weapons(&self) -> BTreeMap<String, u32> {
        let mut weapons = BTreeMap::new();
        for pylon in self.a2a_pylons() {
            if let Some(name) = &pylon.weapon {
                *weapons.entry(name.clone()).or_insert(0) += pylon.count;
            }
        }
        weapons
    }

    /// Longest range among air-to-air weapons with rounds left, 0 when unarmed.
    pub fn a2a_range(&self) -> f64 {
        self.a2a_pylons()
            .filter(|p| p.count > 0)
            .map(|p| p.range)
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Aircraft {
    pub aircraft_type: String,
    pub home_base_id: EntityId,
    pub flight_group_id: Option<EntityId>,
    pub call_sign: Option<CallSign>,
    pub name: Option<String>,
    pub onboard_number: u32,
    pub is_client: bool,
    pub loadout: Option<Loadout>,
    pub alive: bool,
}

// --- Bases and objectives ---

/// Airdrome, FARP or carrier. The kind lives in [`EntityMeta::entity_type`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HomeBase {
    pub name: String,
    pub position: Position,
    pub aircraft_ids: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Objective {
    pub name: String,
    pub position: Position,
    /// Timer value the objective last deployed a ground group (or was captured).
    pub deployment_timer: f64,
    /// Seconds between deployments.
    pub deployment_delay: f64,
    pub structure_ids: Vec<EntityId>,
    pub sam_ids: Vec<EntityId>,
    /// Ground group each coalition currently sends toward this objective.
    pub incoming_ground_groups: BTreeMap<Coalition, EntityId>,
}

/// Building or unit camp. The kind lives in [`EntityMeta::entity_type`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Structure {
    pub name: String,
    pub structure_type: StructureType,
    pub position: Position,
    pub objective_id: EntityId,
    pub alive: bool,
    pub destroyed_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SamSite {
    pub name: String,
    pub position: Position,
    pub objective_id: EntityId,
    /// Engagement range in meters.
    pub range: f64,
    pub operational: bool,
    pub destroyed_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DownedPilot {
    pub name: String,
    pub position: Position,
    /// Timer value the pilot ejected.
    pub time: f64,
    pub aircraft_type: String,
}

// --- Ground war ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroundUnit {
    pub name: String,
    pub unit_type: String,
    pub category: GroundUnitCategory,
    pub group_id: EntityId,
    pub alive: bool,
    pub destroyed_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroundGroup {
    pub name: String,
    pub group_type: GroundGroupType,
    pub start_objective_id: EntityId,
    pub target_objective_id: EntityId,
    pub position: Position,
    pub state: GroundGroupState,
    pub unit_ids: Vec<EntityId>,
    pub shorad_unit_ids: Vec<EntityId>,
    pub start_time: f64,
}

impl GroundGroup {
    pub fn all_unit_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.unit_ids.iter().chain(self.shorad_unit_ids.iter()).copied()
    }
}

// --- Air tasking ---

/// Two-point holding pattern flown while on station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Racetrack {
    pub start: Position,
    pub end: Position,
}

/// Task of a flight group together with its target.
///
/// A target is cleared when the targeted entity leaves the registry while
/// the flight group is still planned or airborne.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum FlightGroupTask {
    #[serde(rename = "AWACS")]
    Awacs { racetrack: Racetrack },
    #[serde(rename = "CAP")]
    Cap { racetrack: Racetrack },
    /// Protects another flight group of the same package.
    #[serde(rename = "Escort")]
    Escort { target: Option<EntityId> },
    /// Attacks a building or unit camp.
    #[serde(rename = "Pinpoint Strike")]
    Strike { target: Option<EntityId> },
    /// Attacks an enemy ground group sitting on an objective.
    #[serde(rename = "CAS")]
    Cas { target: Option<EntityId> },
    /// Suppresses air defences along another flight group's route.
    #[serde(rename = "SEAD")]
    Sead { target: Option<EntityId> },
    /// Destroys a SAM site.
    #[serde(rename = "DEAD")]
    Dead { target: Option<EntityId> },
    /// Recovers a downed pilot.
    #[serde(rename = "CSAR")]
    Csar { target: Option<EntityId> },
    /// Lands infantry on an objective.
    #[serde(rename = "Air Assault")]
    AirAssault { target: Option<EntityId> },
}

impl FlightGroupTask {
    pub fn task(&self) -> Task {
        match self {
            FlightGroupTask::Awacs { .. } => Task::Awacs,
            FlightGroupTask::Cap { .. } => Task::Cap,
            FlightGroupTask::Escort { .. } => Task::Escort,
            FlightGroupTask::Strike { .. } => Task::Strike,
            FlightGroupTask::Cas { .. } => Task::Cas,
            FlightGroupTask::Sead { .. } => Task::Sead,
            FlightGroupTask::Dead { .. } => Task::Dead,
            FlightGroupTask::Csar { .. } => Task::Csar,
            FlightGroupTask::AirAssault { .. } => Task::AirAssault,
        }
    }

    /// Entity the task is aimed at, if any.
    pub fn target_id(&self) -> Option<EntityId> {
        match self {
            FlightGroupTask::Awacs { .. } | FlightGroupTask::Cap { .. } => None,
            FlightGroupTask::Escort { target }
            | FlightGroupTask::Strike { target }
            | FlightGroupTask::Cas { target }
            | FlightGroupTask::Sead { target }
            | FlightGroupTask::Dead { target }
            | FlightGroupTask::Csar { target }
            | FlightGroupTask::AirAssault { target } => *target,
        }
    }

    pub fn clear_target(&mut self) {
        match self {
            FlightGroupTask::Awacs { .. } | FlightGroupTask::Cap { .. } => {}
            FlightGroupTask::Escort { target }
            | FlightGroupTask::Strike { target }
            | FlightGroupTask::Cas { target }
            | FlightGroupTask::Sead { target }
            | FlightGroupTask::Dead { target }
            | FlightGroupTask::Csar { target }
            | FlightGroupTask::AirAssault { target } => *target = None,
        }
    }

    /// Racetrack flown on station, for AWACS and CAP.
    pub fn racetrack(&self) -> Option<&Racetrack> {
        match self {
            FlightGroupTask::Awacs { racetrack } | FlightGroupTask::Cap { racetrack } => {
                Some(racetrack)
            }
            _ => None,
        }
    }

    /// Entity types the target reference must resolve to.
    pub fn target_types(&self) -> &'static [EntityType] {
        match self {
            FlightGroupTask::Awacs { .. } | FlightGroupTask::Cap { .. } => &[],
            FlightGroupTask::Escort { .. } | FlightGroupTask::Sead { .. } => {
                &[EntityType::FlightGroup]
            }
            FlightGroupTask::Strike { .. } => &EntityType::STRUCTURES,
            FlightGroupTask::Cas { .. } => &[EntityType::GroundGroup],
            FlightGroupTask::Dead { .. } => &[EntityType::Sam],
            FlightGroupTask::Csar { .. } => &[EntityType::DownedPilot],
            FlightGroupTask::AirAssault { .. } => &[EntityType::Objective],
        }
    }
}

/// One leg of a flight plan: fly from `position` to `end_position`
/// between `time` and `end_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Waypoint {
    pub name: String,
    pub kind: WaypointKind,
    pub position: Position,
    pub end_position: Position,
    pub time: f64,
    pub end_time: f64,
    pub speed: f64,
    pub on_ground: bool,
    /// First waypoint of the task; its `time` is the time on target.
    pub task_start: bool,
    /// On-station leg flown as a racetrack until `end_time`.
    pub racetrack: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FlightGroup {
    pub name: String,
    pub call_sign: String,
    pub flight_number: u32,
    pub task: FlightGroupTask,
    pub package_id: EntityId,
    pub home_base_id: EntityId,
    pub aircraft_ids: Vec<EntityId>,
    pub waypoints: Vec<Waypoint>,
    pub start_time: f64,
    pub time_on_target: f64,
    pub task_end_time: f64,
    pub landing_time: f64,
    pub cruise_speed: f64,
    /// Aircraft of the group destroyed so far.
    pub losses: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Package {
    pub task: Task,
    pub flight_group_ids: Vec<EntityId>,
    pub start_time: f64,
    pub end_time: f64,
    pub task_end_time: f64,
    /// Package radio frequency (MHz).
    pub frequency: f64,
    pub cruise_speed: f64,
}

// --- Records ---

/// Reference from one entity to another, checked on snapshot restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub field: &'static str,
    pub id: EntityId,
    pub expected: &'static [EntityType],
}

impl Reference {
    fn new(field: &'static str, id: EntityId, expected: &'static [EntityType]) -> Self {
        Self { field, id, expected }
    }
}

/// Owned copy of any entity's record, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityRecord {
    Aircraft(Aircraft),
    Airdrome(HomeBase),
    Farp(HomeBase),
    Carrier(HomeBase),
    FlightGroup(FlightGroup),
    GroundGroup(GroundGroup),
    GroundUnit(GroundUnit),
    Objective(Objective),
    Package(Package),
    Building(Structure),
    UnitCamp(Structure),
    Sam(SamSite),
    DownedPilot(DownedPilot),
}

impl EntityRecord {
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityRecord::Aircraft(_) => EntityType::Aircraft,
            EntityRecord::Airdrome(_) => EntityType::Airdrome,
            EntityRecord::Farp(_) => EntityType::Farp,
            EntityRecord::Carrier(_) => EntityType::Carrier,
            EntityRecord::FlightGroup(_) => EntityType::FlightGroup,
            EntityRecord::GroundGroup(_) => EntityType::GroundGroup,
            EntityRecord::GroundUnit(_) => EntityType::GroundUnit,
            EntityRecord::Objective(_) => EntityType::Objective,
            EntityRecord::Package(_) => EntityType::Package,
            EntityRecord::Building(_) => EntityType::Building,
            EntityRecord::UnitCamp(_) => EntityType::UnitCamp,
            EntityRecord::Sam(_) => EntityType::Sam,
            EntityRecord::DownedPilot(_) => EntityType::DownedPilot,
        }
    }

    /// Queries the entity must belong to, derived from its state alone.
    pub fn queries(&self) -> Vec<QueryKey> {
        match self {
            EntityRecord::Aircraft(a) if !a.alive => vec![],
            EntityRecord::Aircraft(a) if a.flight_group_id.is_some() => {
                vec![QueryKey::Aircraft, QueryKey::AircraftInUse]
            }
            EntityRecord::Aircraft(_) => vec![QueryKey::Aircraft, QueryKey::AircraftIdle],
            EntityRecord::Airdrome(_) => vec![QueryKey::Airdromes],
            EntityRecord::Farp(_) => vec![QueryKey::Farps],
            EntityRecord::Carrier(_) => vec![QueryKey::Carriers],
            EntityRecord::FlightGroup(_) => vec![QueryKey::FlightGroups],
            EntityRecord::GroundGroup(g) => match g.state {
                GroundGroupState::EnRoute => {
                    vec![QueryKey::GroundGroups, QueryKey::GroundGroupsEnRoute]
                }
                GroundGroupState::OnTarget | GroundGroupState::OnObjective => {
                    vec![QueryKey::GroundGroups, QueryKey::GroundGroupsOnTarget]
                }
            },
            EntityRecord::GroundUnit(u) if u.alive => vec![QueryKey::GroundUnits],
            EntityRecord::GroundUnit(_) => vec![],
            EntityRecord::Objective(_) => vec![QueryKey::Objectives],
            EntityRecord::Package(_) => vec![QueryKey::Packages],
            EntityRecord::Building(_) => vec![QueryKey::Buildings],
            EntityRecord::UnitCamp(_) => vec![QueryKey::UnitCamps],
            EntityRecord::Sam(_) => vec![QueryKey::Sams],
            EntityRecord::DownedPilot(_) => vec![QueryKey::DownedPilots],
        }
    }

    /// Every id this record points at.
    pub fn references(&self) -> Vec<Reference> {
        let mut refs = Vec::new();
        match self {
            EntityRecord::Aircraft(a) => {
                refs.push(Reference::new(
                    "homeBaseId",
                    a.home_base_id,
                    &EntityType::HOME_BASES,
                ));
                if let Some(fg) = a.flight_group_id {
                    refs.push(Reference::new("flightGroupId", fg, &[EntityType::FlightGroup]));
                }
            }
            EntityRecord::Airdrome(b) | EntityRecord::Farp(b) | EntityRecord::Carrier(b) => {
                for id in &b.aircraft_ids {
                    refs.push(Reference::new("aircraftIds", *id, &[EntityType::Aircraft]));
                }
            }
            EntityRecord::FlightGroup(fg) => {
                refs.push(Reference::new("packageId", fg.package_id, &[EntityType::Package]));
                refs.push(Reference::new(
                    "homeBaseId",
                    fg.home_base_id,
                    &EntityType::HOME_BASES,
                ));
                for id in &fg.aircraft_ids {
                    refs.push(Reference::new("aircraftIds", *id, &[EntityType::Aircraft]));
                }
                if let Some(target) = fg.task.target_id() {
                    refs.push(Reference::new("task", target, fg.task.target_types()));
                }
            }
            EntityRecord::GroundGroup(g) => {
                refs.push(Reference::new(
                    "startObjectiveId",
                    g.start_objective_id,
                    &[EntityType::Objective],
                ));
                refs.push(Reference::new(
                    "targetObjectiveId",
                    g.target_objective_id,
                    &[EntityType::Objective],
                ));
                for id in g.all_unit_ids() {
                    refs.push(Reference::new("unitIds", id, &[EntityType::GroundUnit]));
                }
            }
            EntityRecord::GroundUnit(u) => {
                refs.push(Reference::new("groupId", u.group_id, &[EntityType::GroundGroup]));
            }
            EntityRecord::Objective(o) => {
                for id in &o.structure_ids {
                    refs.push(Reference::new("structureIds", *id, &EntityType::STRUCTURES));
                }
                for id in &o.sam_ids {
                    refs.push(Reference::new("samIds", *id, &[EntityType::Sam]));
                }
                for id in o.incoming_ground_groups.values() {
                    refs.push(Reference::new(
                        "incomingGroundGroups",
                        *id,
                        &[EntityType::GroundGroup],
                    ));
                }
            }
            EntityRecord::Package(p) => {
                for id in &p.flight_group_ids {
                    refs.push(Reference::new(
                        "flightGroupIds",
                        *id,
                        &[EntityType::FlightGroup],
                    ));
                }
            }
            EntityRecord::Building(s) | EntityRecord::UnitCamp(s) => {
                refs.push(Reference::new("objectiveId", s.objective_id, &[EntityType::Objective]));
            }
            EntityRecord::Sam(s) => {
                refs.push(Reference::new("objectiveId", s.objective_id, &[EntityType::Objective]));
            }
            EntityRecord::DownedPilot(_) => {}
        }
        refs
    }

    /// Map position of the entity, where it has one.
    pub fn position(&self) -> Option<Position> {
        match self {
            EntityRecord::Airdrome(b) | EntityRecord::Farp(b) | EntityRecord::Carrier(b) => {
                Some(b.position)
            }
            EntityRecord::GroundGroup(g) => Some(g.position),
            EntityRecord::Objective(o) => Some(o.position),
            EntityRecord::Building(s) | EntityRecord::UnitCamp(s) => Some(s.position),
            EntityRecord::Sam(s) => Some(s.position),
            EntityRecord::DownedPilot(p) => Some(p.position),
            _ => None,
        }
    }

    /// Encode the record body as a JSON object (without header fields).
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            EntityRecord::Aircraft(r) => serde_json::to_value(r),
            EntityRecord::Airdrome(r) | EntityRecord::Farp(r) | EntityRecord::Carrier(r) => {
                serde_json::to_value(r)
            }
            EntityRecord::FlightGroup(r) => serde_json::to_value(r),
            EntityRecord::GroundGroup(r) => serde_json::to_value(r),
            EntityRecord::GroundUnit(r) => serde_json::to_value(r),
            EntityRecord::Objective(r) => serde_json::to_value(r),
            EntityRecord::Package(r) => serde_json::to_value(r),
            EntityRecord::Building(r) | EntityRecord::UnitCamp(r) => serde_json::to_value(r),
            EntityRecord::Sam(r) => serde_json::to_value(r),
            EntityRecord::DownedPilot(r) => serde_json::to_value(r),
        }
    }

    /// Decode a record body of the given kind.
    pub fn from_value(
        entity_type: EntityType,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match entity_type {
            EntityType::Aircraft => EntityRecord::Aircraft(serde_json::from_value(value)?),
            EntityType::Airdrome => EntityRecord::Airdrome(serde_json::from_value(value)?),
            EntityType::Farp => EntityRecord::Farp(serde_json::from_value(value)?),
            EntityType::Carrier => EntityRecord::Carrier(serde_json::from_value(value)?),
            EntityType::FlightGroup => EntityRecord::FlightGroup(serde_json::from_value(value)?),
            EntityType::GroundGroup => EntityRecord::GroundGroup(serde_json::from_value(value)?),
            EntityType::GroundUnit => EntityRecord::GroundUnit(serde_json::from_value(value)?),
            EntityType::Objective => EntityRecord::Objective(serde_json::from_value(value)?),
            EntityType::Package => EntityRecord::Package(serde_json::from_value(value)?),
            EntityType::Building => EntityRecord::Building(serde_json::from_value(value)?),
            EntityType::UnitCamp => EntityRecord::UnitCamp(serde_json::from_value(value)?),
            EntityType::Sam => EntityRecord::Sam(serde_json::from_value(value)?),
            EntityType::DownedPilot => EntityRecord::DownedPilot(serde_json::from_value(value)?),
        })
    }
}
