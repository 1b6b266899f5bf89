//! Enumeration types used throughout the campaign.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Side an entity belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Coalition {
    Blue,
    Red,
    Neutral,
}

impl Coalition {
    pub const ALL: [Coalition; 3] = [Coalition::Blue, Coalition::Red, Coalition::Neutral];

    /// The two sides that field forces.
    pub const COMBATANTS: [Coalition; 2] = [Coalition::Blue, Coalition::Red];

    /// Opposing side. Neutral has no opponent and maps to itself.
    pub fn opposite(self) -> Coalition {
        match self {
            Coalition::Blue => Coalition::Red,
            Coalition::Red => Coalition::Blue,
            Coalition::Neutral => Coalition::Neutral,
        }
    }
}

impl fmt::Display for Coalition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Coalition::Blue => "blue",
            Coalition::Red => "red",
            Coalition::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

/// Air task a package or flight group performs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Task {
    #[serde(rename = "AWACS")]
    Awacs,
    #[serde(rename = "CAP")]
    Cap,
    #[serde(rename = "Escort")]
    Escort,
    #[serde(rename = "Pinpoint Strike")]
    Strike,
    #[serde(rename = "CAS")]
    Cas,
    #[serde(rename = "SEAD")]
    Sead,
    #[serde(rename = "DEAD")]
    Dead,
    #[serde(rename = "CSAR")]
    Csar,
    #[serde(rename = "Air Assault")]
    AirAssault,
}

impl Task {
    pub const ALL: [Task; 9] = [
        Task::Awacs,
        Task::Cap,
        Task::Escort,
        Task::Strike,
        Task::Cas,
        Task::Sead,
        Task::Dead,
        Task::Csar,
        Task::AirAssault,
    ];

    /// Tasks the planner opens packages for on its own.
    /// Escort and SEAD only ever join an existing package.
    pub const PLANNED: [Task; 7] = [
        Task::Awacs,
        Task::Cap,
        Task::Cas,
        Task::Strike,
        Task::Dead,
        Task::Csar,
        Task::AirAssault,
    ];

    /// Name used for loadouts, call sign pools and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Awacs => "AWACS",
            Task::Cap => "CAP",
            Task::Escort => "Escort",
            Task::Strike => "Pinpoint Strike",
            Task::Cas => "CAS",
            Task::Sead => "SEAD",
            Task::Dead => "DEAD",
            Task::Csar => "CSAR",
            Task::AirAssault => "Air Assault",
        }
    }

    /// Tasks flown by rotary-wing aircraft.
    pub fn is_helicopter_task(&self) -> bool {
        matches!(self, Task::Csar | Task::AirAssault)
    }

    /// Tasks that attach to an existing flight group instead of opening a package.
    pub fn is_support_task(&self) -> bool {
        matches!(self, Task::Escort | Task::Sead)
    }

    /// Tasks whose new packages get Escort and SEAD flights attached.
    pub fn is_escorted(&self) -> bool {
        matches!(self, Task::Strike | Task::Cas)
    }

    /// Tasks that keep flying at night.
    pub fn flies_at_night(&self) -> bool {
        matches!(self, Task::Awacs | Task::Cap)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminator of every entity kind the registry holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum EntityType {
    Aircraft,
    Airdrome,
    Farp,
    Carrier,
    FlightGroup,
    GroundGroup,
    GroundUnit,
    Objective,
    Package,
    Building,
    UnitCamp,
    #[serde(rename = "SAM")]
    Sam,
    DownedPilot,
}

impl EntityType {
    pub const HOME_BASES: [EntityType; 3] =
        [EntityType::Airdrome, EntityType::Farp, EntityType::Carrier];

    pub const STRUCTURES: [EntityType; 2] = [EntityType::Building, EntityType::UnitCamp];

    pub fn is_home_base(&self) -> bool {
        Self::HOME_BASES.contains(self)
    }

    pub fn is_structure(&self) -> bool {
        Self::STRUCTURES.contains(self)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Named, per-coalition index over the registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum QueryKey {
    #[serde(rename = "aircrafts")]
    Aircraft,
    #[serde(rename = "aircrafts-idle")]
    AircraftIdle,
    #[serde(rename = "aircrafts-in use")]
    AircraftInUse,
    #[serde(rename = "groundUnits")]
    GroundUnits,
    #[serde(rename = "groundGroups")]
    GroundGroups,
    #[serde(rename = "groundGroups-en route")]
    GroundGroupsEnRoute,
    #[serde(rename = "groundGroups-on target")]
    GroundGroupsOnTarget,
    #[serde(rename = "flightGroups")]
    FlightGroups,
    #[serde(rename = "packages")]
    Packages,
    #[serde(rename = "objectives")]
    Objectives,
    #[serde(rename = "buildings")]
    Buildings,
    #[serde(rename = "unitCamps")]
    UnitCamps,
    #[serde(rename = "SAMs")]
    Sams,
    #[serde(rename = "downedPilots")]
    DownedPilots,
    #[serde(rename = "airdromes")]
    Airdromes,
    #[serde(rename = "farps")]
    Farps,
    #[serde(rename = "carriers")]
    Carriers,
}

impl QueryKey {
    pub const ALL: [QueryKey; 17] = [
        QueryKey::Aircraft,
        QueryKey::AircraftIdle,
        QueryKey::AircraftInUse,
        QueryKey::GroundUnits,
        QueryKey::GroundGroups,
        QueryKey::GroundGroupsEnRoute,
        QueryKey::GroundGroupsOnTarget,
        QueryKey::FlightGroups,
        QueryKey::Packages,
        QueryKey::Objectives,
        QueryKey::Buildings,
        QueryKey::UnitCamps,
        QueryKey::Sams,
        QueryKey::DownedPilots,
        QueryKey::Airdromes,
        QueryKey::Farps,
        QueryKey::Carriers,
    ];
}

/// Where a ground group is relative to its objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroundGroupState {
    /// Holding an objective its coalition owns.
    #[serde(rename = "on objective")]
    OnObjective,
    /// Moving from its start objective to its target objective.
    #[serde(rename = "en route")]
    EnRoute,
    /// Arrived at a target objective that is not yet resolved.
    #[serde(rename = "on target")]
    OnTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroundGroupType {
    Armor,
    Infantry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroundUnitCategory {
    #[serde(rename = "armor")]
    Armor,
    #[serde(rename = "infantry")]
    Infantry,
    #[serde(rename = "air defence")]
    AirDefence,
}

/// Derived lifecycle state of a flight group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlightGroupState {
    /// Waiting for its start time.
    Planned,
    /// In the air, not yet at its time on target.
    Airborne,
    /// Executing its task.
    OnTask,
    /// Task finished, flying home.
    Returning,
    /// Back on the ground.
    Landed,
    /// Every aircraft of the group was destroyed.
    Lost,
}

/// Derived availability state of an aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AircraftState {
    Idle,
    Tasked,
    Returning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaypointKind {
    TakeOff,
    Nav,
    Task,
    Landing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureType {
    #[serde(rename = "Ammo Depot")]
    AmmoDepot,
    #[serde(rename = "Farp")]
    Farp,
    #[serde(rename = "Command Center")]
    CommandCenter,
    #[serde(rename = "Power Plant")]
    PowerPlant,
    #[serde(rename = "Fuel Storage")]
    FuelStorage,
    #[serde(rename = "Hospital")]
    Hospital,
    #[serde(rename = "Prison")]
    Prison,
    #[serde(rename = "Barrack")]
    Barrack,
    #[serde(rename = "Depot")]
    Depot,
}

impl StructureType {
    /// Structures that can deploy ground groups.
    pub fn is_unit_camp(&self) -> bool {
        matches!(self, StructureType::Barrack | StructureType::Depot)
    }
}

/// Kind of a strike target declared for an objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrikeTargetKind {
    Structure,
    Vehicle,
    #[serde(rename = "SAM")]
    Sam,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum AiSkill {
    Average,
    #[default]
    Good,
    High,
    Excellent,
}

/// Hardcore mode: losing a client aircraft ends the campaign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hardcore {
    #[default]
    Disabled,
    Enabled,
    /// A client was killed while hardcore was enabled.
    Killed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LauncherKind {
    Weapon,
    Pod,
    #[serde(rename = "Fuel Tank")]
    FuelTank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    #[serde(rename = "infrared")]
    Infrared,
    #[serde(rename = "semi-active radar")]
    SemiActiveRadar,
    #[serde(rename = "active radar")]
    ActiveRadar,
    #[serde(rename = "unguided bomb")]
    UnguidedBomb,
    #[serde(rename = "guided bomb")]
    GuidedBomb,
    #[serde(rename = "rocket")]
    Rocket,
    #[serde(rename = "anti-radiation")]
    AntiRadiation,
    #[serde(rename = "air-to-ground missile")]
    AirToGroundMissile,
}

impl WeaponKind {
    pub fn is_air_to_air(&self) -> bool {
        matches!(
            self,
            WeaponKind::Infrared | WeaponKind::SemiActiveRadar | WeaponKind::ActiveRadar
        )
    }
}
