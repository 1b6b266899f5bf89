//! Static reference data: airdromes, objectives, strike targets, aircraft,
//! launchers, weapons, factions and scenarios.
//!
//! The engine only ever reads these tables. The builtin store is embedded
//! as JSON; `DCC_DATA_STORE` may point at a replacement file.

use std::{
    collections::BTreeMap,
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{Loadout, Pylon};
use crate::enums::{LauncherKind, StrikeTargetKind, StructureType, Task, WeaponKind};
use crate::types::Position;

pub const BUILTIN_DATA_STORE: &str = include_str!("data/data_store.json");

pub const DATA_STORE_ENV: &str = "DCC_DATA_STORE";

/// Loadout key used when an aircraft has no loadout for its task.
pub const DEFAULT_LOADOUT: &str = "default";

#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("failed to parse data store: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read data store from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unknown faction '{0}'")]
    UnknownFaction(String),
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),
    #[error("data store defines no scenario")]
    NoScenario,
    #[error("unknown airdrome '{0}'")]
    UnknownAirdrome(String),
    #[error("unknown objective '{0}'")]
    UnknownObjective(String),
    #[error("unknown aircraft type '{0}'")]
    UnknownAircraft(String),
    #[error("aircraft '{aircraft}' has neither a '{task}' nor a default loadout")]
    MissingLoadout { aircraft: String, task: String },
    #[error("aircraft '{aircraft}' loadout '{loadout}' references unknown launcher '{clsid}'")]
    UnknownLauncher {
        aircraft: String,
        loadout: String,
        clsid: String,
    },
    #[error("launcher '{clsid}' references unknown weapon '{weapon}'")]
    UnknownWeapon { clsid: String, weapon: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirdromeDefinition {
    pub name: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveDefinition {
    pub name: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrikeTargetDefinition {
    pub name: String,
    pub kind: StrikeTargetKind,
    #[serde(default)]
    pub structure_type: Option<StructureType>,
    pub position: Position,
    /// Engagement range of a SAM target (m).
    #[serde(default)]
    pub range: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PylonDefinition {
    pub num: u32,
    pub clsid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadoutDefinition {
    /// Task name this loadout serves, or `"default"`.
    pub task: String,
    pub name: String,
    pub pylons: Vec<PylonDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AircraftDefinition {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub is_helicopter: bool,
    /// Radio band the aircraft can tune (MHz, inclusive).
    #[serde(default)]
    pub allowed_frequency: Option<[f64; 2]>,
    pub loadouts: Vec<LoadoutDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LauncherDefinition {
    pub kind: LauncherKind,
    #[serde(default)]
    pub weapon: Option<String>,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponDefinition {
    pub kind: WeaponKind,
    /// Effective range (m).
    pub range: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionDefinition {
    pub name: String,
    pub country_name: String,
    /// Aircraft types usable per task, preferred type first.
    pub aircraft_types: BTreeMap<Task, Vec<String>>,
    pub vehicles: Vec<String>,
    pub infantries: Vec<String>,
    pub shorad: Vec<String>,
}

impl FactionDefinition {
    pub fn aircraft_types_for(&self, task: Task) -> &[String] {
        self.aircraft_types
            .get(&task)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Aircraft type generated to fill a task's inventory.
    pub fn primary_aircraft_type(&self, task: Task) -> Option<&str> {
        self.aircraft_types_for(task).first().map(|s| s.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseDefinition {
    pub name: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierDefinition {
    pub name: String,
    pub position: Position,
    /// Aircraft types based on the carrier instead of an airdrome.
    pub aircraft_types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioSide {
    pub airdrome_names: Vec<String>,
    pub objective_names: Vec<String>,
    pub farps: Vec<BaseDefinition>,
    pub carriers: Vec<CarrierDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDefinition {
    pub name: String,
    pub blue: ScenarioSide,
    pub red: ScenarioSide,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataStore {
    pub airdromes: BTreeMap<String, AirdromeDefinition>,
    pub objectives: BTreeMap<String, ObjectiveDefinition>,
    /// Strike targets keyed by objective name.
    pub strike_targets: BTreeMap<String, Vec<StrikeTargetDefinition>>,
    pub aircraft: BTreeMap<String, AircraftDefinition>,
    /// Launchers keyed by CLSID.
    pub launchers: BTreeMap<String, LauncherDefinition>,
    pub weapons: BTreeMap<String, WeaponDefinition>,
    pub factions: Vec<FactionDefinition>,
    pub scenarios: Vec<ScenarioDefinition>,
}

impl DataStore {
    pub fn builtin() -> Result<Self, DataStoreError> {
        Self::from_json_str(BUILTIN_DATA_STORE)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DataStoreError> {
        let store: DataStore = serde_json::from_str(json)?;
        store.validate()?;
        Ok(store)
    }

    pub fn from_file(path: &Path) -> Result<Self, DataStoreError> {
        let contents = fs::read_to_string(path).map_err(|source| DataStoreError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Cross-table consistency checks that do not depend on a campaign.
    ///
    /// Loadouts are resolved lazily so a broken loadout only fails the
    /// package that needs it.
    pub fn validate(&self) -> Result<(), DataStoreError> {
        for (clsid, launcher) in &self.launchers {
            if let Some(weapon) = &launcher.weapon {
                if !self.weapons.contains_key(weapon) {
                    return Err(DataStoreError::UnknownWeapon {
                        clsid: clsid.clone(),
                        weapon: weapon.clone(),
                    });
                }
            }
        }
        for objective in self.strike_targets.keys() {
            if !self.objectives.contains_key(objective) {
                return Err(DataStoreError::UnknownObjective(objective.clone()));
            }
        }
        Ok(())
    }

    pub fn faction(&self, name: &str) -> Result<&FactionDefinition, DataStoreError> {
        self.factions
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| DataStoreError::UnknownFaction(name.to_string()))
    }

    /// Scenario by name, or the first one when no name is given.
    pub fn scenario(&self, name: Option<&str>) -> Result<&ScenarioDefinition, DataStoreError> {
        match name {
            Some(name) => self
                .scenarios
                .iter()
                .find(|s| s.name == name)
                .ok_or_else(|| DataStoreError::UnknownScenario(name.to_string())),
            None => self.scenarios.first().ok_or(DataStoreError::NoScenario),
        }
    }

    pub fn airdrome(&self, name: &str) -> Result<&AirdromeDefinition, DataStoreError> {
        self.airdromes
            .get(name)
            .ok_or_else(|| DataStoreError::UnknownAirdrome(name.to_string()))
    }

    pub fn aircraft(&self, aircraft_type: &str) -> Result<&AircraftDefinition, DataStoreError> {
        self.aircraft
            .get(aircraft_type)
            .ok_or_else(|| DataStoreError::UnknownAircraft(aircraft_type.to_string()))
    }

    pub fn strike_targets_of(&self, objective: &str) -> &[StrikeTargetDefinition] {
        self.strike_targets
            .get(objective)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve the loadout an aircraft type carries for `task`.
    ///
    /// Falls back to the `"default"` loadout. Every pylon must resolve to a
    /// known launcher.
    pub fn resolve_loadout(&self, aircraft_type: &str, task: Task) -> Result<Loadout, DataStoreError> {
        let definition = self.aircraft(aircraft_type)?;
        let loadout = definition
            .loadouts
            .iter()
            .find(|l| l.task == task.as_str())
            .or_else(|| definition.loadouts.iter().find(|l| l.task == DEFAULT_LOADOUT))
            .ok_or_else(|| DataStoreError::MissingLoadout {
                aircraft: aircraft_type.to_string(),
                task: task.as_str().to_string(),
            })?;

        let mut pylons = Vec::with_capacity(loadout.pylons.len());
        for pylon in &loadout.pylons {
            let launcher =
                self.launchers
                    .get(&pylon.clsid)
                    .ok_or_else(|| DataStoreError::UnknownLauncher {
                        aircraft: aircraft_type.to_string(),
                        loadout: loadout.name.clone(),
                        clsid: pylon.clsid.clone(),
                    })?;
            let weapon = launcher
                .weapon
                .as_ref()
                .and_then(|name| self.weapons.get(name));
            pylons.push(Pylon {
                num: pylon.num,
                clsid: pylon.clsid.clone(),
                launcher_kind: launcher.kind,
                weapon: launcher.weapon.clone(),
                weapon_kind: weapon.map(|w| w.kind),
                range: weapon.map(|w| w.range).unwrap_or(0.0),
                count: launcher.total,
                total: launcher.total,
            });
        }

        Ok(Loadout {
            name: loadout.name.clone(),
            task: loadout.task.clone(),
            pylons,
        })
    }

    /// Radio band of an aircraft type, if it declares one.
    pub fn frequency_range(&self, aircraft_type: &str) -> Option<(f64, f64)> {
        self.aircraft
            .get(aircraft_type)
            .and_then(|a| a.allowed_frequency)
            .map(|[min, max]| (min, max))
    }

    pub fn is_helicopter(&self, aircraft_type: &str) -> bool {
        self.aircraft
            .get(aircraft_type)
            .map(|a| a.is_helicopter)
            .unwrap_or(false)
    }
}

/// Load the data store from `DCC_DATA_STORE` when set, else the builtin.
pub fn load_data_store_from_env() -> Result<DataStore, DataStoreError> {
    if let Some(path) = env::var(DATA_STORE_ENV).ok().map(PathBuf::from) {
        match DataStore::from_file(&path) {
            Ok(store) => {
                tracing::info!(
                    target: "dcc::data",
                    path = %path.display(),
                    factions = store.factions.len(),
                    scenarios = store.scenarios.len(),
                    "data_store.loaded=file"
                );
                return Ok(store);
            }
            Err(err) => {
                tracing::warn!(
                    target: "dcc::data",
                    path = %path.display(),
                    error = %err,
                    "data_store.load_failed"
                );
            }
        }
    }

    let store = DataStore::builtin()?;
    tracing::info!(
        target: "dcc::data",
        factions = store.factions.len(),
        scenarios = store.scenarios.len(),
        "data_store.loaded=builtin"
    );
    Ok(store)
}
