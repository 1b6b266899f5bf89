//! Tunable campaign configuration.
//!
//! The builtin values ship embedded as JSON; `DCC_CAMPAIGN_CONFIG` may
//! point at a replacement file.

use std::{
    collections::BTreeMap,
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::{Coalition, StructureType, Task};

pub const BUILTIN_CAMPAIGN_CONFIG: &str = include_str!("data/campaign_config.json");

pub const CAMPAIGN_CONFIG_ENV: &str = "DCC_CAMPAIGN_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse campaign config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read campaign config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Per-coalition value pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerCoalition<T> {
    pub blue: T,
    pub red: T,
}

impl<T: Copy + Default> PerCoalition<T> {
    pub fn new(blue: T, red: T) -> Self {
        Self { blue, red }
    }

    /// Value for a coalition; neutral gets the type's default.
    pub fn get(&self, coalition: Coalition) -> T {
        match coalition {
            Coalition::Blue => self.blue,
            Coalition::Red => self.red,
            Coalition::Neutral => T::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NightConfig {
    pub start_hour: f64,
    pub end_hour: f64,
}

impl Default for NightConfig {
    fn default() -> Self {
        Self {
            start_hour: 20.0,
            end_hour: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructurePenalties {
    pub power: f64,
    pub ammo: f64,
    pub fuel: f64,
}

impl Default for StructurePenalties {
    fn default() -> Self {
        Self {
            power: 0.3,
            ammo: 0.2,
            fuel: 0.2,
        }
    }
}

impl StructurePenalties {
    /// Penalty weight of losing a structure of this type, 0 for untracked types.
    pub fn weight(&self, structure_type: StructureType) -> f64 {
        match structure_type {
            StructureType::PowerPlant => self.power,
            StructureType::AmmoDepot => self.ammo,
            StructureType::FuelStorage => self.fuel,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Score gained per simulated hour at full health, before the coalition multiplier.
    pub base: f64,
    pub penalty: StructurePenalties,
    pub coalition_multiplier: PerCoalition<f64>,
    /// Score spent per deployed ground group.
    pub cost: f64,
    /// Reach of a barrack when picking a deployment target (m).
    pub frontline_barrack: f64,
    /// Reach of a depot when picking a deployment target (m).
    pub frontline_depot: f64,
    /// Upper bound on concurrently en-route ground groups per coalition.
    pub max_en_route: u32,
    /// Minutes between two deployments from the same objective.
    pub delay_minutes: PerCoalition<f64>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            base: 12.0,
            penalty: StructurePenalties::default(),
            coalition_multiplier: PerCoalition::new(0.75, 5.0),
            cost: 10.0,
            frontline_barrack: 60_000.0,
            frontline_depot: 50_000.0,
            max_en_route: 6,
            delay_minutes: PerCoalition::new(30.0, 60.0),
        }
    }
}

impl DeploymentConfig {
    /// Reach of a unit camp of the given type; 0 for non-camps.
    pub fn frontline_range(&self, structure_type: StructureType) -> f64 {
        match structure_type {
            StructureType::Barrack => self.frontline_barrack,
            StructureType::Depot => self.frontline_depot,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Repair score consumed by one structure repair.
    pub threshold: f64,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self { threshold: 100_000.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReinforcementConfig {
    pub delay_minutes: f64,
}

impl Default for ReinforcementConfig {
    fn default() -> Self {
        Self { delay_minutes: 30.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnStationConfig {
    pub awacs_minutes: f64,
    pub cap_minutes: f64,
    pub cas_minutes: f64,
}

impl Default for OnStationConfig {
    fn default() -> Self {
        Self {
            awacs_minutes: 120.0,
            cap_minutes: 60.0,
            cas_minutes: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    /// Target aircraft count per role.
    pub inventory: BTreeMap<Task, u32>,
    /// Number of live packages the planner keeps per task.
    pub packages: BTreeMap<Task, PerCoalition<u32>>,
    /// Maximum home-base-to-target distance per task (m).
    pub max_distance: BTreeMap<Task, f64>,
    /// Aircraft per flight group per task.
    pub flight_group_size: BTreeMap<Task, u32>,
    pub night: NightConfig,
    pub deployment: DeploymentConfig,
    pub repair: RepairConfig,
    pub reinforcement: ReinforcementConfig,
    pub on_station: OnStationConfig,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        let inventory = BTreeMap::from([
            (Task::Awacs, 3),
            (Task::Cap, 8),
            (Task::Escort, 4),
            (Task::Strike, 6),
            (Task::Cas, 4),
            (Task::Sead, 2),
            (Task::Dead, 4),
            (Task::Csar, 2),
            (Task::AirAssault, 2),
        ]);
        let packages = BTreeMap::from([
            (Task::Awacs, PerCoalition::new(1, 1)),
            (Task::Cap, PerCoalition::new(1, 1)),
            (Task::Strike, PerCoalition::new(4, 3)),
            (Task::Cas, PerCoalition::new(3, 2)),
            (Task::Dead, PerCoalition::new(2, 2)),
            (Task::Csar, PerCoalition::new(2, 2)),
            (Task::AirAssault, PerCoalition::new(1, 1)),
        ]);
        let max_distance = BTreeMap::from([
            (Task::Awacs, 300_000.0),
            (Task::Cap, 100_000.0),
            (Task::Escort, 150_000.0),
            (Task::Strike, 150_000.0),
            (Task::Cas, 100_000.0),
            (Task::Sead, 150_000.0),
            (Task::Dead, 150_000.0),
            (Task::Csar, 30_000.0),
            (Task::AirAssault, 50_000.0),
        ]);
        let flight_group_size = BTreeMap::from([
            (Task::Awacs, 1),
            (Task::Cap, 2),
            (Task::Escort, 2),
            (Task::Strike, 2),
            (Task::Cas, 2),
            (Task::Sead, 2),
            (Task::Dead, 2),
            (Task::Csar, 1),
            (Task::AirAssault, 2),
        ]);
        Self {
            inventory,
            packages,
            max_distance,
            flight_group_size,
            night: NightConfig::default(),
            deployment: DeploymentConfig::default(),
            repair: RepairConfig::default(),
            reinforcement: ReinforcementConfig::default(),
            on_station: OnStationConfig::default(),
        }
    }
}

impl CampaignConfig {
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json_str(BUILTIN_CAMPAIGN_CONFIG)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn inventory_target(&self, task: Task) -> u32 {
        self.inventory.get(&task).copied().unwrap_or(0)
    }

    pub fn package_quota(&self, task: Task, coalition: Coalition) -> u32 {
        self.packages
            .get(&task)
            .map(|q| q.get(coalition))
            .unwrap_or(0)
    }

    /// Distance ceiling for a task; helicopter tasks fall back to 50 km.
    pub fn max_distance(&self, task: Task) -> f64 {
        self.max_distance
            .get(&task)
            .copied()
            .unwrap_or(if task.is_helicopter_task() { 50_000.0 } else { 150_000.0 })
    }

    pub fn flight_group_size(&self, task: Task) -> u32 {
        self.flight_group_size.get(&task).copied().unwrap_or(2).max(1)
    }
}

/// Load the campaign config from `DCC_CAMPAIGN_CONFIG` when set, else the builtin.
pub fn load_campaign_config_from_env() -> Result<CampaignConfig, ConfigError> {
    if let Some(path) = env::var(CAMPAIGN_CONFIG_ENV).ok().map(PathBuf::from) {
        match CampaignConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "dcc::config",
                    path = %path.display(),
                    "campaign_config.loaded=file"
                );
                return Ok(config);
            }
            Err(err) => {
                tracing::warn!(
                    target: "dcc::config",
                    path = %path.display(),
                    error = %err,
                    "campaign_config.load_failed"
                );
            }
        }
    }

    let config = CampaignConfig::builtin()?;
    tracing::info!(target: "dcc::config", "campaign_config.loaded=builtin");
    Ok(config)
}
