//! Campaign-level state that lives beside the registry: the two factions
//! and the clock, pause and outcome flags.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dcc_core::config::CampaignConfig;
use dcc_core::constants::{BLUE_AWACS_FREQUENCY, CAMPAIGN_START_TIMER, RED_AWACS_FREQUENCY};
use dcc_core::data::{FactionDefinition, ScenarioSide};
use dcc_core::enums::{AiSkill, Coalition, Hardcore, Task};
use dcc_core::events::MissionState;
use dcc_core::types::{minutes, EntityId};

/// One side of the campaign: its faction definition plus running scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    pub name: String,
    pub coalition: Coalition,
    pub country_name: String,
    pub aircraft_types: BTreeMap<Task, Vec<String>>,
    pub vehicles: Vec<String>,
    pub infantries: Vec<String>,
    pub shorad: Vec<String>,
    /// Aircraft types based on this side's carriers.
    pub carrier_aircraft_types: Vec<String>,
    pub awacs_frequency: f64,
    pub deployment_score: f64,
    pub repair_score: f64,
    pub reinforcement_timer: f64,
    /// Seconds between reinforcements.
    pub reinforcement_delay: f64,
    /// Timer value the scores were last accumulated at.
    pub score_timer: f64,
}

impl Faction {
    pub fn from_definition(
        definition: &FactionDefinition,
        coalition: Coalition,
        side: &ScenarioSide,
        config: &CampaignConfig,
        timer: f64,
    ) -> Self {
        Self {
            name: definition.name.clone(),
            coalition,
            country_name: definition.country_name.clone(),
            aircraft_types: definition.aircraft_types.clone(),
            vehicles: definition.vehicles.clone(),
            infantries: definition.infantries.clone(),
            shorad: definition.shorad.clone(),
            carrier_aircraft_types: side
                .carriers
                .iter()
                .flat_map(|c| c.aircraft_types.iter().cloned())
                .collect(),
            awacs_frequency: match coalition {
                Coalition::Red => RED_AWACS_FREQUENCY,
                _ => BLUE_AWACS_FREQUENCY,
            },
            deployment_score: 0.0,
            repair_score: 0.0,
            reinforcement_timer: timer,
            reinforcement_delay: minutes(config.reinforcement.delay_minutes),
            score_timer: timer,
        }
    }

    pub fn aircraft_types_for(&self, task: Task) -> &[String] {
        self.aircraft_types
            .get(&task)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn primary_aircraft_type(&self, task: Task) -> Option<&str> {
        self.aircraft_types_for(task).first().map(|s| s.as_str())
    }
}

/// Clock, flags and factions of the running campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignMeta {
    pub active: bool,
    pub name: String,
    pub scenario: Option<String>,
    pub timer: f64,
    pub multiplier: f64,
    pub paused: bool,
    pub ai_skill: AiSkill,
    pub hardcore: Hardcore,
    pub winner: Option<Coalition>,
    pub next_day: bool,
    pub mission_id: Option<String>,
    pub selected_flight_group: Option<EntityId>,
    pub blue_faction: Option<Faction>,
    pub red_faction: Option<Faction>,
    /// Last applied mission report, for idempotent re-submission.
    pub last_report: Option<MissionState>,
    pub round: u32,
}

impl Default for CampaignMeta {
    fn default() -> Self {
        Self {
            active: false,
            name: String::new(),
            scenario: None,
            timer: CAMPAIGN_START_TIMER,
            multiplier: 1.0,
            paused: false,
            ai_skill: AiSkill::default(),
            hardcore: Hardcore::default(),
            winner: None,
            next_day: false,
            mission_id: None,
            selected_flight_group: None,
            blue_faction: None,
            red_faction: None,
            last_report: None,
            round: 0,
        }
    }
}

impl CampaignMeta {
    pub fn faction(&self, coalition: Coalition) -> Option<&Faction> {
        match coalition {
            Coalition::Blue => self.blue_faction.as_ref(),
            Coalition::Red => self.red_faction.as_ref(),
            Coalition::Neutral => None,
        }
    }

    pub fn faction_mut(&mut self, coalition: Coalition) -> Option<&mut Faction> {
        match coalition {
            Coalition::Blue => self.blue_faction.as_mut(),
            Coalition::Red => self.red_faction.as_mut(),
            Coalition::Neutral => None,
        }
    }

    /// Whether the clock may advance.
    pub fn running(&self) -> bool {
        self.active && !self.paused && self.winner.is_none()
    }
}
