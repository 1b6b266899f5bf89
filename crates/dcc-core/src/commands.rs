//! Host commands sent to the campaign engine.
//!
//! Commands are processed strictly in arrival order; each one runs to
//! completion before the next is looked at.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::MissionState;
use crate::types::EntityId;

/// All operations the host may request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CampaignCommand {
    // --- Lifecycle ---
    /// Create a fresh campaign from the data store.
    Activate {
        blue_faction: String,
        red_faction: String,
        #[serde(default)]
        ai_skill: AiSkill,
        #[serde(default)]
        hardcore: bool,
        /// Scenario name; the first scenario when absent.
        #[serde(default)]
        scenario: Option<String>,
    },
    /// Discard the campaign and return to the inactive state.
    Reset,

    // --- Time ---
    /// Advance the timer by `multiplier` simulated seconds.
    Tick { multiplier: f64 },
    TogglePause,
    Pause,
    Resume,
    SkipToNextDay,
    ResumeNextDay,

    // --- Mission flow ---
    SelectFlightGroup { flight_group_id: Option<EntityId> },
    /// Flag the first `count` aircraft of a blue flight group as client slots.
    SetClient { flight_group_id: EntityId, count: u32 },
    SubmitMissionState { report: MissionState },
    SaveCampaignRound,
    GenerateMissionId,
    ResetMissionId,

    // --- Air tasking ---
    /// Generate one package on demand.
    GeneratePackage { coalition: Coalition, task: Task },
    /// Attach an Escort or SEAD flight group to an existing flight group's package.
    AttachFlightGroup {
        coalition: Coalition,
        task: Task,
        target_flight_group_id: EntityId,
    },
}
