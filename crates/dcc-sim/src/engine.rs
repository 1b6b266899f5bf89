//! Campaign engine.
//!
//! `CampaignEngine` owns the campaign registry, the campaign clock and the
//! seeded RNG. It processes host commands one at a time, runs the campaign
//! systems as the clock advances and produces `CampaignStateView`s and
//! save data. It performs no I/O, so identical seeds and command streams
//! replay identically.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use dcc_core::commands::CampaignCommand;
use dcc_core::components::{Aircraft, FlightGroup, GroundGroup, Objective};
use dcc_core::config::CampaignConfig;
use dcc_core::constants::{CAMPAIGN_START_TIMER, SNAPSHOT_VERSION};
use dcc_core::data::DataStore;
use dcc_core::enums::{AiSkill, Coalition, GroundGroupState, Hardcore, QueryKey, Task};
use dcc_core::events::{CampaignEvent, MissionState};
use dcc_core::state::CampaignStateView;
use dcc_core::types::{next_day_at, EntityId};

use crate::campaign::CampaignMeta;
use crate::error::CampaignError;
use crate::packages::{self, PackageContext};
use crate::resolution::{self, ResolutionSummary};
use crate::serialization::{self, SaveData, Snapshot, SnapshotError};
use crate::systems;
use crate::world::World;
use crate::world_setup;

/// Configuration for a new engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// RNG seed. Same seed and commands, same campaign.
    pub seed: u64,
    pub campaign: CampaignConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            campaign: CampaignConfig::default(),
        }
    }
}

/// Result of one host command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CommandOutcome {
    Done,
    PackageGenerated { package_id: Option<EntityId> },
    FlightGroupAttached { flight_group_id: Option<EntityId> },
    MissionId { mission_id: String },
    MissionApplied { skipped: u32 },
    Saved { save: Box<SaveData> },
}

pub struct CampaignEngine {
    world: World,
    meta: CampaignMeta,
    data: Arc<DataStore>,
    config: CampaignConfig,
    seed: u64,
    rng: ChaCha8Rng,
    events: Vec<CampaignEvent>,
}

impl CampaignEngine {
    pub fn new(config: EngineConfig, data: Arc<DataStore>) -> Self {
        Self {
            world: World::new(),
            meta: CampaignMeta::default(),
            data,
            config: config.campaign,
            seed: config.seed,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            events: Vec::new(),
        }
    }

    /// Rebuild an engine from save data. The snapshot is fully validated
    /// before anything is built.
    pub fn restore(
        config: EngineConfig,
        data: Arc<DataStore>,
        save: &SaveData,
    ) -> Result<Self, CampaignError> {
        if save.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: save.version,
            }
            .into());
        }
        let world = serialization::deserialize(&save.world)?;
        let mut engine = Self::new(config, data);
        engine.world = world;
        engine.meta = save.campaign.clone();
        tracing::info!(
            target: "dcc::engine",
            round = engine.meta.round,
            timer = engine.meta.timer,
            entities = engine.world.len(),
            "campaign restored"
        );
        Ok(engine)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn meta(&self) -> &CampaignMeta {
        &self.meta
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    pub fn data(&self) -> &DataStore {
        &self.data
    }

    pub fn timer(&self) -> f64 {
        self.meta.timer
    }

    #[cfg(test)]
    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[cfg(test)]
    pub(crate) fn meta_mut(&mut self) -> &mut CampaignMeta {
        &mut self.meta
    }

    /// Take the events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<CampaignEvent> {
        std::mem::take(&mut self.events)
    }

    fn ensure_active(&self) -> Result<(), CampaignError> {
        if self.meta.active {
            Ok(())
        } else {
            Err(CampaignError::Inactive)
        }
    }

    // --- Lifecycle ---

    /// Create a fresh campaign. On error the current campaign is kept.
    pub fn activate(
        &mut self,
        blue_faction: &str,
        red_faction: &str,
        ai_skill: AiSkill,
        hardcore: bool,
        scenario: Option<&str>,
    ) -> Result<(), CampaignError> {
        let timer = CAMPAIGN_START_TIMER;
        let campaign = world_setup::create_campaign(
            &self.data,
            &self.config,
            &mut self.rng,
            blue_faction,
            red_faction,
            scenario,
            timer,
        )?;

        let mut world = campaign.world;
        let meta = CampaignMeta {
            active: true,
            name: format!("{} vs {}", campaign.blue.name, campaign.red.name),
            scenario: Some(campaign.scenario),
            timer,
            ai_skill,
            hardcore: if hardcore {
                Hardcore::Enabled
            } else {
                Hardcore::Disabled
            },
            blue_faction: Some(campaign.blue),
            red_faction: Some(campaign.red),
            ..CampaignMeta::default()
        };

        // Plan the opening packages before the new campaign replaces the
        // current one.
        let mut events = Vec::new();
        systems::planning::run(
            &mut world,
            &mut self.rng,
            &meta,
            &self.data,
            &self.config,
            &mut events,
        )?;

        self.world = world;
        self.meta = meta;
        self.events = events;

        tracing::info!(
            target: "dcc::engine",
            name = %self.meta.name,
            scenario = ?self.meta.scenario,
            hardcore,
            events = self.events.len(),
            "campaign activated"
        );
        Ok(())
    }

    /// Discard the campaign and return to the inactive state.
    pub fn reset(&mut self) {
        self.world = World::new();
        self.meta = CampaignMeta::default();
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.events.clear();
        tracing::info!(target: "dcc::engine", "campaign reset");
    }

    // --- Time ---

    /// Advance the clock by `multiplier` seconds and run the campaign
    /// systems. The clock stops at the start of the next blue flight group
    /// with a client slot and pauses there.
    pub fn tick(&mut self, multiplier: f64) -> Result<(), CampaignError> {
        if !self.meta.running() || multiplier <= 0.0 {
            return Ok(());
        }
        let timer = self.meta.timer;
        let mut target = timer + multiplier;
        let mut reached_client = false;
        if let Some(start) = systems::flights::next_client_start(&self.world, timer)? {
            if target >= start {
                target = start;
                reached_client = true;
            }
        }

        self.meta.multiplier = multiplier;
        self.meta.timer = target;
        self.run_systems(target - timer)?;

        if reached_client {
            self.meta.paused = true;
            tracing::info!(target: "dcc::engine", timer = target, "client flight start reached");
        }
        Ok(())
    }

    /// Run all systems in order.
    fn run_systems(&mut self, delta: f64) -> Result<(), CampaignError> {
        // 1. Finished packages
        systems::cleanup::run(&mut self.world, &mut self.rng, &self.meta, &mut self.events)?;

        // 2. Ground movement
        systems::movement::run(&mut self.world, delta)?;

        // 3. Objective capture
        systems::capture::run(&mut self.world, self.meta.timer, &mut self.events)?;

        // 4. Aircraft reinforcement
        systems::reinforcement::run(
            &mut self.world,
            &mut self.rng,
            &mut self.meta,
            &self.data,
            &self.config,
            &mut self.events,
        )?;

        // 5. Ground deployment
        systems::deployment::run(
            &mut self.world,
            &mut self.rng,
            &mut self.meta,
            &self.config,
            &mut self.events,
        )?;

        // 6. Air tasking
        systems::planning::run(
            &mut self.world,
            &mut self.rng,
            &self.meta,
            &self.data,
            &self.config,
            &mut self.events,
        )?;

        // 7. Winning condition
        self.check_winner();
        Ok(())
    }

    /// A coalition left without objectives loses.
    fn check_winner(&mut self) {
        if !self.meta.active || self.meta.winner.is_some() {
            return;
        }
        for coalition in Coalition::COMBATANTS {
            if self.world.query_count(coalition, QueryKey::Objectives) == 0 {
                let winner = coalition.opposite();
                self.meta.winner = Some(winner);
                self.meta.paused = true;
                tracing::info!(target: "dcc::engine", winner = %winner, "campaign won");
                self.events.push(CampaignEvent::CampaignWon { winner });
                return;
            }
        }
    }

    pub fn toggle_pause(&mut self) {
        self.meta.paused = !self.meta.paused;
    }

    pub fn pause(&mut self) {
        self.meta.paused = true;
    }

    pub fn resume(&mut self) {
        self.meta.paused = false;
    }

    /// Jump to the end of the coming night, dropping everything a skipped
    /// mission would leave half done: every package, every ground group
    /// not holding an objective and all incoming-group tracking.
    pub fn skip_to_next_day(&mut self) -> Result<(), CampaignError> {
        self.ensure_active()?;

        let mut packages = 0;
        let mut groups = 0;
        for coalition in Coalition::ALL {
            for id in self.world.query(coalition, QueryKey::Packages) {
                if self.world.contains(id) {
                    self.world.destroy(id)?;
                    packages += 1;
                }
            }
            for id in self.world.query(coalition, QueryKey::GroundGroups) {
                if !self.world.contains(id) {
                    continue;
                }
                if self.world.get::<GroundGroup>(id)?.state != GroundGroupState::OnObjective {
                    self.world.destroy(id)?;
                    groups += 1;
                }
            }
        }
        for coalition in Coalition::ALL {
            for id in self.world.query(coalition, QueryKey::Objectives) {
                self.world
                    .update::<Objective, _>(id, |o| o.incoming_ground_groups.clear())?;
            }
        }

        self.meta.timer = next_day_at(self.meta.timer, self.config.night.end_hour);
        self.meta.next_day = true;
        self.meta.paused = true;
        self.meta.selected_flight_group = None;
        self.meta.mission_id = None;
        tracing::info!(
            target: "dcc::engine",
            timer = self.meta.timer,
            packages,
            ground_groups = groups,
            "skipped to next day"
        );
        Ok(())
    }

    pub fn resume_next_day(&mut self) {
        self.meta.next_day = false;
        self.meta.paused = false;
    }

    // --- Mission flow ---

    pub fn select_flight_group(&mut self, id: Option<EntityId>) -> Result<(), CampaignError> {
        if let Some(id) = id {
            self.world.get::<FlightGroup>(id)?;
        }
        self.meta.selected_flight_group = id;
        Ok(())
    }

    /// Flag the first `count` aircraft of a blue flight group as client
    /// slots and clear the flag on the rest.
    pub fn set_client(&mut self, flight_group_id: EntityId, count: u32) -> Result<(), CampaignError> {
        self.ensure_active()?;
        if self.world.coalition(flight_group_id)? != Coalition::Blue {
            return Err(CampaignError::InvalidRequest(format!(
                "client slots are only available in blue flight groups, not {flight_group_id}"
            )));
        }
        let aircraft_ids = self.world.get::<FlightGroup>(flight_group_id)?.aircraft_ids.clone();
        for (index, id) in aircraft_ids.into_iter().enumerate() {
            let is_client = (index as u32) < count;
            self.world.update::<Aircraft, _>(id, |a| a.is_client = is_client)?;
        }
        self.meta.mission_id = None;
        Ok(())
    }

    /// Apply a flown mission's outcome. Re-submitting the last applied
    /// report changes nothing.
    pub fn submit_mission_state(
        &mut self,
        report: MissionState,
    ) -> Result<ResolutionSummary, CampaignError> {
        self.ensure_active()?;
        if self.meta.last_report.as_ref() == Some(&report) {
            tracing::debug!(target: "dcc::engine", "mission report already applied");
            return Ok(ResolutionSummary::default());
        }

        self.meta.timer = self.meta.timer.max(report.time);
        self.meta.mission_id = None;

        if self.meta.hardcore == Hardcore::Enabled
            && resolution::client_killed(&self.world, &report)?
        {
            let winner = Coalition::Red;
            self.meta.winner = Some(winner);
            self.meta.hardcore = Hardcore::Killed;
            self.meta.paused = true;
            tracing::warn!(target: "dcc::engine", "client killed in hardcore campaign");
            self.events.push(CampaignEvent::CampaignWon { winner });
        }

        let summary = resolution::apply(&mut self.world, &report, self.meta.timer)?;

        systems::cleanup::run(&mut self.world, &mut self.rng, &self.meta, &mut self.events)?;
        systems::capture::run(&mut self.world, self.meta.timer, &mut self.events)?;
        systems::reinforcement::run(
            &mut self.world,
            &mut self.rng,
            &mut self.meta,
            &self.data,
            &self.config,
            &mut self.events,
        )?;
        self.check_winner();

        self.meta.last_report = Some(report);
        Ok(summary)
    }

    /// Close the round: grow both scores, spend the repair score and return
    /// the save data for the new round.
    pub fn save_campaign_round(&mut self) -> Result<SaveData, CampaignError> {
        self.ensure_active()?;
        let timer = self.meta.timer;
        for coalition in Coalition::COMBATANTS {
            if let Some(faction) = self.meta.faction_mut(coalition) {
                systems::scores::accumulate(&self.world, faction, &self.config, timer)?;
                systems::scores::apply_repairs(
                    &mut self.world,
                    faction,
                    &self.config,
                    &mut self.events,
                )?;
            }
        }
        self.meta.round += 1;

        let save = SaveData {
            version: SNAPSHOT_VERSION,
            campaign: self.meta.clone(),
            world: serialization::serialize(&self.world)?,
        };
        tracing::info!(
            target: "dcc::engine",
            round = self.meta.round,
            entities = save.world.entities.len(),
            "campaign round saved"
        );
        Ok(save)
    }

    /// Assign a fresh UUID-formatted mission id drawn from the engine RNG.
    pub fn generate_mission_id(&mut self) -> String {
        let mut bytes = [0u8; 16];
        self.rng.fill(&mut bytes);
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        let id = format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        );
        self.meta.mission_id = Some(id.clone());
        id
    }

    pub fn reset_mission_id(&mut self) {
        self.meta.mission_id = None;
    }

    // --- Air tasking ---

    /// Generate one package on demand.
    pub fn generate_package(
        &mut self,
        coalition: Coalition,
        task: Task,
    ) -> Result<Option<EntityId>, CampaignError> {
        self.ensure_active()?;
        let faction = self.meta.faction(coalition).ok_or_else(|| {
            CampaignError::InvalidRequest(format!("{coalition} has no faction"))
        })?;
        let ctx = PackageContext {
            data: &self.data,
            config: &self.config,
            faction,
            timer: self.meta.timer,
        };
        let package_id = packages::generate(&mut self.world, &mut self.rng, &ctx, task)?;
        if let Some(package_id) = package_id {
            self.events.push(CampaignEvent::PackageCreated {
                package_id,
                coalition,
                task,
            });
        }
        Ok(package_id)
    }

    /// Attach an Escort or SEAD flight group to an existing flight group.
    pub fn attach_flight_group(
        &mut self,
        coalition: Coalition,
        task: Task,
        target_flight_group_id: EntityId,
    ) -> Result<Option<EntityId>, CampaignError> {
        self.ensure_active()?;
        let faction = self.meta.faction(coalition).ok_or_else(|| {
            CampaignError::InvalidRequest(format!("{coalition} has no faction"))
        })?;
        let ctx = PackageContext {
            data: &self.data,
            config: &self.config,
            faction,
            timer: self.meta.timer,
        };
        packages::attach(&mut self.world, &mut self.rng, &ctx, task, target_flight_group_id)
    }

    // --- Read side ---

    pub fn state(&self) -> Result<CampaignStateView, CampaignError> {
        systems::snapshot::build_state(&self.world, &self.meta, &self.data)
    }

    pub fn snapshot(&self) -> Result<Snapshot, CampaignError> {
        Ok(serialization::serialize(&self.world)?)
    }

    /// Replace the registry with a snapshot's. A rejected snapshot leaves
    /// the current registry in place.
    pub fn restore_world(&mut self, snapshot: &Snapshot) -> Result<(), CampaignError> {
        self.world = serialization::deserialize(snapshot)?;
        Ok(())
    }

    // --- Commands ---

    /// Process one host command to completion.
    pub fn handle_command(
        &mut self,
        command: CampaignCommand,
    ) -> Result<CommandOutcome, CampaignError> {
        let result = self.dispatch(command);
        if let Err(e) = &result {
            if e.is_logic_error() {
                tracing::warn!(target: "dcc::engine", error = %e, "command aborted");
            }
        }
        result
    }

    fn dispatch(&mut self, command: CampaignCommand) -> Result<CommandOutcome, CampaignError> {
        match command {
            CampaignCommand::Activate {
                blue_faction,
                red_faction,
                ai_skill,
                hardcore,
                scenario,
            } => self.activate(
                &blue_faction,
                &red_faction,
                ai_skill,
                hardcore,
                scenario.as_deref(),
            )?,
            CampaignCommand::Reset => self.reset(),
            CampaignCommand::Tick { multiplier } => self.tick(multiplier)?,
            CampaignCommand::TogglePause => self.toggle_pause(),
            CampaignCommand::Pause => self.pause(),
            CampaignCommand::Resume => self.resume(),
            CampaignCommand::SkipToNextDay => self.skip_to_next_day()?,
            CampaignCommand::ResumeNextDay => self.resume_next_day(),
            CampaignCommand::SelectFlightGroup { flight_group_id } => {
                self.select_flight_group(flight_group_id)?
            }
            CampaignCommand::SetClient {
                flight_group_id,
                count,
            } => self.set_client(flight_group_id, count)?,
            CampaignCommand::SubmitMissionState { report } => {
                let summary = self.submit_mission_state(report)?;
                return Ok(CommandOutcome::MissionApplied {
                    skipped: summary.skipped,
                });
            }
            CampaignCommand::SaveCampaignRound => {
                let save = self.save_campaign_round()?;
                return Ok(CommandOutcome::Saved {
                    save: Box::new(save),
                });
            }
            CampaignCommand::GenerateMissionId => {
                return Ok(CommandOutcome::MissionId {
                    mission_id: self.generate_mission_id(),
                });
            }
            CampaignCommand::ResetMissionId => self.reset_mission_id(),
            CampaignCommand::GeneratePackage { coalition, task } => {
                return Ok(CommandOutcome::PackageGenerated {
                    package_id: self.generate_package(coalition, task)?,
                });
            }
            CampaignCommand::AttachFlightGroup {
                coalition,
                task,
                target_flight_group_id,
            } => {
                return Ok(CommandOutcome::FlightGroupAttached {
                    flight_group_id: self.attach_flight_group(
                        coalition,
                        task,
                        target_flight_group_id,
                    )?,
                });
            }
        }
        Ok(CommandOutcome::Done)
    }
}
