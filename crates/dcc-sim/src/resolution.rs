//! Applying a flown mission's outcome report to the registry.
//!
//! Every id in the report is checked against the registry first. Ids that
//! are unknown or of the wrong kind are logged and skipped.

use dcc_core::components::*;
use dcc_core::enums::{Coalition, EntityType};
use dcc_core::events::MissionState;
use dcc_core::types::EntityId;

use crate::error::CampaignError;
use crate::world::World;

/// What a report changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub aircraft_destroyed: u32,
    pub ground_units_killed: u32,
    pub ground_groups_destroyed: u32,
    pub structures_destroyed: u32,
    pub sams_destroyed: u32,
    pub pilots_downed: u32,
    pub skipped: u32,
}

fn is_kind(world: &World, id: EntityId, kinds: &[EntityType]) -> bool {
    world
        .entity_type(id)
        .map(|t| kinds.contains(&t))
        .unwrap_or(false)
}

fn skip(summary: &mut ResolutionSummary, id: EntityId, field: &'static str) {
    tracing::warn!(target: "dcc::resolution", id = %id, field, "unknown id in mission report");
    summary.skipped += 1;
}

/// Whether the report kills a blue client aircraft.
pub fn client_killed(world: &World, report: &MissionState) -> Result<bool, CampaignError> {
    for id in &report.killed_aircrafts {
        if !is_kind(world, *id, &[EntityType::Aircraft]) {
            continue;
        }
        if world.coalition(*id)? == Coalition::Blue && world.get::<Aircraft>(*id)?.is_client {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn apply(
    world: &mut World,
    report: &MissionState,
    timer: f64,
) -> Result<ResolutionSummary, CampaignError> {
    let mut summary = ResolutionSummary::default();

    // Pilots first: the aircraft they ejected from is still registered.
    for pilot in &report.downed_pilots {
        let aircraft_type = if is_kind(world, pilot.aircraft_id, &[EntityType::Aircraft]) {
            world.get::<Aircraft>(pilot.aircraft_id)?.aircraft_type.clone()
        } else {
            String::new()
        };
        world.create(
            pilot.coalition,
            EntityRecord::DownedPilot(DownedPilot {
                name: pilot.name.clone(),
                position: pilot.position,
                time: pilot.time,
                aircraft_type,
            }),
        );
        summary.pilots_downed += 1;
    }

    for id in &report.killed_aircrafts {
        if !is_kind(world, *id, &[EntityType::Aircraft]) {
            skip(&mut summary, *id, "killedAircrafts");
            continue;
        }
        world.destroy(*id)?;
        summary.aircraft_destroyed += 1;
    }

    for id in &report.killed_ground_units {
        if !is_kind(world, *id, &[EntityType::GroundUnit]) {
            skip(&mut summary, *id, "killedGroundUnits");
            continue;
        }
        if !world.get::<GroundUnit>(*id)?.alive {
            continue;
        }
        summary.ground_units_killed += 1;
        if world.kill_ground_unit(*id, timer)? {
            summary.ground_groups_destroyed += 1;
        }
    }

    for id in &report.destroyed_structures {
        if !is_kind(world, *id, &EntityType::STRUCTURES) {
            skip(&mut summary, *id, "destroyedStructures");
            continue;
        }
        let newly = world.update::<Structure, _>(*id, |s| {
            let was_alive = s.alive;
            s.alive = false;
            s.destroyed_time.get_or_insert(timer);
            was_alive
        })?;
        if newly {
            summary.structures_destroyed += 1;
        }
    }

    for id in &report.destroyed_sams {
        if !is_kind(world, *id, &[EntityType::Sam]) {
            skip(&mut summary, *id, "destroyedSams");
            continue;
        }
        let newly = world.update::<SamSite, _>(*id, |s| {
            let was_operational = s.operational;
            s.operational = false;
            s.destroyed_time.get_or_insert(timer);
            was_operational
        })?;
        if newly {
            summary.sams_destroyed += 1;
        }
    }

    tracing::info!(
        target: "dcc::resolution",
        aircraft = summary.aircraft_destroyed,
        ground_units = summary.ground_units_killed,
        structures = summary.structures_destroyed,
        sams = summary.sams_destroyed,
        pilots = summary.pilots_downed,
        skipped = summary.skipped,
        "mission report applied"
    );
    Ok(summary)
}
