//! Package resolution: packages whose flight groups have all landed or been
//! lost are removed. Surviving aircraft go back to the idle pool; a CSAR
//! that landed intact rescues its pilot, and an air assault that landed
//! intact leaves an infantry group on its objective.

use rand_chacha::ChaCha8Rng;

use dcc_core::components::*;
use dcc_core::enums::{Coalition, FlightGroupState, GroundGroupState, GroundGroupType, QueryKey};
use dcc_core::events::CampaignEvent;
use dcc_core::types::EntityId;

use super::flights::{flight_group_state, is_finished};
use crate::campaign::CampaignMeta;
use crate::error::CampaignError;
use crate::world::World;
use crate::world_setup::create_ground_group;

pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    meta: &CampaignMeta,
    events: &mut Vec<CampaignEvent>,
) -> Result<(), CampaignError> {
    let timer = meta.timer;
    for coalition in Coalition::COMBATANTS {
        for package_id in world.query(coalition, QueryKey::Packages) {
            let package = world.get_cloned::<Package>(package_id)?;
            let mut groups = Vec::with_capacity(package.flight_group_ids.len());
            for fg_id in &package.flight_group_ids {
                let fg = world.get_cloned::<FlightGroup>(*fg_id)?;
                let state = flight_group_state(&fg, timer);
                groups.push((fg, state));
            }
            if !groups.iter().all(|(_, state)| is_finished(*state)) {
                continue;
            }

            let mut losses = 0;
            for (fg, state) in &groups {
                losses += fg.losses;
                if *state != FlightGroupState::Landed || fg.losses > 0 {
                    continue;
                }
                match fg.task {
                    FlightGroupTask::Csar {
                        target: Some(pilot_id),
                    } => rescue_pilot(world, coalition, pilot_id, events)?,
                    FlightGroupTask::AirAssault {
                        target: Some(objective_id),
                    } => insert_infantry(world, rng, meta, coalition, objective_id)?,
                    _ => {}
                }
            }

            world.destroy(package_id)?;
            tracing::debug!(
                target: "dcc::cleanup",
                coalition = %coalition,
                package = %package_id,
                task = %package.task,
                losses,
                "package completed"
            );
            events.push(CampaignEvent::PackageCompleted {
                package_id,
                coalition,
                task: package.task,
                losses,
            });
        }
    }
    Ok(())
}

fn rescue_pilot(
    world: &mut World,
    coalition: Coalition,
    pilot_id: EntityId,
    events: &mut Vec<CampaignEvent>,
) -> Result<(), CampaignError> {
    if !world.contains(pilot_id) {
        return Ok(());
    }
    if let EntityRecord::DownedPilot(pilot) = world.destroy(pilot_id)? {
        events.push(CampaignEvent::PilotRescued {
            pilot: pilot.name,
            coalition,
        });
    }
    Ok(())
}

fn insert_infantry(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    meta: &CampaignMeta,
    coalition: Coalition,
    objective_id: EntityId,
) -> Result<(), CampaignError> {
    let Some(faction) = meta.faction(coalition) else {
        return Ok(());
    };
    if !world.contains(objective_id) {
        return Ok(());
    }
    let objective = world.get_cloned::<Objective>(objective_id)?;
    if world.coalition(objective_id)? == coalition
        || objective.incoming_ground_groups.contains_key(&coalition)
    {
        return Ok(());
    }
    let group_id = create_ground_group(
        world,
        rng,
        faction,
        objective_id,
        objective_id,
        objective.position,
        meta.timer,
        Some(GroundGroupType::Infantry),
        GroundGroupState::OnTarget,
    )?;
    world.modify::<Objective, _>(objective_id, |o| {
        o.incoming_ground_groups.insert(coalition, group_id);
    })?;
    Ok(())
}
