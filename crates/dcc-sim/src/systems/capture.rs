//! Objective capture.
//!
//! A group on target at an objective its own coalition holds settles in.
//! A group on target at a foreign objective with no defending group takes
//! it over together with its structures and SAM sites.

use dcc_core::components::{GroundGroup, Objective};
use dcc_core::enums::{Coalition, GroundGroupState, QueryKey};
use dcc_core::events::CampaignEvent;
use dcc_core::types::EntityId;

use crate::error::CampaignError;
use crate::packages::target::defended;
use crate::world::World;

pub fn run(
    world: &mut World,
    timer: f64,
    events: &mut Vec<CampaignEvent>,
) -> Result<(), CampaignError> {
    for coalition in Coalition::COMBATANTS {
        for group_id in world.query(coalition, QueryKey::GroundGroupsOnTarget) {
            if !world.contains(group_id) {
                continue;
            }
            let group = world.get_cloned::<GroundGroup>(group_id)?;
            if group.state != GroundGroupState::OnTarget {
                continue;
            }
            let objective_id = group.target_objective_id;
            let owner = world.coalition(objective_id)?;

            if owner == coalition {
                settle(world, coalition, group_id, objective_id)?;
                continue;
            }
            if defended(world, owner, objective_id)? {
                continue;
            }

            capture(world, coalition, objective_id, timer)?;
            settle(world, coalition, group_id, objective_id)?;
            let name = world.get::<Objective>(objective_id)?.name.clone();
            tracing::info!(
                target: "dcc::capture",
                coalition = %coalition,
                objective = %name,
                "objective captured"
            );
            events.push(CampaignEvent::ObjectiveCaptured {
                objective: name,
                coalition,
            });
        }
    }
    Ok(())
}

fn settle(
    world: &mut World,
    coalition: Coalition,
    group_id: EntityId,
    objective_id: EntityId,
) -> Result<(), CampaignError> {
    world.update::<GroundGroup, _>(group_id, |g| g.state = GroundGroupState::OnObjective)?;
    world.modify::<Objective, _>(objective_id, |o| {
        if o.incoming_ground_groups.get(&coalition) == Some(&group_id) {
            o.incoming_ground_groups.remove(&coalition);
        }
    })
}

fn capture(
    world: &mut World,
    coalition: Coalition,
    objective_id: EntityId,
    timer: f64,
) -> Result<(), CampaignError> {
    let objective = world.get_cloned::<Objective>(objective_id)?;
    world.set_coalition(objective_id, coalition)?;
    for id in objective.structure_ids.iter().chain(objective.sam_ids.iter()) {
        world.set_coalition(*id, coalition)?;
    }
    world.modify::<Objective, _>(objective_id, |o| {
        o.deployment_timer = timer;
        o.incoming_ground_groups.remove(&coalition);
    })
}
