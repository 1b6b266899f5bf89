//! Ground group deployment from unit camps toward the front.

use rand_chacha::ChaCha8Rng;

use dcc_core::components::{Objective, Structure};
use dcc_core::config::CampaignConfig;
use dcc_core::enums::{Coalition, GroundGroupState, QueryKey};
use dcc_core::events::CampaignEvent;
use dcc_core::types::EntityId;

use crate::campaign::CampaignMeta;
use crate::error::CampaignError;
use crate::world::World;
use crate::world_setup::create_ground_group;

/// Reach of an objective's living unit camps, 0 when it has none.
fn frontline_range(
    world: &World,
    config: &CampaignConfig,
    objective: &Objective,
) -> Result<f64, CampaignError> {
    let mut range: f64 = 0.0;
    for id in &objective.structure_ids {
        if !world.contains(*id) {
            continue;
        }
        let structure = world.get::<Structure>(*id)?;
        if structure.alive && structure.structure_type.is_unit_camp() {
            range = range.max(config.deployment.frontline_range(structure.structure_type));
        }
    }
    Ok(range)
}

/// Nearest objective `coalition` does not own and is not already sending a
/// group to, within `range` of `from`.
fn deployment_target(
    world: &World,
    coalition: Coalition,
    from: &Objective,
    range: f64,
) -> Result<Option<EntityId>, CampaignError> {
    let mut best: Option<(EntityId, f64)> = None;
    for other in Coalition::ALL {
        if other == coalition {
            continue;
        }
        for id in world.query(other, QueryKey::Objectives) {
            let objective = world.get::<Objective>(id)?;
            if objective.incoming_ground_groups.contains_key(&coalition) {
                continue;
            }
            let distance = from.position.distance_to(&objective.position);
            if distance > range {
                continue;
            }
            match best {
                Some((best_id, d)) if distance > d || (distance == d && id > best_id) => {}
                _ => best = Some((id, distance)),
            }
        }
    }
    Ok(best.map(|(id, _)| id))
}

pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    meta: &mut CampaignMeta,
    config: &CampaignConfig,
    events: &mut Vec<CampaignEvent>,
) -> Result<(), CampaignError> {
    let timer = meta.timer;
    let cost = config.deployment.cost;

    for coalition in Coalition::COMBATANTS {
        let Some(faction) = meta.faction(coalition).cloned() else {
            continue;
        };
        let mut score = faction.deployment_score;
        let mut en_route = world.query_count(coalition, QueryKey::GroundGroupsEnRoute) as u32;

        for objective_id in world.query(coalition, QueryKey::Objectives) {
            if score < cost || en_route >= config.deployment.max_en_route {
                break;
            }
            let objective = world.get_cloned::<Objective>(objective_id)?;
            if timer < objective.deployment_timer + objective.deployment_delay {
                continue;
            }
            let range = frontline_range(world, config, &objective)?;
            if range <= 0.0 {
                continue;
            }
            let Some(target_id) = deployment_target(world, coalition, &objective, range)? else {
                continue;
            };

            let group_id = create_ground_group(
                world,
                rng,
                &faction,
                objective_id,
                target_id,
                objective.position,
                timer,
                None,
                GroundGroupState::EnRoute,
            )?;
            world.modify::<Objective, _>(target_id, |o| {
                o.incoming_ground_groups.insert(coalition, group_id);
            })?;
            world.modify::<Objective, _>(objective_id, |o| o.deployment_timer = timer)?;
            score -= cost;
            en_route += 1;

            let target_name = world.get::<Objective>(target_id)?.name.clone();
            tracing::info!(
                target: "dcc::deployment",
                coalition = %coalition,
                from = %objective.name,
                to = %target_name,
                group = %group_id,
                "ground group deployed"
            );
            events.push(CampaignEvent::GroundGroupDeployed {
                group_id,
                coalition,
                target_objective: target_name,
            });
        }

        if let Some(faction) = meta.faction_mut(coalition) {
            faction.deployment_score = score;
        }
    }
    Ok(())
}
