//! Ground group movement.
//!
//! En-route groups advance toward their target objective at
//! `GROUND_GROUP_SPEED`, rounded to whole metres per step. A group whose
//! remaining distance fits in the step lands exactly on the objective and
//! switches to "on target".

use dcc_core::components::{GroundGroup, Objective};
use dcc_core::constants::GROUND_GROUP_SPEED;
use dcc_core::enums::{Coalition, GroundGroupState, QueryKey};

use crate::error::CampaignError;
use crate::world::World;

pub fn run(world: &mut World, delta: f64) -> Result<(), CampaignError> {
    if delta <= 0.0 {
        return Ok(());
    }
    let step = (GROUND_GROUP_SPEED * delta).round();

    for coalition in Coalition::ALL {
        for id in world.query(coalition, QueryKey::GroundGroupsEnRoute) {
            let group = world.get_cloned::<GroundGroup>(id)?;
            let target = match world.get::<Objective>(group.target_objective_id) {
                Ok(objective) => objective.position,
                Err(e) => {
                    tracing::warn!(target: "dcc::movement", group = %id, error = %e, "target objective missing");
                    continue;
                }
            };
            let (position, arrived) = group.position.step_toward(&target, step);
            world.update::<GroundGroup, _>(id, |g| {
                g.position = position;
                if arrived {
                    g.state = GroundGroupState::OnTarget;
                }
            })?;
        }
    }
    Ok(())
}
