//! Escort and SEAD flight groups.
//!
//! A support flight takes off with the flight group it protects, joins it at
//! that group's first task waypoint and stays on station until the
//! protected group's task ends. It joins the protected group's package and
//! shares its frequency.

use rand_chacha::ChaCha8Rng;

use dcc_core::components::{FlightGroup, FlightGroupTask};
use dcc_core::constants::CRUISE_SPEED;
use dcc_core::enums::{Task, WaypointKind};
use dcc_core::types::{EntityId, Position};

use super::callsign::next_call_sign;
use super::crew::{crew_flight, home_base_candidates};
use super::route::RoutePlanner;
use super::target::{self, TargetChoice};
use super::{FlightGroupPlan, PackageContext};
use crate::error::CampaignError;
use crate::world::World;

pub fn plan(
    world: &World,
    _rng: &mut ChaCha8Rng,
    ctx: &PackageContext<'_>,
    task: Task,
    target_id: EntityId,
    protected: &FlightGroup,
) -> Result<Option<FlightGroupPlan>, CampaignError> {
    let Some(join) = protected.waypoints.iter().find(|w| w.task_start) else {
        return Ok(None);
    };
    let task_end = protected
        .waypoints
        .iter()
        .rev()
        .find(|w| w.kind == WaypointKind::Task)
        .map(|w| w.end_position)
        .unwrap_or(join.end_position);

    let candidates = home_base_candidates(world, ctx, task)?;
    let bases: Vec<Position> = candidates.iter().map(|c| c.position).collect();
    let meeting = [TargetChoice {
        id: target_id,
        position: join.position,
        range: 0.0,
    }];
    let Some((index, _)) = target::select(&bases, &meeting, ctx.config.max_distance(task)) else {
        return Ok(None);
    };
    let candidate = &candidates[index];

    let planner = RoutePlanner::new(candidate.position, protected.start_time, CRUISE_SPEED)
        .take_off()
        .nav("Join", join.position);
    let duration = (protected.task_end_time - planner.time()).max(0.0);
    let route = planner.on_station(task.as_str(), task_end, duration).land();

    let (call_sign, flight_number) = next_call_sign(world, ctx.coalition(), task)?;
    let aircraft = crew_flight(ctx, candidate, task, &call_sign, flight_number)?;
    let fg_task = match task {
        Task::Sead => FlightGroupTask::Sead {
            target: Some(target_id),
        },
        _ => FlightGroupTask::Escort {
            target: Some(target_id),
        },
    };

    Ok(Some(FlightGroupPlan {
        task: fg_task,
        home_base_id: candidate.base_id,
        call_sign,
        flight_number,
        aircraft,
        route,
        cruise_speed: CRUISE_SPEED,
    }))
}
