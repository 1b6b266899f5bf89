//! Helicopter packages: CSAR pickups of own downed pilots and air assaults
//! that drop infantry on undefended enemy objectives.

use rand_chacha::ChaCha8Rng;

use dcc_core::components::FlightGroupTask;
use dcc_core::constants::{HELICOPTER_CRUISE_SPEED, HELICOPTER_GROUND_TIME};
use dcc_core::enums::Task;
use dcc_core::types::{minutes, Position};

use super::crew::home_base_candidates;
use super::route::RoutePlanner;
use super::strike::strike_start_time;
use super::target::{self, TargetChoice};
use super::{single_flight_package, PackageContext, PackagePlan};
use crate::error::CampaignError;
use crate::world::World;

pub fn plan_csar(
    world: &World,
    rng: &mut ChaCha8Rng,
    ctx: &PackageContext<'_>,
) -> Result<Option<PackagePlan>, CampaignError> {
    let targets = target::csar_targets(world, ctx.coalition())?;
    let start = ctx.timer;
    plan_landing(world, rng, ctx, Task::Csar, &targets, start, "Pickup")
}

pub fn plan_air_assault(
    world: &World,
    rng: &mut ChaCha8Rng,
    ctx: &PackageContext<'_>,
) -> Result<Option<PackagePlan>, CampaignError> {
    let targets = target::air_assault_targets(world, ctx.coalition())?;
    if targets.is_empty() {
        return Ok(None);
    }
    let start = strike_start_time(rng, ctx.timer);
    plan_landing(world, rng, ctx, Task::AirAssault, &targets, start, "Drop Off")
}

fn plan_landing(
    world: &World,
    rng: &mut ChaCha8Rng,
    ctx: &PackageContext<'_>,
    task: Task,
    targets: &[TargetChoice],
    start: f64,
    leg: &str,
) -> Result<Option<PackagePlan>, CampaignError> {
    let candidates = home_base_candidates(world, ctx, task)?;
    let bases: Vec<Position> = candidates.iter().map(|c| c.position).collect();
    let Some((index, choice)) = target::select(&bases, targets, ctx.config.max_distance(task))
    else {
        return Ok(None);
    };
    let candidate = &candidates[index];

    let route = RoutePlanner::new(candidate.position, start, HELICOPTER_CRUISE_SPEED)
        .take_off()
        .task(leg, choice.position)
        .hold_on_ground(leg, minutes(HELICOPTER_GROUND_TIME))
        .land();
    let fg_task = match task {
        Task::AirAssault => FlightGroupTask::AirAssault {
            target: Some(choice.id),
        },
        _ => FlightGroupTask::Csar {
            target: Some(choice.id),
        },
    };
    single_flight_package(
        world,
        rng,
        ctx,
        fg_task,
        candidate,
        route,
        HELICOPTER_CRUISE_SPEED,
    )
    .map(Some)
}
