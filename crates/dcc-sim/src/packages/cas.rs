//! Close air support packages against enemy ground groups sitting on an
//! objective. The flight launches immediately and holds over the group.

use rand_chacha::ChaCha8Rng;

use dcc_core::components::FlightGroupTask;
use dcc_core::constants::{CAS_INGRESS_DISTANCE, CRUISE_SPEED};
use dcc_core::enums::Task;
use dcc_core::types::{minutes, Position};

use super::crew::home_base_candidates;
use super::route::RoutePlanner;
use super::target;
use super::{single_flight_package, PackageContext, PackagePlan};
use crate::error::CampaignError;
use crate::world::World;

pub fn plan(
    world: &World,
    rng: &mut ChaCha8Rng,
    ctx: &PackageContext<'_>,
) -> Result<Option<PackagePlan>, CampaignError> {
    let targets = target::cas_targets(world, ctx.coalition())?;
    let candidates = home_base_candidates(world, ctx, Task::Cas)?;
    let bases: Vec<Position> = candidates.iter().map(|c| c.position).collect();
    let Some((index, choice)) =
        target::select(&bases, &targets, ctx.config.max_distance(Task::Cas))
    else {
        return Ok(None);
    };
    let candidate = &candidates[index];

    let ingress = choice
        .position
        .offset(choice.position.heading_to(&candidate.position), CAS_INGRESS_DISTANCE);
    let route = RoutePlanner::new(candidate.position, ctx.timer, CRUISE_SPEED)
        .take_off()
        .nav("Ingress", ingress)
        .on_station(
            "Close Air Support",
            choice.position,
            minutes(ctx.config.on_station.cas_minutes),
        )
        .land();
    let task = FlightGroupTask::Cas {
        target: Some(choice.id),
    };
    single_flight_package(world, rng, ctx, task, candidate, route, CRUISE_SPEED).map(Some)
}
