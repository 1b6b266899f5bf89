//! Combat air patrol packages: a racetrack across the threat axis between
//! the home base and the nearest enemy base.

use rand_chacha::ChaCha8Rng;

use dcc_core::components::FlightGroupTask;
use dcc_core::constants::CRUISE_SPEED;
use dcc_core::enums::Task;
use dcc_core::types::minutes;

use super::crew::home_base_candidates;
use super::route::RoutePlanner;
use super::target::{cap_racetrack, nearest_home_base};
use super::{single_flight_package, PackageContext, PackagePlan};
use crate::error::CampaignError;
use crate::world::World;

pub fn plan(
    world: &World,
    rng: &mut ChaCha8Rng,
    ctx: &PackageContext<'_>,
) -> Result<Option<PackagePlan>, CampaignError> {
    let max_distance = ctx.config.max_distance(Task::Cap);
    for candidate in home_base_candidates(world, ctx, Task::Cap)? {
        let Some(enemy) = nearest_home_base(world, ctx.coalition().opposite(), &candidate.position)?
        else {
            return Ok(None);
        };
        let racetrack = cap_racetrack(&candidate.position, &enemy);
        let reach = candidate
            .position
            .distance_to(&racetrack.start)
            .max(candidate.position.distance_to(&racetrack.end));
        if reach > max_distance {
            continue;
        }

        let route = RoutePlanner::new(candidate.position, ctx.timer, CRUISE_SPEED)
            .take_off()
            .nav("Racetrack Start", racetrack.start)
            .on_station(
                "CAP",
                racetrack.end,
                minutes(ctx.config.on_station.cap_minutes),
            )
            .land();
        let task = FlightGroupTask::Cap { racetrack };
        return single_flight_package(world, rng, ctx, task, &candidate, route, CRUISE_SPEED)
            .map(Some);
    }
    Ok(None)
}
