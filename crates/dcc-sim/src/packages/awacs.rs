//! AWACS packages: one aircraft orbiting behind the nearest home base to
//! the enemy, on the coalition's fixed frequency.

use rand_chacha::ChaCha8Rng;

use dcc_core::components::FlightGroupTask;
use dcc_core::constants::CRUISE_SPEED;
use dcc_core::enums::Task;
use dcc_core::types::minutes;

use super::crew::home_base_candidates;
use super::route::RoutePlanner;
use super::target::{awacs_racetrack, nearest_home_base};
use super::{single_flight_package, PackageContext, PackagePlan};
use crate::error::CampaignError;
use crate::world::World;

pub fn plan(
    world: &World,
    rng: &mut ChaCha8Rng,
    ctx: &PackageContext<'_>,
) -> Result<Option<PackagePlan>, CampaignError> {
    let max_distance = ctx.config.max_distance(Task::Awacs);
    for candidate in home_base_candidates(world, ctx, Task::Awacs)? {
        let Some(enemy) = nearest_home_base(world, ctx.coalition().opposite(), &candidate.position)?
        else {
            return Ok(None);
        };
        let racetrack = awacs_racetrack(&candidate.position, &enemy);
        if candidate.position.distance_to(&racetrack.end) > max_distance {
            continue;
        }

        let route = RoutePlanner::new(candidate.position, ctx.timer, CRUISE_SPEED)
            .take_off()
            .nav("Racetrack Start", racetrack.start)
            .on_station(
                "Orbit",
                racetrack.end,
                minutes(ctx.config.on_station.awacs_minutes),
            )
            .land();
        let task = FlightGroupTask::Awacs { racetrack };
        return single_flight_package(world, rng, ctx, task, &candidate, route, CRUISE_SPEED)
            .map(Some);
    }
    Ok(None)
}
