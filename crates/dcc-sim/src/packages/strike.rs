//! Strike and DEAD packages.
//!
//! Both fly the same shape: ingress point on the home side of the target,
//! the attack run, then egress away from the nearest enemy base. DEAD
//! ingresses from just outside the SAM's engagement range.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use dcc_core::components::FlightGroupTask;
use dcc_core::constants::*;
use dcc_core::enums::Task;
use dcc_core::types::{add_heading, minutes, Position};

use super::crew::home_base_candidates;
use super::route::{Route, RoutePlanner};
use super::target::{self, nearest_home_base, TargetChoice};
use super::{single_flight_package, PackageContext, PackagePlan};
use crate::error::CampaignError;
use crate::world::World;

/// Start time of strike-family packages: 30 to 60 minutes from now.
pub fn strike_start_time(rng: &mut ChaCha8Rng, timer: f64) -> f64 {
    timer + minutes(rng.gen_range(STRIKE_START_DELAY_MIN..=STRIKE_START_DELAY_MAX) as f64)
}

pub fn plan_strike(
    world: &World,
    rng: &mut ChaCha8Rng,
    ctx: &PackageContext<'_>,
) -> Result<Option<PackagePlan>, CampaignError> {
    let targets = target::strike_targets(world, ctx.coalition())?;
    plan_attack(world, rng, ctx, Task::Strike, &targets, |_| STRIKE_INGRESS_DISTANCE)
}

pub fn plan_dead(
    world: &World,
    rng: &mut ChaCha8Rng,
    ctx: &PackageContext<'_>,
) -> Result<Option<PackagePlan>, CampaignError> {
    let targets = target::dead_targets(world, ctx.coalition())?;
    plan_attack(world, rng, ctx, Task::Dead, &targets, |t| {
        t.range + DEAD_INGRESS_MARGIN
    })
}

fn plan_attack(
    world: &World,
    rng: &mut ChaCha8Rng,
    ctx: &PackageContext<'_>,
    task: Task,
    targets: &[TargetChoice],
    ingress_distance: impl Fn(&TargetChoice) -> f64,
) -> Result<Option<PackagePlan>, CampaignError> {
    let candidates = home_base_candidates(world, ctx, task)?;
    let bases: Vec<Position> = candidates.iter().map(|c| c.position).collect();
    let Some((index, choice)) = target::select(&bases, targets, ctx.config.max_distance(task))
    else {
        return Ok(None);
    };
    let candidate = &candidates[index];

    let start = strike_start_time(rng, ctx.timer);
    let route = attack_route(
        world,
        ctx,
        candidate.position,
        &choice,
        ingress_distance(&choice),
        start,
    )?;
    let fg_task = match task {
        Task::Dead => FlightGroupTask::Dead {
            target: Some(choice.id),
        },
        _ => FlightGroupTask::Strike {
            target: Some(choice.id),
        },
    };
    single_flight_package(world, rng, ctx, fg_task, candidate, route, CRUISE_SPEED).map(Some)
}

fn attack_route(
    world: &World,
    ctx: &PackageContext<'_>,
    home: Position,
    choice: &TargetChoice,
    ingress_distance: f64,
    start: f64,
) -> Result<Route, CampaignError> {
    let target = choice.position;
    let ingress = target.offset(target.heading_to(&home), ingress_distance);
    let egress_heading = match nearest_home_base(world, ctx.coalition().opposite(), &target)? {
        Some(enemy) => add_heading(target.heading_to(&enemy), 180.0),
        None => target.heading_to(&home),
    };
    let egress = target.offset(egress_heading, STRIKE_EGRESS_DISTANCE);

    Ok(RoutePlanner::new(home, start, CRUISE_SPEED)
        .take_off()
        .nav("Ingress", ingress)
        .task("Target", target)
        .nav("Egress", egress)
        .land())
}
