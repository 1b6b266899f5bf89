//! Air-tasking package generation.
//!
//! Every generator follows the same shape: find home bases with enough idle
//! aircraft, select a target, plan the route, then resolve call signs,
//! loadouts and the radio frequency into a [`PackagePlan`]. Planning only
//! reads the registry; [`commit_package`] is the single place that writes
//! it, so a configuration error found while planning leaves the world
//! untouched. "Nothing to do" is `Ok(None)`, never an error.

pub mod awacs;
pub mod callsign;
pub mod cap;
pub mod cas;
pub mod crew;
pub mod helicopter;
pub mod route;
pub mod strike;
pub mod support;
pub mod target;

use rand_chacha::ChaCha8Rng;

use dcc_core::components::*;
use dcc_core::config::CampaignConfig;
use dcc_core::data::DataStore;
use dcc_core::enums::{Coalition, Task};
use dcc_core::types::EntityId;

use crate::campaign::Faction;
use crate::error::CampaignError;
use crate::world::World;

use self::crew::BaseCandidate;
use self::route::Route;

/// Inputs shared by every generator.
pub struct PackageContext<'a> {
    pub data: &'a DataStore,
    pub config: &'a CampaignConfig,
    pub faction: &'a Faction,
    pub timer: f64,
}

impl PackageContext<'_> {
    pub fn coalition(&self) -> Coalition {
        self.faction.coalition
    }
}

/// One aircraft's share of a planned flight group.
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftAssignment {
    pub aircraft_id: EntityId,
    pub call_sign: CallSign,
    pub name: String,
    pub loadout: Loadout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightGroupPlan {
    pub task: FlightGroupTask,
    pub home_base_id: EntityId,
    pub call_sign: String,
    pub flight_number: u32,
    pub aircraft: Vec<AircraftAssignment>,
    pub route: Route,
    pub cruise_speed: f64,
}

impl FlightGroupPlan {
    pub fn name(&self) -> String {
        format!("{} {}", self.call_sign, self.flight_number)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackagePlan {
    pub task: Task,
    pub frequency: f64,
    pub flight_groups: Vec<FlightGroupPlan>,
}

/// Package holding one flight group flown from `candidate`.
pub(crate) fn single_flight_package(
    world: &World,
    rng: &mut ChaCha8Rng,
    ctx: &PackageContext<'_>,
    task: FlightGroupTask,
    candidate: &BaseCandidate,
    route: Route,
    cruise_speed: f64,
) -> Result<PackagePlan, CampaignError> {
    let kind = task.task();
    let (call_sign, flight_number) = callsign::next_call_sign(world, ctx.coalition(), kind)?;
    let aircraft = crew::crew_flight(ctx, candidate, kind, &call_sign, flight_number)?;
    let frequency = crew::package_frequency(rng, ctx, kind, &candidate.aircraft_type);
    Ok(PackagePlan {
        task: kind,
        frequency,
        flight_groups: vec![FlightGroupPlan {
            task,
            home_base_id: candidate.base_id,
            call_sign,
            flight_number,
            aircraft,
            route,
            cruise_speed,
        }],
    })
}

/// Generate one package of `task` for the context's faction.
pub fn generate(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    ctx: &PackageContext<'_>,
    task: Task,
) -> Result<Option<EntityId>, CampaignError> {
    let plan = match task {
        Task::Awacs => awacs::plan(world, rng, ctx)?,
        Task::Cap => cap::plan(world, rng, ctx)?,
        Task::Strike => strike::plan_strike(world, rng, ctx)?,
        Task::Dead => strike::plan_dead(world, rng, ctx)?,
        Task::Cas => cas::plan(world, rng, ctx)?,
        Task::Csar => helicopter::plan_csar(world, rng, ctx)?,
        Task::AirAssault => helicopter::plan_air_assault(world, rng, ctx)?,
        Task::Escort | Task::Sead => {
            return Err(CampaignError::InvalidRequest(format!(
                "{task} flight groups are attached to an existing flight group"
            )))
        }
    };

    let Some(plan) = plan else {
        tracing::debug!(
            target: "dcc::packages",
            coalition = %ctx.coalition(),
            task = %task,
            "no candidate"
        );
        return Ok(None);
    };

    let package_id = commit_package(world, ctx.coalition(), plan)?;
    Ok(Some(package_id))
}

/// Attach an Escort or SEAD flight group to the package of `target_id`.
/// Returns the new flight group.
pub fn attach(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    ctx: &PackageContext<'_>,
    task: Task,
    target_id: EntityId,
) -> Result<Option<EntityId>, CampaignError> {
    if !task.is_support_task() {
        return Err(CampaignError::InvalidRequest(format!(
            "{task} cannot be attached to a flight group"
        )));
    }
    if world.coalition(target_id)? != ctx.coalition() {
        return Err(CampaignError::InvalidRequest(format!(
            "flight group {target_id} belongs to the other coalition"
        )));
    }
    let target = world.get_cloned::<FlightGroup>(target_id)?;

    let Some(plan) = support::plan(world, rng, ctx, task, target_id, &target)? else {
        tracing::debug!(
            target: "dcc::packages",
            coalition = %ctx.coalition(),
            task = %task,
            target_id = %target_id,
            "no candidate"
        );
        return Ok(None);
    };

    let flight_group_id = commit_flight_group(world, ctx.coalition(), target.package_id, plan)?;
    tracing::info!(
        target: "dcc::packages",
        coalition = %ctx.coalition(),
        task = %task,
        package = %target.package_id,
        flight_group = %flight_group_id,
        "flight group attached"
    );
    Ok(Some(flight_group_id))
}

/// Register a planned package with its flight groups and task the aircraft.
pub fn commit_package(
    world: &mut World,
    coalition: Coalition,
    plan: PackagePlan,
) -> Result<EntityId, CampaignError> {
    let start_time = plan
        .flight_groups
        .iter()
        .map(|fg| fg.route.start_time)
        .fold(f64::INFINITY, f64::min);
    let cruise_speed = plan
        .flight_groups
        .first()
        .map(|fg| fg.cruise_speed)
        .unwrap_or_default();
    let package_id = world.create(
        coalition,
        EntityRecord::Package(Package {
            task: plan.task,
            flight_group_ids: Vec::new(),
            start_time: if start_time.is_finite() { start_time } else { 0.0 },
            end_time: 0.0,
            task_end_time: 0.0,
            frequency: plan.frequency,
            cruise_speed,
        }),
    );

    let flight_groups = plan.flight_groups.len();
    let target = plan.flight_groups.first().and_then(|fg| fg.task.target_id());
    for fg in plan.flight_groups {
        commit_flight_group(world, coalition, package_id, fg)?;
    }

    tracing::info!(
        target: "dcc::packages",
        coalition = %coalition,
        task = %plan.task,
        package = %package_id,
        flight_groups,
        target_id = ?target,
        "package generated"
    );
    Ok(package_id)
}

/// Register one planned flight group inside an existing package and widen
/// the package window to cover it.
pub fn commit_flight_group(
    world: &mut World,
    coalition: Coalition,
    package_id: EntityId,
    plan: FlightGroupPlan,
) -> Result<EntityId, CampaignError> {
    let name = plan.name();
    let route = plan.route;
    let flight_group_id = world.create(
        coalition,
        EntityRecord::FlightGroup(FlightGroup {
            name,
            call_sign: plan.call_sign,
            flight_number: plan.flight_number,
            task: plan.task,
            package_id,
            home_base_id: plan.home_base_id,
            aircraft_ids: plan.aircraft.iter().map(|a| a.aircraft_id).collect(),
            waypoints: route.waypoints,
            start_time: route.start_time,
            time_on_target: route.time_on_target,
            task_end_time: route.task_end_time,
            landing_time: route.landing_time,
            cruise_speed: plan.cruise_speed,
            losses: 0,
        }),
    );

    for assignment in plan.aircraft {
        world.assign_aircraft(
            assignment.aircraft_id,
            flight_group_id,
            assignment.call_sign,
            assignment.name,
            assignment.loadout,
        )?;
    }

    world.modify::<Package, _>(package_id, |p| {
        let first = p.flight_group_ids.is_empty();
        p.flight_group_ids.push(flight_group_id);
        if first {
            p.start_time = route.start_time;
            p.end_time = route.landing_time;
            p.task_end_time = route.task_end_time;
        } else {
            p.start_time = p.start_time.min(route.start_time);
            p.end_time = p.end_time.max(route.landing_time);
            p.task_end_time = p.task_end_time.max(route.task_end_time);
        }
    })?;

    Ok(flight_group_id)
}
