//! Air-tasking cycle: keep every coalition's live package count per task at
//! its configured quota.
//!
//! Strike, CAS, DEAD and air assault packages are only opened in daylight;
//! CSAR only while the coalition has pilots on the ground. Each new strike
//! and CAS package gets an escort, plus a SEAD flight when its target sits
//! under an enemy SAM umbrella.

use std::collections::BTreeMap;

use rand_chacha::ChaCha8Rng;

use dcc_core::components::{FlightGroup, Package};
use dcc_core::config::CampaignConfig;
use dcc_core::data::DataStore;
use dcc_core::enums::{Coalition, QueryKey, Task};
use dcc_core::events::CampaignEvent;
use dcc_core::types::{is_night, EntityId};

use crate::campaign::CampaignMeta;
use crate::error::CampaignError;
use crate::packages::target::threatened_by_sam;
use crate::packages::{self, PackageContext};
use crate::world::World;

/// Live packages of `coalition` by task.
pub fn live_packages(
    world: &World,
    coalition: Coalition,
) -> Result<BTreeMap<Task, u32>, CampaignError> {
    let mut counts = BTreeMap::new();
    for id in world.query(coalition, QueryKey::Packages) {
        let package = world.get::<Package>(id)?;
        *counts.entry(package.task).or_insert(0) += 1;
    }
    Ok(counts)
}

/// A configuration error skips the task for this cycle. Generation leaves
/// the registry untouched when it fails that way.
fn tolerate<T>(
    result: Result<Option<T>, CampaignError>,
    coalition: Coalition,
    task: Task,
) -> Result<Option<T>, CampaignError> {
    match result {
        Err(e @ CampaignError::Configuration(_)) => {
            tracing::warn!(
                target: "dcc::planning",
                coalition = %coalition,
                task = %task,
                error = %e,
                "package generation skipped"
            );
            Ok(None)
        }
        other => other,
    }
}

pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    meta: &CampaignMeta,
    data: &DataStore,
    config: &CampaignConfig,
    events: &mut Vec<CampaignEvent>,
) -> Result<(), CampaignError> {
    let night = is_night(meta.timer, config.night.start_hour, config.night.end_hour);

    for coalition in Coalition::COMBATANTS {
        let Some(faction) = meta.faction(coalition) else {
            continue;
        };
        let ctx = PackageContext {
            data,
            config,
            faction,
            timer: meta.timer,
        };
        let mut live = live_packages(world, coalition)?;

        for task in Task::PLANNED {
            if night && !task.flies_at_night() {
                continue;
            }
            if task == Task::Csar && world.query_count(coalition, QueryKey::DownedPilots) == 0 {
                continue;
            }
            let quota = config.package_quota(task, coalition);
            while live.get(&task).copied().unwrap_or(0) < quota {
                let generated = packages::generate(world, rng, &ctx, task);
                let Some(package_id) = tolerate(generated, coalition, task)? else {
                    break;
                };
                *live.entry(task).or_insert(0) += 1;
                events.push(CampaignEvent::PackageCreated {
                    package_id,
                    coalition,
                    task,
                });
                if task.is_escorted() {
                    attach_support(world, rng, &ctx, package_id)?;
                }
            }
        }
    }
    Ok(())
}

fn attach_support(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    ctx: &PackageContext<'_>,
    package_id: EntityId,
) -> Result<(), CampaignError> {
    let coalition = ctx.coalition();
    let Some(strike_id) = world.get::<Package>(package_id)?.flight_group_ids.first().copied() else {
        return Ok(());
    };

    let escort = packages::attach(world, rng, ctx, Task::Escort, strike_id);
    tolerate(escort, coalition, Task::Escort)?;

    let target = world.get::<FlightGroup>(strike_id)?.task.target_id();
    let Some(target_position) = target
        .and_then(|id| world.record(id).ok())
        .and_then(|record| record.position())
    else {
        return Ok(());
    };
    if threatened_by_sam(world, coalition.opposite(), &target_position)? {
        let sead = packages::attach(world, rng, ctx, Task::Sead, strike_id);
        tolerate(sead, coalition, Task::Sead)?;
    }
    Ok(())
}
