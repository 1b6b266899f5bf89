//! Deployment and repair scores.
//!
//! Both scores grow with elapsed campaign time since the faction's
//! `score_timer`:
//!
//! - deployment: `base * coalition multiplier * health * hours`, where
//!   health is `1 - sum of penalty weights of destroyed structures`,
//!   floored at 0;
//! - repair: `seconds * coalition multiplier * alive structure ratio`.
//!
//! Accumulation only writes the faction's score fields. Repairs spend the
//! repair score separately.

use dcc_core::components::Structure;
use dcc_core::config::CampaignConfig;
use dcc_core::constants::SECONDS_PER_HOUR;
use dcc_core::enums::QueryKey;
use dcc_core::events::CampaignEvent;
use dcc_core::types::EntityId;

use crate::campaign::Faction;
use crate::error::CampaignError;
use crate::world::World;

/// Structures owned by the faction's coalition, in id order.
fn structures(world: &World, faction: &Faction) -> Result<Vec<(EntityId, Structure)>, CampaignError> {
    let mut ids = world.query(faction.coalition, QueryKey::Buildings);
    ids.extend(world.query(faction.coalition, QueryKey::UnitCamps));
    ids.sort();
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        out.push((id, world.get_cloned::<Structure>(id)?));
    }
    Ok(out)
}

pub fn health(config: &CampaignConfig, structures: &[(EntityId, Structure)]) -> f64 {
    let penalty: f64 = structures
        .iter()
        .filter(|(_, s)| !s.alive)
        .map(|(_, s)| config.deployment.penalty.weight(s.structure_type))
        .sum();
    (1.0 - penalty).max(0.0)
}

pub fn alive_ratio(structures: &[(EntityId, Structure)]) -> f64 {
    if structures.is_empty() {
        return 1.0;
    }
    let alive = structures.iter().filter(|(_, s)| s.alive).count();
    alive as f64 / structures.len() as f64
}

/// Grow both scores up to `timer`.
pub fn accumulate(
    world: &World,
    faction: &mut Faction,
    config: &CampaignConfig,
    timer: f64,
) -> Result<(), CampaignError> {
    let elapsed = (timer - faction.score_timer).max(0.0);
    faction.score_timer = faction.score_timer.max(timer);
    if elapsed == 0.0 {
        return Ok(());
    }

    let structures = structures(world, faction)?;
    let multiplier = config.deployment.coalition_multiplier.get(faction.coalition);

    let deployment =
        config.deployment.base * multiplier * health(config, &structures) * elapsed / SECONDS_PER_HOUR;
    let repair = elapsed * multiplier * alive_ratio(&structures);

    faction.deployment_score = (faction.deployment_score + deployment).max(0.0);
    faction.repair_score = (faction.repair_score + repair).max(0.0);
    Ok(())
}

/// Restore destroyed structures, oldest first, while the repair score
/// covers the threshold.
pub fn apply_repairs(
    world: &mut World,
    faction: &mut Faction,
    config: &CampaignConfig,
    events: &mut Vec<CampaignEvent>,
) -> Result<(), CampaignError> {
    let threshold = config.repair.threshold;
    if threshold <= 0.0 {
        return Ok(());
    }

    let mut destroyed: Vec<(f64, EntityId, String)> = structures(world, faction)?
        .into_iter()
        .filter(|(_, s)| !s.alive)
        .map(|(id, s)| (s.destroyed_time.unwrap_or(0.0), id, s.name))
        .collect();
    destroyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    for (_, id, name) in destroyed {
        if faction.repair_score < threshold {
            break;
        }
        world.update::<Structure, _>(id, |s| {
            s.alive = true;
            s.destroyed_time = None;
        })?;
        faction.repair_score -= threshold;
        tracing::info!(
            target: "dcc::scores",
            coalition = %faction.coalition,
            structure = %name,
            "structure repaired"
        );
        events.push(CampaignEvent::StructureRepaired {
            structure: name,
            coalition: faction.coalition,
        });
    }
    Ok(())
}
