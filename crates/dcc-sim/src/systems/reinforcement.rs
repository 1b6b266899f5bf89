//! Periodic aircraft reinforcement.

use rand_chacha::ChaCha8Rng;

use dcc_core::config::CampaignConfig;
use dcc_core::data::DataStore;
use dcc_core::enums::Coalition;
use dcc_core::events::CampaignEvent;

use crate::campaign::CampaignMeta;
use crate::error::CampaignError;
use crate::world::World;
use crate::world_setup::top_up_inventory;

/// Top each faction's inventory back up once its reinforcement delay has
/// elapsed, then restart the delay.
pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    meta: &mut CampaignMeta,
    data: &DataStore,
    config: &CampaignConfig,
    events: &mut Vec<CampaignEvent>,
) -> Result<(), CampaignError> {
    let timer = meta.timer;
    for coalition in Coalition::COMBATANTS {
        let Some(faction) = meta.faction(coalition) else {
            continue;
        };
        if timer < faction.reinforcement_timer + faction.reinforcement_delay {
            continue;
        }
        let created = top_up_inventory(world, data, config, rng, faction)?;
        if let Some(faction) = meta.faction_mut(coalition) {
            faction.reinforcement_timer = timer;
        }
        if created > 0 {
            tracing::info!(
                target: "dcc::reinforcement",
                coalition = %coalition,
                aircraft = created,
                "inventory reinforced"
            );
            events.push(CampaignEvent::Reinforced {
                coalition,
                aircraft: created,
            });
        }
    }
    Ok(())
}
