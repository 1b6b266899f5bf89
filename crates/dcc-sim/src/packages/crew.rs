//! Aircraft allocation, loadouts and radio frequencies.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use dcc_core::components::{Aircraft, HomeBase};
use dcc_core::constants::{DEFAULT_FREQUENCY_MAX, DEFAULT_FREQUENCY_MIN};
use dcc_core::enums::{QueryKey, Task};
use dcc_core::types::{EntityId, Position};

use super::callsign::aircraft_call_sign;
use super::{AircraftAssignment, PackageContext};
use crate::error::CampaignError;
use crate::world::World;

/// Home base able to field a full flight of one aircraft type.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseCandidate {
    pub base_id: EntityId,
    pub position: Position,
    pub aircraft_type: String,
    pub aircraft_ids: Vec<EntityId>,
}

/// Bases of the faction with enough idle aircraft for a `task` flight.
///
/// Helicopter tasks look at FARPs first; everything else at airdromes,
/// then carriers. Within a base the faction's preferred type wins.
pub fn home_base_candidates(
    world: &World,
    ctx: &PackageContext<'_>,
    task: Task,
) -> Result<Vec<BaseCandidate>, CampaignError> {
    let coalition = ctx.coalition();
    let types = ctx.faction.aircraft_types_for(task);
    if types.is_empty() {
        return Ok(Vec::new());
    }
    let size = ctx.config.flight_group_size(task) as usize;
    let order = if task.is_helicopter_task() {
        [QueryKey::Farps, QueryKey::Airdromes, QueryKey::Carriers]
    } else {
        [QueryKey::Airdromes, QueryKey::Carriers, QueryKey::Farps]
    };

    let mut candidates = Vec::new();
    for key in order {
        for base_id in world.query(coalition, key) {
            let base = world.get::<HomeBase>(base_id)?;
            let mut by_type: Vec<Vec<EntityId>> = vec![Vec::new(); types.len()];
            for aircraft_id in &base.aircraft_ids {
                if !world.query_contains(coalition, QueryKey::AircraftIdle, *aircraft_id) {
                    continue;
                }
                let aircraft = world.get::<Aircraft>(*aircraft_id)?;
                if let Some(rank) = types.iter().position(|t| *t == aircraft.aircraft_type) {
                    by_type[rank].push(*aircraft_id);
                }
            }
            for (rank, mut ids) in by_type.into_iter().enumerate() {
                if ids.len() >= size {
                    ids.sort();
                    ids.truncate(size);
                    candidates.push(BaseCandidate {
                        base_id,
                        position: base.position,
                        aircraft_type: types[rank].clone(),
                        aircraft_ids: ids,
                    });
                    break;
                }
            }
        }
    }
    Ok(candidates)
}

/// Call signs and loadouts for every aircraft of a flight. Fails on the
/// first aircraft whose loadout cannot be resolved.
pub fn crew_flight(
    ctx: &PackageContext<'_>,
    candidate: &BaseCandidate,
    task: Task,
    call_sign: &str,
    flight_number: u32,
) -> Result<Vec<AircraftAssignment>, CampaignError> {
    let mut crew = Vec::with_capacity(candidate.aircraft_ids.len());
    for (index, aircraft_id) in candidate.aircraft_ids.iter().enumerate() {
        let loadout = ctx.data.resolve_loadout(&candidate.aircraft_type, task)?;
        let (sign, name) = aircraft_call_sign(call_sign, flight_number, index);
        crew.push(AircraftAssignment {
            aircraft_id: *aircraft_id,
            call_sign: sign,
            name,
            loadout,
        });
    }
    Ok(crew)
}

/// Package radio frequency in MHz.
///
/// AWACS packages use the coalition's fixed frequency. Others draw a whole
/// MHz value from the aircraft's band, or from the default band.
pub fn package_frequency(
    rng: &mut ChaCha8Rng,
    ctx: &PackageContext<'_>,
    task: Task,
    aircraft_type: &str,
) -> f64 {
    if task == Task::Awacs {
        return ctx.faction.awacs_frequency;
    }
    let (min, max) = ctx
        .data
        .frequency_range(aircraft_type)
        .map(|(min, max)| (min.ceil() as u32, max.floor() as u32))
        .filter(|(min, max)| min <= max)
        .unwrap_or((DEFAULT_FREQUENCY_MIN, DEFAULT_FREQUENCY_MAX));
    rng.gen_range(min..=max) as f64
}
