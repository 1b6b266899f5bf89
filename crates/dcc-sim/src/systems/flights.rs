//! Flight group and aircraft states derived from the campaign timer.

use dcc_core::components::{Aircraft, FlightGroup};
use dcc_core::enums::{AircraftState, Coalition, FlightGroupState, QueryKey};

use crate::error::CampaignError;
use crate::world::World;

/// Lifecycle state of a flight group at `timer`.
pub fn flight_group_state(fg: &FlightGroup, timer: f64) -> FlightGroupState {
    if fg.aircraft_ids.is_empty() && fg.losses > 0 {
        FlightGroupState::Lost
    } else if timer < fg.start_time {
        FlightGroupState::Planned
    } else if timer < fg.time_on_target {
        FlightGroupState::Airborne
    } else if timer < fg.task_end_time {
        FlightGroupState::OnTask
    } else if timer < fg.landing_time {
        FlightGroupState::Returning
    } else {
        FlightGroupState::Landed
    }
}

pub fn is_finished(state: FlightGroupState) -> bool {
    matches!(state, FlightGroupState::Landed | FlightGroupState::Lost)
}

pub fn aircraft_state(
    world: &World,
    aircraft: &Aircraft,
    timer: f64,
) -> Result<AircraftState, CampaignError> {
    let Some(fg_id) = aircraft.flight_group_id else {
        return Ok(AircraftState::Idle);
    };
    let fg = world.get::<FlightGroup>(fg_id)?;
    Ok(match flight_group_state(&fg, timer) {
        FlightGroupState::Returning | FlightGroupState::Landed => AircraftState::Returning,
        _ => AircraftState::Tasked,
    })
}

/// Whether any aircraft of the flight group is a client slot.
pub fn has_client(world: &World, fg: &FlightGroup) -> Result<bool, CampaignError> {
    for id in &fg.aircraft_ids {
        if world.get::<Aircraft>(*id)?.is_client {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Earliest start, strictly after `timer`, of a blue flight group with a
/// client slot.
pub fn next_client_start(world: &World, timer: f64) -> Result<Option<f64>, CampaignError> {
    let mut next: Option<f64> = None;
    for id in world.query(Coalition::Blue, QueryKey::FlightGroups) {
        let fg = world.get::<FlightGroup>(id)?;
        if fg.start_time > timer && has_client(world, &fg)? {
            next = Some(next.map_or(fg.start_time, |n| n.min(fg.start_time)));
        }
    }
    Ok(next)
}
