//! Builds the read-only [`CampaignStateView`] handed to the host.

use std::collections::BTreeMap;

use dcc_core::components::*;
use dcc_core::data::DataStore;
use dcc_core::enums::{Coalition, QueryKey};
use dcc_core::state::*;
use dcc_core::types::EntityId;

use super::flights::{aircraft_state, flight_group_state, has_client};
use crate::campaign::{CampaignMeta, Faction};
use crate::error::CampaignError;
use crate::world::World;

pub fn build_state(
    world: &World,
    meta: &CampaignMeta,
    data: &DataStore,
) -> Result<CampaignStateView, CampaignError> {
    let faction_view = |faction: &Option<Faction>| -> Result<Option<FactionView>, CampaignError> {
        faction
            .as_ref()
            .map(|f| build_faction(world, data, f, meta.timer))
            .transpose()
    };

    let mut objectives = BTreeMap::new();
    for coalition in Coalition::ALL {
        for id in world.query(coalition, QueryKey::Objectives) {
            let view = build_objective(world, coalition, id)?;
            objectives.insert(view.name.clone(), view);
        }
    }

    Ok(CampaignStateView {
        active: meta.active,
        name: meta.name.clone(),
        scenario: meta.scenario.clone(),
        timer: meta.timer,
        paused: meta.paused,
        multiplier: meta.multiplier,
        winner: meta.winner,
        hardcore: meta.hardcore,
        next_day: meta.next_day,
        mission_id: meta.mission_id.clone(),
        selected_flight_group: meta.selected_flight_group,
        ai_skill: meta.ai_skill,
        round: meta.round,
        blue_faction: faction_view(&meta.blue_faction)?,
        red_faction: faction_view(&meta.red_faction)?,
        objectives,
    })
}

fn home_base_name(world: &World, id: EntityId) -> String {
    world
        .get::<HomeBase>(id)
        .map(|b| b.name.clone())
        .unwrap_or_default()
}

fn objective_name(world: &World, id: EntityId) -> String {
    world
        .get::<Objective>(id)
        .map(|o| o.name.clone())
        .unwrap_or_default()
}

fn build_faction(
    world: &World,
    data: &DataStore,
    faction: &Faction,
    timer: f64,
) -> Result<FactionView, CampaignError> {
    let coalition = faction.coalition;

    let mut inventory = InventoryView::default();
    for id in world.query(coalition, QueryKey::Aircraft) {
        let aircraft = world.get_cloned::<Aircraft>(id)?;
        let display_name = data
            .aircraft(&aircraft.aircraft_type)
            .map(|d| d.display_name.clone())
            .unwrap_or_else(|_| aircraft.aircraft_type.clone());
        let (a2a_weapons, a2a_range) = aircraft
            .loadout
            .as_ref()
            .map(|l| (l.a2a_weapons(), l.a2a_range()))
            .unwrap_or_default();
        inventory.aircrafts.insert(
            id,
            AircraftView {
                id,
                state: aircraft_state(world, &aircraft, timer)?,
                display_name,
                home_base_name: home_base_name(world, aircraft.home_base_id),
                aircraft_type: aircraft.aircraft_type,
                home_base_id: aircraft.home_base_id,
                flight_group_id: aircraft.flight_group_id,
                call_sign: aircraft.call_sign,
                name: aircraft.name,
                onboard_number: aircraft.onboard_number,
                is_client: aircraft.is_client,
                loadout: aircraft.loadout,
                a2a_weapons,
                a2a_range,
            },
        );
    }

    let mut ground_groups = Vec::new();
    for id in world.query(coalition, QueryKey::GroundGroups) {
        let group = world.get_cloned::<GroundGroup>(id)?;
        let mut alive_units = 0;
        for unit_id in group.all_unit_ids() {
            let unit = world.get::<GroundUnit>(unit_id)?;
            inventory.ground_units.insert(
                unit_id,
                GroundUnitView {
                    id: unit_id,
                    name: unit.name.clone(),
                    unit_type: unit.unit_type.clone(),
                    category: unit.category,
                    group_id: unit.group_id,
                    alive: unit.alive,
                },
            );
            if unit.alive {
                alive_units += 1;
            }
        }
        ground_groups.push(GroundGroupView {
            id,
            name: group.name,
            group_type: group.group_type,
            state: group.state,
            position: group.position,
            start_objective: objective_name(world, group.start_objective_id),
            target_objective: objective_name(world, group.target_objective_id),
            alive_units,
        });
    }

    let mut home_bases = Vec::new();
    for key in [QueryKey::Airdromes, QueryKey::Farps, QueryKey::Carriers] {
        for id in world.query(coalition, key) {
            let base = world.get::<HomeBase>(id)?;
            home_bases.push(HomeBaseView {
                id,
                name: base.name.clone(),
                kind: world.entity_type(id)?,
                position: base.position,
                aircraft_count: base.aircraft_ids.len(),
            });
        }
    }

    let mut packages = Vec::new();
    for id in world.query(coalition, QueryKey::Packages) {
        let package = world.get_cloned::<Package>(id)?;
        let mut flight_groups = Vec::with_capacity(package.flight_group_ids.len());
        for fg_id in &package.flight_group_ids {
            let fg = world.get_cloned::<FlightGroup>(*fg_id)?;
            flight_groups.push(FlightGroupView {
                id: *fg_id,
                state: flight_group_state(&fg, timer),
                has_client: has_client(world, &fg)?,
                home_base_name: home_base_name(world, fg.home_base_id),
                name: fg.name,
                task: fg.task,
                home_base_id: fg.home_base_id,
                start_time: fg.start_time,
                time_on_target: fg.time_on_target,
                task_end_time: fg.task_end_time,
                landing_time: fg.landing_time,
                aircraft_ids: fg.aircraft_ids,
                waypoints: fg.waypoints,
                losses: fg.losses,
            });
        }
        packages.push(PackageView {
            id,
            task: package.task,
            start_time: package.start_time,
            end_time: package.end_time,
            task_end_time: package.task_end_time,
            frequency: package.frequency,
            cruise_speed: package.cruise_speed,
            flight_groups,
        });
    }

    let sams = world
        .query(coalition, QueryKey::Sams)
        .into_iter()
        .map(|id| {
            let sam = world.get::<SamSite>(id)?;
            Ok(SamView {
                id,
                name: sam.name.clone(),
                position: sam.position,
                range: sam.range,
                operational: sam.operational,
            })
        })
        .collect::<Result<Vec<_>, CampaignError>>()?;

    let downed_pilots = world
        .query(coalition, QueryKey::DownedPilots)
        .into_iter()
        .map(|id| {
            let pilot = world.get::<DownedPilot>(id)?;
            Ok(DownedPilotView {
                id,
                name: pilot.name.clone(),
                position: pilot.position,
                time: pilot.time,
            })
        })
        .collect::<Result<Vec<_>, CampaignError>>()?;

    Ok(FactionView {
        name: faction.name.clone(),
        coalition,
        country_name: faction.country_name.clone(),
        awacs_frequency: faction.awacs_frequency,
        deployment_score: faction.deployment_score,
        repair_score: faction.repair_score,
        reinforcement_timer: faction.reinforcement_timer,
        inventory,
        home_bases,
        packages,
        ground_groups,
        sams,
        downed_pilots,
    })
}

fn build_objective(
    world: &World,
    coalition: Coalition,
    id: EntityId,
) -> Result<ObjectiveView, CampaignError> {
    let objective = world.get_cloned::<Objective>(id)?;
    let mut structures = Vec::with_capacity(objective.structure_ids.len());
    for structure_id in &objective.structure_ids {
        let structure = world.get::<Structure>(*structure_id)?;
        structures.push(StructureView {
            id: *structure_id,
            name: structure.name.clone(),
            kind: world.entity_type(*structure_id)?,
            structure_type: structure.structure_type,
            position: structure.position,
            alive: structure.alive,
        });
    }
    Ok(ObjectiveView {
        id,
        name: objective.name,
        coalition,
        position: objective.position,
        deployment_timer: objective.deployment_timer,
        deployment_delay: objective.deployment_delay,
        structures,
        incoming_ground_groups: objective.incoming_ground_groups,
    })
}
