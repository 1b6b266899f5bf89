//! Campaign creation.
//!
//! Builds a fresh registry from a scenario: home bases, aircraft inventory,
//! objectives with their structures and SAM sites, and the initial ground
//! groups. Everything is built into a new `World`, so a configuration error
//! leaves the caller's registry untouched.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use dcc_core::components::*;
use dcc_core::config::CampaignConfig;
use dcc_core::constants::*;
use dcc_core::data::{DataStore, DataStoreError, ScenarioSide};
use dcc_core::enums::*;
use dcc_core::types::{minutes, EntityId, Position};

use crate::campaign::Faction;
use crate::error::CampaignError;
use crate::world::World;

/// Result of building a campaign.
pub struct NewCampaign {
    pub world: World,
    pub scenario: String,
    pub blue: Faction,
    pub red: Faction,
}

/// Build a complete campaign world for two factions on a scenario.
pub fn create_campaign(
    data: &DataStore,
    config: &CampaignConfig,
    rng: &mut ChaCha8Rng,
    blue_faction: &str,
    red_faction: &str,
    scenario: Option<&str>,
    timer: f64,
) -> Result<NewCampaign, CampaignError> {
    let scenario = data.scenario(scenario)?;
    let blue_definition = data.faction(blue_faction)?;
    let red_definition = data.faction(red_faction)?;

    let mut world = World::new();
    create_home_bases(&mut world, data, Coalition::Blue, &scenario.blue)?;
    create_home_bases(&mut world, data, Coalition::Red, &scenario.red)?;

    let blue = Faction::from_definition(
        blue_definition,
        Coalition::Blue,
        &scenario.blue,
        config,
        timer,
    );
    let red = Faction::from_definition(red_definition, Coalition::Red, &scenario.red, config, timer);

    top_up_inventory(&mut world, data, config, rng, &blue)?;
    top_up_inventory(&mut world, data, config, rng, &red)?;

    // Scenario-listed objectives first, then every other data-store
    // objective. Unlisted objectives belong to red.
    let mut names: Vec<&String> = scenario.blue.objective_names.iter().collect();
    for name in scenario.red.objective_names.iter().chain(data.objectives.keys()) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    for name in names {
        let coalition = if scenario.blue.objective_names.contains(name) {
            Coalition::Blue
        } else {
            Coalition::Red
        };
        let faction = if coalition == Coalition::Blue {
            &blue
        } else {
            &red
        };
        create_objective(&mut world, data, config, rng, faction, name, timer)?;
    }

    tracing::info!(
        target: "dcc::setup",
        scenario = %scenario.name,
        blue = %blue.name,
        red = %red.name,
        entities = world.len(),
        "campaign created"
    );

    Ok(NewCampaign {
        world,
        scenario: scenario.name.clone(),
        blue,
        red,
    })
}

fn create_home_bases(
    world: &mut World,
    data: &DataStore,
    coalition: Coalition,
    side: &ScenarioSide,
) -> Result<(), CampaignError> {
    for name in &side.airdrome_names {
        let definition = data.airdrome(name)?;
        world.create(
            coalition,
            EntityRecord::Airdrome(HomeBase {
                name: definition.name.clone(),
                position: definition.position,
                aircraft_ids: Vec::new(),
            }),
        );
    }
    for farp in &side.farps {
        world.create(
            coalition,
            EntityRecord::Farp(HomeBase {
                name: farp.name.clone(),
                position: farp.position,
                aircraft_ids: Vec::new(),
            }),
        );
    }
    for carrier in &side.carriers {
        world.create(
            coalition,
            EntityRecord::Carrier(HomeBase {
                name: carrier.name.clone(),
                position: carrier.position,
                aircraft_ids: Vec::new(),
            }),
        );
    }
    Ok(())
}

fn create_objective(
    world: &mut World,
    data: &DataStore,
    config: &CampaignConfig,
    rng: &mut ChaCha8Rng,
    faction: &Faction,
    name: &str,
    timer: f64,
) -> Result<EntityId, CampaignError> {
    let coalition = faction.coalition;
    let definition = data
        .objectives
        .get(name)
        .ok_or_else(|| DataStoreError::UnknownObjective(name.to_string()))?;

    let objective_id = world.create(
        coalition,
        EntityRecord::Objective(Objective {
            name: definition.name.clone(),
            position: definition.position,
            deployment_timer: timer,
            deployment_delay: minutes(config.deployment.delay_minutes.get(coalition)),
            structure_ids: Vec::new(),
            sam_ids: Vec::new(),
            incoming_ground_groups: BTreeMap::new(),
        }),
    );

    let mut structure_ids = Vec::new();
    let mut sam_ids = Vec::new();
    let mut has_vehicles = false;
    for target in data.strike_targets_of(name) {
        match target.kind {
            StrikeTargetKind::Structure => {
                let Some(structure_type) = target.structure_type else {
                    tracing::warn!(
                        target: "dcc::setup",
                        objective = name,
                        structure = %target.name,
                        "structure target without structure type skipped"
                    );
                    continue;
                };
                let structure = Structure {
                    name: target.name.clone(),
                    structure_type,
                    position: target.position,
                    objective_id,
                    alive: true,
                    destroyed_time: None,
                };
                let record = if structure_type.is_unit_camp() {
                    EntityRecord::UnitCamp(structure)
                } else {
                    EntityRecord::Building(structure)
                };
                structure_ids.push(world.create(coalition, record));
            }
            StrikeTargetKind::Sam => {
                sam_ids.push(world.create(
                    coalition,
                    EntityRecord::Sam(SamSite {
                        name: target.name.clone(),
                        position: target.position,
                        objective_id,
                        range: target.range.unwrap_or(DEFAULT_SAM_RANGE),
                        operational: true,
                        destroyed_time: None,
                    }),
                ));
            }
            StrikeTargetKind::Vehicle => has_vehicles = true,
        }
    }

    world.modify::<Objective, _>(objective_id, |o| {
        o.structure_ids = structure_ids;
        o.sam_ids = sam_ids;
    })?;

    if has_vehicles {
        create_ground_group(
            world,
            rng,
            faction,
            objective_id,
            objective_id,
            definition.position,
            timer,
            None,
            GroundGroupState::OnObjective,
        )?;
    }

    Ok(objective_id)
}

/// Create a ground group with its units. The group is armor when a
/// 1..=100 roll beats [`ARMOR_ROLL_THRESHOLD`], unless `group_type` forces it.
#[allow(clippy::too_many_arguments)]
pub fn create_ground_group(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    faction: &Faction,
    start_objective_id: EntityId,
    target_objective_id: EntityId,
    position: Position,
    timer: f64,
    group_type: Option<GroundGroupType>,
    state: GroundGroupState,
) -> Result<EntityId, CampaignError> {
    let coalition = faction.coalition;
    let group_type = group_type.unwrap_or_else(|| {
        if rng.gen_range(1..=100) > ARMOR_ROLL_THRESHOLD {
            GroundGroupType::Armor
        } else {
            GroundGroupType::Infantry
        }
    });

    let name = format!("Ground Group {}", world.next_id());
    let group_id = world.create(
        coalition,
        EntityRecord::GroundGroup(GroundGroup {
            name: name.clone(),
            group_type,
            start_objective_id,
            target_objective_id,
            position,
            state,
            unit_ids: Vec::new(),
            shorad_unit_ids: Vec::new(),
            start_time: timer,
        }),
    );

    let (pool, category) = match group_type {
        GroundGroupType::Armor => (&faction.vehicles, GroundUnitCategory::Armor),
        GroundGroupType::Infantry => (&faction.infantries, GroundUnitCategory::Infantry),
    };
    let count = rng.gen_range(GROUND_GROUP_MIN_UNITS..=GROUND_GROUP_MAX_UNITS);
    let mut unit_ids = Vec::with_capacity(count as usize);
    for i in 0..count {
        let Some(unit_type) = pool.choose(rng).cloned() else {
            break;
        };
        unit_ids.push(world.create(
            coalition,
            EntityRecord::GroundUnit(GroundUnit {
                name: format!("{name}|{}", i + 1),
                unit_type,
                category,
                group_id,
                alive: true,
                destroyed_time: None,
            }),
        ));
    }

    let mut shorad_unit_ids = Vec::new();
    if group_type == GroundGroupType::Armor {
        let shorad = rng.gen_range(0..=GROUND_GROUP_MAX_SHORAD);
        for i in 0..shorad {
            let Some(unit_type) = faction.shorad.choose(rng).cloned() else {
                break;
            };
            shorad_unit_ids.push(world.create(
                coalition,
                EntityRecord::GroundUnit(GroundUnit {
                    name: format!("{name}|SHORAD {}", i + 1),
                    unit_type,
                    category: GroundUnitCategory::AirDefence,
                    group_id,
                    alive: true,
                    destroyed_time: None,
                }),
            ));
        }
    }

    world.modify::<GroundGroup, _>(group_id, |g| {
        g.unit_ids = unit_ids;
        g.shorad_unit_ids = shorad_unit_ids;
    })?;

    Ok(group_id)
}

/// Aircraft count each type should reach: every task's inventory target is
/// booked under the task's primary aircraft type.
pub fn inventory_targets(faction: &Faction, config: &CampaignConfig) -> BTreeMap<String, u32> {
    let mut targets = BTreeMap::new();
    for task in Task::ALL {
        if let Some(aircraft_type) = faction.primary_aircraft_type(task) {
            *targets.entry(aircraft_type.to_string()).or_insert(0) += config.inventory_target(task);
        }
    }
    targets
}

/// Create aircraft until every type reaches its inventory target.
/// Returns the number of aircraft created.
pub fn top_up_inventory(
    world: &mut World,
    data: &DataStore,
    config: &CampaignConfig,
    rng: &mut ChaCha8Rng,
    faction: &Faction,
) -> Result<u32, CampaignError> {
    let coalition = faction.coalition;

    let mut current: BTreeMap<String, u32> = BTreeMap::new();
    for id in world.query(coalition, QueryKey::Aircraft) {
        let aircraft = world.get::<Aircraft>(id)?;
        *current.entry(aircraft.aircraft_type.clone()).or_insert(0) += 1;
    }

    // Resolve every type before the first aircraft is created.
    let mut plan = Vec::new();
    for (aircraft_type, target) in inventory_targets(faction, config) {
        let missing = target.saturating_sub(current.get(&aircraft_type).copied().unwrap_or(0));
        if missing == 0 {
            continue;
        }
        let is_helicopter = data.aircraft(&aircraft_type)?.is_helicopter;
        plan.push((aircraft_type, missing, is_helicopter));
    }

    let airdromes = world.query(coalition, QueryKey::Airdromes);
    let farps = world.query(coalition, QueryKey::Farps);
    let carriers = world.query(coalition, QueryKey::Carriers);

    let mut created = 0;
    for (aircraft_type, missing, is_helicopter) in plan {
        let bases = if faction.carrier_aircraft_types.contains(&aircraft_type) && !carriers.is_empty()
        {
            &carriers
        } else if is_helicopter && !farps.is_empty() {
            &farps
        } else if !airdromes.is_empty() {
            &airdromes
        } else if !farps.is_empty() {
            &farps
        } else {
            &carriers
        };
        if bases.is_empty() {
            tracing::warn!(
                target: "dcc::setup",
                coalition = %coalition,
                aircraft_type = %aircraft_type,
                "no home base for aircraft type"
            );
            continue;
        }

        let mut counts: BTreeMap<EntityId, usize> = BTreeMap::new();
        for base_id in bases {
            let base = world.get::<HomeBase>(*base_id)?;
            let mut count = 0;
            for aircraft_id in &base.aircraft_ids {
                if world.get::<Aircraft>(*aircraft_id)?.aircraft_type == aircraft_type {
                    count += 1;
                }
            }
            counts.insert(*base_id, count);
        }

        for _ in 0..missing {
            let Some((&base_id, _)) = counts.iter().min_by_key(|(id, count)| (**count, **id)) else {
                break;
            };
            let aircraft_id = world.create(
                coalition,
                EntityRecord::Aircraft(Aircraft {
                    aircraft_type: aircraft_type.clone(),
                    home_base_id: base_id,
                    flight_group_id: None,
                    call_sign: None,
                    name: None,
                    onboard_number: rng.gen_range(ONBOARD_NUMBER_MIN..=ONBOARD_NUMBER_MAX),
                    is_client: false,
                    loadout: None,
                    alive: true,
                }),
            );
            world.modify::<HomeBase, _>(base_id, |b| b.aircraft_ids.push(aircraft_id))?;
            if let Some(count) = counts.get_mut(&base_id) {
                *count += 1;
            }
            created += 1;
        }
    }

    Ok(created)
}
