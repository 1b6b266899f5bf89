//! Call signs.
//!
//! Each coalition draws from its own name pools. A flight group takes the
//! first (name, number) pair no live flight group of its coalition uses,
//! scanning every name for number 1 before moving on to number 2.

use std::collections::BTreeSet;

use dcc_core::components::{CallSign, FlightGroup};
use dcc_core::constants::FIRST_FLIGHT_NUMBER;
use dcc_core::enums::{Coalition, QueryKey, Task};

use crate::error::CampaignError;
use crate::world::World;

const BLUE_AWACS: &[&str] = &["Overlord", "Magic", "Wizard", "Focus", "Darkstar"];
const BLUE_FLIGHT: &[&str] = &[
    "Enfield", "Springfield", "Uzi", "Colt", "Dodge", "Ford", "Chevy", "Pontiac",
];
const BLUE_HELICOPTER: &[&str] = &["Pedro", "Jolly", "Dude", "Knife"];

const RED_AWACS: &[&str] = &["Bagration", "Kutuzov", "Suvorov"];
const RED_FLIGHT: &[&str] = &[
    "Sokol", "Berkut", "Strizh", "Rus", "Vityaz", "Sapsan", "Yastreb", "Orel",
];
const RED_HELICOPTER: &[&str] = &["Kazak", "Pchela", "Shmel", "Oduvanchik"];

const MAX_FLIGHT_NUMBER: u32 = 99;

fn pool(coalition: Coalition, task: Task) -> &'static [&'static str] {
    let red = coalition == Coalition::Red;
    match task {
        Task::Awacs if red => RED_AWACS,
        Task::Awacs => BLUE_AWACS,
        t if t.is_helicopter_task() && red => RED_HELICOPTER,
        t if t.is_helicopter_task() => BLUE_HELICOPTER,
        _ if red => RED_FLIGHT,
        _ => BLUE_FLIGHT,
    }
}

/// Next free call sign name and flight number for a new flight group.
pub fn next_call_sign(
    world: &World,
    coalition: Coalition,
    task: Task,
) -> Result<(String, u32), CampaignError> {
    let mut used = BTreeSet::new();
    for id in world.query(coalition, QueryKey::FlightGroups) {
        let fg = world.get::<FlightGroup>(id)?;
        used.insert((fg.call_sign.clone(), fg.flight_number));
    }

    let names = pool(coalition, task);
    for number in FIRST_FLIGHT_NUMBER..=MAX_FLIGHT_NUMBER {
        for name in names {
            if !used.contains(&(name.to_string(), number)) {
                return Ok((name.to_string(), number));
            }
        }
    }

    let overflow = used.iter().map(|(_, n)| *n).max().unwrap_or(0) + 1;
    Ok((names[0].to_string(), overflow))
}

/// Call sign and name of the `index`-th aircraft of a flight group.
pub fn aircraft_call_sign(name: &str, flight_number: u32, index: usize) -> (CallSign, String) {
    let unit = index as u32 + 1;
    (
        CallSign {
            name: name.to_string(),
            group: flight_number,
            unit,
        },
        format!("{name} {flight_number}-{unit}"),
    )
}
