//! Target selection.
//!
//! Candidates are (home base, target) pairs; the pair with the smallest
//! base-to-target distance within the task's ceiling wins, ties going to
//! the lower base id and then the lower target id.

use std::collections::BTreeSet;

use dcc_core::components::*;
use dcc_core::constants::*;
use dcc_core::enums::{Coalition, GroundGroupState, QueryKey, Task};
use dcc_core::types::{EntityId, Position};

use crate::error::CampaignError;
use crate::world::World;

/// Target picked for a package.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetChoice {
    pub id: EntityId,
    pub position: Position,
    /// Engagement range for SAM targets, 0 otherwise.
    pub range: f64,
}

/// Targets already assigned to `coalition`'s flight groups of `task`.
pub fn targeted_ids(
    world: &World,
    coalition: Coalition,
    task: Task,
) -> Result<BTreeSet<EntityId>, CampaignError> {
    let mut ids = BTreeSet::new();
    for fg_id in world.query(coalition, QueryKey::FlightGroups) {
        let fg = world.get::<FlightGroup>(fg_id)?;
        if fg.task.task() == task {
            if let Some(target) = fg.task.target_id() {
                ids.insert(target);
            }
        }
    }
    Ok(ids)
}

/// Nearest target to `from` within `max_distance`. Strictly nearer wins, so
/// equal distances keep the earlier (lower id) candidate.
pub fn nearest(
    from: &Position,
    candidates: &[TargetChoice],
    max_distance: f64,
) -> Option<(TargetChoice, f64)> {
    let mut best: Option<(TargetChoice, f64)> = None;
    for candidate in candidates {
        let distance = from.distance_to(&candidate.position);
        if distance > max_distance {
            continue;
        }
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((*candidate, distance)),
        }
    }
    best
}

/// Best (base index, target) pair across all bases.
pub fn select(
    bases: &[Position],
    candidates: &[TargetChoice],
    max_distance: f64,
) -> Option<(usize, TargetChoice)> {
    let mut best: Option<(usize, TargetChoice, f64)> = None;
    for (index, base) in bases.iter().enumerate() {
        if let Some((target, distance)) = nearest(base, candidates, max_distance) {
            match best {
                Some((_, _, d)) if distance >= d => {}
                _ => best = Some((index, target, distance)),
            }
        }
    }
    best.map(|(index, target, _)| (index, target))
}

/// Living enemy buildings and unit camps not yet under strike.
pub fn strike_targets(world: &World, coalition: Coalition) -> Result<Vec<TargetChoice>, CampaignError> {
    let enemy = coalition.opposite();
    let taken = targeted_ids(world, coalition, Task::Strike)?;
    let mut ids = world.query(enemy, QueryKey::Buildings);
    ids.extend(world.query(enemy, QueryKey::UnitCamps));
    ids.sort();

    let mut out = Vec::new();
    for id in ids {
        if taken.contains(&id) {
            continue;
        }
        let structure = world.get::<Structure>(id)?;
        if structure.alive {
            out.push(TargetChoice {
                id,
                position: structure.position,
                range: 0.0,
            });
        }
    }
    Ok(out)
}

/// Operational enemy SAM sites not yet under DEAD attack.
pub fn dead_targets(world: &World, coalition: Coalition) -> Result<Vec<TargetChoice>, CampaignError> {
    let taken = targeted_ids(world, coalition, Task::Dead)?;
    let mut out = Vec::new();
    for id in world.query(coalition.opposite(), QueryKey::Sams) {
        if taken.contains(&id) {
            continue;
        }
        let sam = world.get::<SamSite>(id)?;
        if sam.operational {
            out.push(TargetChoice {
                id,
                position: sam.position,
                range: sam.range,
            });
        }
    }
    Ok(out)
}

/// Enemy ground groups holding or contesting an objective, not yet under CAS.
pub fn cas_targets(world: &World, coalition: Coalition) -> Result<Vec<TargetChoice>, CampaignError> {
    let taken = targeted_ids(world, coalition, Task::Cas)?;
    let mut out = Vec::new();
    for id in world.query(coalition.opposite(), QueryKey::GroundGroupsOnTarget) {
        if taken.contains(&id) {
            continue;
        }
        let group = world.get::<GroundGroup>(id)?;
        out.push(TargetChoice {
            id,
            position: group.position,
            range: 0.0,
        });
    }
    Ok(out)
}

/// Own downed pilots nobody is rescuing yet.
pub fn csar_targets(world: &World, coalition: Coalition) -> Result<Vec<TargetChoice>, CampaignError> {
    let taken = targeted_ids(world, coalition, Task::Csar)?;
    let mut out = Vec::new();
    for id in world.query(coalition, QueryKey::DownedPilots) {
        if taken.contains(&id) {
            continue;
        }
        let pilot = world.get::<DownedPilot>(id)?;
        out.push(TargetChoice {
            id,
            position: pilot.position,
            range: 0.0,
        });
    }
    Ok(out)
}

/// Enemy objectives without defenders that nobody of `coalition` is already
/// heading for.
pub fn air_assault_targets(
    world: &World,
    coalition: Coalition,
) -> Result<Vec<TargetChoice>, CampaignError> {
    let enemy = coalition.opposite();
    let taken = targeted_ids(world, coalition, Task::AirAssault)?;
    let mut out = Vec::new();
    for id in world.query(enemy, QueryKey::Objectives) {
        if taken.contains(&id) {
            continue;
        }
        let objective = world.get::<Objective>(id)?;
        if objective.incoming_ground_groups.contains_key(&coalition) {
            continue;
        }
        if defended(world, enemy, id)? {
            continue;
        }
        out.push(TargetChoice {
            id,
            position: objective.position,
            range: 0.0,
        });
    }
    Ok(out)
}

/// Whether `coalition` has a ground group sitting at `objective_id`.
pub fn defended(
    world: &World,
    coalition: Coalition,
    objective_id: EntityId,
) -> Result<bool, CampaignError> {
    for id in world.query(coalition, QueryKey::GroundGroupsOnTarget) {
        let group = world.get::<GroundGroup>(id)?;
        if group.target_objective_id == objective_id
            && matches!(
                group.state,
                GroundGroupState::OnObjective | GroundGroupState::OnTarget
            )
        {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Nearest home base of `coalition` to `from`, airdromes first.
pub fn nearest_home_base(
    world: &World,
    coalition: Coalition,
    from: &Position,
) -> Result<Option<Position>, CampaignError> {
    for key in [QueryKey::Airdromes, QueryKey::Carriers, QueryKey::Farps] {
        let mut bases = Vec::new();
        for id in world.query(coalition, key) {
            let base = world.get::<HomeBase>(id)?;
            bases.push(TargetChoice {
                id,
                position: base.position,
                range: 0.0,
            });
        }
        if let Some((base, _)) = nearest(from, &bases, f64::INFINITY) {
            return Ok(Some(base.position));
        }
    }
    Ok(None)
}

/// AWACS orbit behind the home base, on the far side from the enemy.
pub fn awacs_racetrack(home: &Position, enemy: &Position) -> Racetrack {
    let away = enemy.heading_to(home);
    Racetrack {
        start: home.offset(away, AWACS_RACETRACK_START),
        end: home.offset(away, AWACS_RACETRACK_END),
    }
}

/// CAP orbit across the threat axis, centred between the home base and the
/// enemy.
pub fn cap_racetrack(home: &Position, enemy: &Position) -> Racetrack {
    let from = home.as_dvec2();
    let direction = (enemy.as_dvec2() - from).normalize_or_zero();
    let center = from + direction * CAP_RACETRACK_OFFSET;
    let half = direction.perp() * (CAP_RACETRACK_LENGTH / 2.0);
    Racetrack {
        start: Position::from_dvec2(center - half),
        end: Position::from_dvec2(center + half),
    }
}

/// Whether an operational SAM of `enemy` covers `position`.
pub fn threatened_by_sam(
    world: &World,
    enemy: Coalition,
    position: &Position,
) -> Result<bool, CampaignError> {
    for id in world.query(enemy, QueryKey::Sams) {
        let sam = world.get::<SamSite>(id)?;
        if sam.operational && sam.position.distance_to(position) <= sam.range {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(id: u64, x: f64, y: f64) -> TargetChoice {
        TargetChoice {
            id: EntityId(id),
            position: Position::new(x, y),
            range: 0.0,
        }
    }

    #[test]
    fn test_nearest_respects_ceiling_and_ties() {
        let from = Position::new(0.0, 0.0);
        let candidates = [
            choice(3, 0.0, 10_000.0),
            choice(4, 10_000.0, 0.0),
            choice(5, 200_000.0, 0.0),
        ];
        let (best, distance) = nearest(&from, &candidates, 150_000.0).unwrap();
        assert_eq!(best.id, EntityId(3));
        assert_eq!(distance, 10_000.0);
        assert!(nearest(&from, &candidates[2..], 150_000.0).is_none());
    }

    #[test]
    fn test_select_prefers_closest_pair() {
        let bases = [Position::new(0.0, 0.0), Position::new(90_000.0, 0.0)];
        let candidates = [choice(7, 100_000.0, 0.0), choice(8, -50_000.0, 0.0)];
        let (index, target) = select(&bases, &candidates, 150_000.0).unwrap();
        assert_eq!(index, 1);
        assert_eq!(target.id, EntityId(7));
    }

    #[test]
    fn test_racetracks_orientation() {
        let home = Position::new(0.0, 0.0);
        let enemy = Position::new(100_000.0, 0.0);

        let awacs = awacs_racetrack(&home, &enemy);
        assert!((awacs.start.x + AWACS_RACETRACK_START).abs() < 1e-6);
        assert!((awacs.end.x + AWACS_RACETRACK_END).abs() < 1e-6);

        let cap = cap_racetrack(&home, &enemy);
        assert!((cap.start.x - CAP_RACETRACK_OFFSET).abs() < 1e-6);
        assert!((cap.start.distance_to(&cap.end) - CAP_RACETRACK_LENGTH).abs() < 1e-6);
    }
}
