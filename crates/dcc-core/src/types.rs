//! Fundamental geometric and timing types.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR};

/// Stable identifier of a registry entity.
///
/// Ids are handed out from a monotonic counter and are never reused
/// within one registry, including across snapshot round-trips.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position on the map plane in meters.
/// x = North, y = East.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn as_dvec2(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn from_dvec2(v: DVec2) -> Self {
        Self { x: v.x, y: v.y }
    }

    /// Straight-line distance to another position in meters.
    pub fn distance_to(&self, other: &Position) -> f64 {
        self.as_dvec2().distance(other.as_dvec2())
    }

    /// Heading to another position in degrees, 0 = North, clockwise, in [0, 360).
    pub fn heading_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        normalize_heading(dy.atan2(dx).to_degrees())
    }

    /// Position `distance` meters away along `heading` (degrees).
    pub fn offset(&self, heading: f64, distance: f64) -> Position {
        let rad = normalize_heading(heading).to_radians();
        Position::new(self.x + rad.cos() * distance, self.y + rad.sin() * distance)
    }

    /// Advance toward `target` by at most `step` meters.
    /// Returns the new position and whether the target was reached.
    pub fn step_toward(&self, target: &Position, step: f64) -> (Position, bool) {
        let from = self.as_dvec2();
        let to = target.as_dvec2();
        let remaining = from.distance(to);
        if remaining <= step {
            return (*target, true);
        }
        let dir = (to - from) / remaining;
        (Position::from_dvec2(from + dir * step), false)
    }
}

/// Wrap a heading into [0, 360).
pub fn normalize_heading(heading: f64) -> f64 {
    let h = heading.rem_euclid(360.0);
    if h >= 360.0 {
        0.0
    } else {
        h
    }
}

/// Add `delta` degrees to a heading, wrapping into [0, 360).
pub fn add_heading(heading: f64, delta: f64) -> f64 {
    normalize_heading(heading + delta)
}

/// Seconds needed to travel between two positions at `speed` m/s.
pub fn travel_time(from: &Position, to: &Position, speed: f64) -> f64 {
    if speed <= 0.0 {
        return 0.0;
    }
    from.distance_to(to) / speed
}

pub fn minutes(m: f64) -> f64 {
    m * 60.0
}

pub fn hours(h: f64) -> f64 {
    h * SECONDS_PER_HOUR
}

/// Campaign day (0-based) of a timer value.
pub fn day_of(timer: f64) -> u32 {
    (timer / SECONDS_PER_DAY).floor().max(0.0) as u32
}

/// Hour of day in [0, 24) for a timer value.
pub fn hour_of_day(timer: f64) -> f64 {
    timer.rem_euclid(SECONDS_PER_DAY) / SECONDS_PER_HOUR
}

/// Timer value of `hour` o'clock on the day after the one containing `timer`.
pub fn next_day_at(timer: f64, hour: f64) -> f64 {
    (day_of(timer) + 1) as f64 * SECONDS_PER_DAY + hours(hour)
}

/// Whether `timer` falls in the night window `[start_hour, end_hour)`,
/// which may wrap across midnight.
pub fn is_night(timer: f64, start_hour: f64, end_hour: f64) -> bool {
    let h = hour_of_day(timer);
    if start_hour > end_hour {
        h >= start_hour || h < end_hour
    } else {
        h >= start_hour && h < end_hour
    }
}
