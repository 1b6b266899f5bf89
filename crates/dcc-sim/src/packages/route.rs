//! Route planner.
//!
//! Builds a flight group's waypoint sequence leg by leg. Each leg starts
//! where and when the previous one ended, so waypoint times never
//! decrease. Transit legs last `distance / speed`; on-station and ground
//! legs last a fixed duration.

use dcc_core::components::Waypoint;
use dcc_core::constants::LANDING_NAV_DISTANCE;
use dcc_core::enums::WaypointKind;
use dcc_core::types::{travel_time, Position};

/// Finished flight plan with its key times.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub waypoints: Vec<Waypoint>,
    pub start_time: f64,
    pub time_on_target: f64,
    pub task_end_time: f64,
    pub landing_time: f64,
}

pub struct RoutePlanner {
    home: Position,
    position: Position,
    time: f64,
    start_time: f64,
    speed: f64,
    waypoints: Vec<Waypoint>,
    time_on_target: Option<f64>,
    task_end_time: Option<f64>,
}

impl RoutePlanner {
    pub fn new(home: Position, start_time: f64, speed: f64) -> Self {
        Self {
            home,
            position: home,
            time: start_time,
            start_time,
            speed,
            waypoints: Vec::new(),
            time_on_target: None,
            task_end_time: None,
        }
    }

    /// Current time at the end of the planned route.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn position(&self) -> Position {
        self.position
    }

    fn push(
        &mut self,
        name: &str,
        kind: WaypointKind,
        end_position: Position,
        duration: f64,
        on_ground: bool,
        racetrack: bool,
    ) {
        let is_task = kind == WaypointKind::Task;
        let task_start = is_task && self.time_on_target.is_none();
        if task_start {
            self.time_on_target = Some(self.time);
        }
        let end_time = self.time + duration.max(0.0);
        self.waypoints.push(Waypoint {
            name: name.to_string(),
            kind,
            position: self.position,
            end_position,
            time: self.time,
            end_time,
            speed: self.speed,
            on_ground,
            task_start,
            racetrack,
        });
        if is_task {
            self.task_end_time = Some(end_time);
        }
        self.position = end_position;
        self.time = end_time;
    }

    pub fn take_off(mut self) -> Self {
        let home = self.home;
        self.push("Take Off", WaypointKind::TakeOff, home, 0.0, true, false);
        self
    }

    /// Transit leg to `to`.
    pub fn nav(mut self, name: &str, to: Position) -> Self {
        let duration = travel_time(&self.position, &to, self.speed);
        self.push(name, WaypointKind::Nav, to, duration, false, false);
        self
    }

    /// Task leg flown at cruise speed. The first task leg marks the time on target.
    pub fn task(mut self, name: &str, to: Position) -> Self {
        let duration = travel_time(&self.position, &to, self.speed);
        self.push(name, WaypointKind::Task, to, duration, false, false);
        self
    }

    /// Racetrack toward `to`, held for `duration` seconds.
    pub fn on_station(mut self, name: &str, to: Position, duration: f64) -> Self {
        self.push(name, WaypointKind::Task, to, duration, false, true);
        self
    }

    /// Task time spent landed at the current position.
    pub fn hold_on_ground(mut self, name: &str, duration: f64) -> Self {
        let here = self.position;
        self.push(name, WaypointKind::Task, here, duration, true, false);
        self
    }

    /// Fly home and close the route with the landing waypoint.
    pub fn land(mut self) -> Route {
        let home = self.home;
        if self.position.distance_to(&home) > LANDING_NAV_DISTANCE {
            let approach = home.offset(home.heading_to(&self.position), LANDING_NAV_DISTANCE);
            let duration = travel_time(&self.position, &approach, self.speed);
            self.push("Return", WaypointKind::Nav, approach, duration, false, false);
        }
        let duration = travel_time(&self.position, &home, self.speed);
        self.push("Descent", WaypointKind::Nav, home, duration, false, false);
        self.push("Landing", WaypointKind::Landing, home, 0.0, true, false);

        let landing_time = self.time;
        let time_on_target = self.time_on_target.unwrap_or(self.start_time);
        Route {
            waypoints: self.waypoints,
            start_time: self.start_time,
            time_on_target,
            task_end_time: self.task_end_time.unwrap_or(time_on_target),
            landing_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_times_follow_distance() {
        let home = Position::new(0.0, 0.0);
        let route = RoutePlanner::new(home, 1000.0, 100.0)
            .take_off()
            .nav("Ingress", Position::new(50_000.0, 0.0))
            .task("Target", Position::new(60_000.0, 0.0))
            .land();

        assert_eq!(route.start_time, 1000.0);
        assert_eq!(route.time_on_target, 1500.0);
        assert_eq!(route.task_end_time, 1600.0);
        // 40 km back to the approach point, 20 km descent.
        assert_eq!(route.landing_time, 1600.0 + 400.0 + 200.0);

        let names: Vec<&str> = route.waypoints.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Take Off", "Ingress", "Target", "Return", "Descent", "Landing"]
        );
        let last = route.waypoints.last().unwrap();
        assert_eq!(last.time, route.landing_time);
        assert_eq!(last.end_time, route.landing_time);
    }

    #[test]
    fn test_short_route_skips_return_leg() {
        let home = Position::new(0.0, 0.0);
        let route = RoutePlanner::new(home, 0.0, 55.0)
            .take_off()
            .task("Pickup", Position::new(0.0, 11_000.0))
            .hold_on_ground("Pickup", 300.0)
            .land();

        assert!(route.waypoints.iter().all(|w| w.name != "Return"));
        assert_eq!(route.time_on_target, 0.0);
        assert_eq!(route.task_end_time, 200.0 + 300.0);
        assert_eq!(route.landing_time, 200.0 + 300.0 + 200.0);
    }

    #[test]
    fn test_on_station_uses_fixed_duration() {
        let home = Position::new(0.0, 0.0);
        let route = RoutePlanner::new(home, 0.0, 170.0)
            .take_off()
            .nav("Racetrack Start", Position::new(17_000.0, 0.0))
            .on_station("Orbit", Position::new(34_000.0, 0.0), 3600.0)
            .land();

        let orbit = route.waypoints.iter().find(|w| w.racetrack).unwrap();
        assert!(orbit.task_start);
        assert_eq!(orbit.time, 100.0);
        assert_eq!(orbit.end_time, 3700.0);
        for pair in route.waypoints.windows(2) {
            assert!(pair[0].end_time <= pair[1].time + 1e-9);
            assert!(pair[0].time <= pair[1].time);
        }
    }
}
