//! Layered route planning between a dock and a target.
//!
//! Every planned route has the same six-waypoint shape:
//!
//! 1. vertical climb to the transition altitude above the start
//! 2. climb to the assigned transit altitude (even/odd id load balancing)
//! 3. corridor point on the edge of the vehicle's home quadrant
//! 4. transit to directly above the target
//! 5. descent to the transition altitude
//! 6. landing at the target
//!
//! Routing through quadrant edges keeps traffic on the grid boundaries instead
//! of cutting diagonally through the center.

use crate::dock::QuadrantBounds;
use crate::models::{Position, VehicleId};
use crate::path::FlightPath;
use crate::rules::AirspaceRules;

/// Index of the transit-entry waypoint in a planned route.
const TRANSIT_ENTRY_INDEX: usize = 1;
/// Index of the corridor waypoint in a planned route.
const CORRIDOR_INDEX: usize = 2;

/// Plan a route from `start` to `target` for a vehicle.
///
/// Deterministic: identical arguments always yield identical waypoints.
pub fn plan_flight_path(
    start: Position,
    target: Position,
    vehicle_id: VehicleId,
    rules: &AirspaceRules,
) -> FlightPath {
    let transit_alt = rules.transit_altitude_for(vehicle_id);
    let transition_alt = rules.transition_altitude_m;
    let grid = &rules.dock_grid;
    let bounds = grid.bounds(grid.quadrant_for(vehicle_id));

    let waypoints = vec![
        start.with_altitude(transition_alt),
        start.with_altitude(transit_alt),
        corridor_waypoint(&start, &target, &bounds, transit_alt),
        target.with_altitude(transit_alt),
        target.with_altitude(transition_alt),
        target.with_altitude(0.0),
    ];

    FlightPath::planned(waypoints, TRANSIT_ENTRY_INDEX, CORRIDOR_INDEX)
}

/// Boundary point the route passes through on its way out of the home quadrant.
///
/// The x coordinate is the quadrant edge facing the direction of travel. The y
/// coordinate snaps to the quadrant's y boundary only when the target lies
/// beyond it; otherwise the vehicle keeps its current y.
pub fn corridor_waypoint(
    start: &Position,
    target: &Position,
    bounds: &QuadrantBounds,
    altitude_m: f64,
) -> Position {
    let x = if target.x >= start.x {
        bounds.x_max
    } else {
        bounds.x_min
    };

    let y = if target.y > bounds.y_max {
        bounds.y_max
    } else if target.y < bounds.y_min {
        bounds.y_min
    } else {
        start.y
    };

    Position::new(x, y, altitude_m)
}

/// Direct route home: hold at the transition altitude, cross to the dock, descend.
pub fn return_route(position: Position, dock: Position, rules: &AirspaceRules) -> FlightPath {
    let transition_alt = rules.transition_altitude_m;
    FlightPath::direct([
        position.with_altitude(transition_alt),
        dock.with_altitude(transition_alt),
        dock.with_altitude(0.0),
    ])
}

/// Straight vertical descent to the ground below `position`.
pub fn emergency_descent(position: Position) -> FlightPath {
    FlightPath::direct([position.with_altitude(0.0)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> AirspaceRules {
        AirspaceRules::default()
    }

    #[test]
    fn odd_vehicle_from_first_dock() {
        let start = Position::new(1.5, 1.5, 0.0);
        let target = Position::new(10.0, 10.0, 0.0);
        let path = plan_flight_path(start, target, 1, &rules()).to_vec();

        assert_eq!(
            path,
            vec![
                Position::new(1.5, 1.5, 3.0),
                Position::new(1.5, 1.5, 6.0),
                Position::new(6.0, 6.0, 6.0),
                Position::new(10.0, 10.0, 6.0),
                Position::new(10.0, 10.0, 3.0),
                Position::new(10.0, 10.0, 0.0),
            ]
        );
    }

    #[test]
    fn even_vehicle_uses_lower_band() {
        let start = Position::new(4.5, 1.5, 0.0);
        let target = Position::new(10.0, 10.0, 0.0);
        let path = plan_flight_path(start, target, 2, &rules()).to_vec();

        assert_eq!(path[0], Position::new(4.5, 1.5, 3.0));
        assert_eq!(path[1], Position::new(4.5, 1.5, 4.0));
        assert_eq!(path[2], Position::new(6.0, 6.0, 4.0));
        assert_eq!(path[3], Position::new(10.0, 10.0, 4.0));
    }

    #[test]
    fn planning_is_deterministic_and_six_long() {
        let start = Position::new(7.5, 10.5, 0.0);
        let target = Position::new(1.0, 2.0, 0.0);
        for id in 1..=16 {
            let a = plan_flight_path(start, target, id, &rules());
            let b = plan_flight_path(start, target, id, &rules());
            assert_eq!(a, b);
            assert_eq!(a.len(), 6);
        }
    }

    #[test]
    fn parity_picks_the_transit_band() {
        let rules = rules();
        let start = Position::new(3.0, 3.0, 0.0);
        let target = Position::new(8.0, 1.0, 0.0);
        for id in 1..=32 {
            let transit = plan_flight_path(start, target, id, &rules).to_vec()[1].z;
            let expected = if id % 2 == 0 { 4.0 } else { 6.0 };
            assert_eq!(transit, expected, "vehicle {}", id);
        }
    }

    #[test]
    fn corridor_stays_on_near_side_when_not_crossing() {
        let bounds = rules().dock_grid.bounds(crate::models::Quadrant::Q4);
        let start = Position::new(10.5, 10.5, 0.0);
        let target = Position::new(7.0, 8.0, 0.0);
        let corridor = corridor_waypoint(&start, &target, &bounds, 4.0);
        assert_eq!(corridor, Position::new(6.0, 10.5, 4.0));
    }

    #[test]
    fn degenerate_target_is_well_formed() {
        let here = Position::new(1.5, 1.5, 0.0);
        let path = plan_flight_path(here, here, 3, &rules());
        assert_eq!(path.len(), 6);
        assert_eq!(path.last(), Some(&here));
    }

    #[test]
    fn return_route_ends_at_dock() {
        let dock = Position::new(4.5, 4.5, 0.0);
        let path = return_route(Position::new(9.0, 2.0, 6.0), dock, &rules()).to_vec();
        assert_eq!(
            path,
            vec![
                Position::new(9.0, 2.0, 3.0),
                Position::new(4.5, 4.5, 3.0),
                dock,
            ]
        );
    }
}
