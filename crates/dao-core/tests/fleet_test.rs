//! End-to-end fleet runs checking the state invariants after every tick.

use std::time::Duration;

use chrono::Utc;
use dao_core::{
    AirspaceLayer, AirspaceRules, AlertSeverity, FleetStore, OperationPhase, Position,
    VehicleStatus,
};

const TICK: Duration = Duration::from_secs(1);

fn assert_invariants(store: &FleetStore) {
    for v in store.vehicles() {
        let docked = v.operation_phase == OperationPhase::Docked;
        assert_eq!(docked, v.flight_path.is_empty(), "drone {} path vs phase", v.id);
        assert_eq!(docked, v.position.z == 0.0, "drone {} altitude vs phase", v.id);
        assert_eq!(v.current_layer, AirspaceLayer::from_altitude(v.position.z));
        assert!((0.0..=100.0).contains(&v.battery));
        assert_eq!(v.quadrant, store.rules().dock_grid.quadrant_for(v.id));
    }
}

#[test]
fn dispersal_keeps_invariants() {
    let mut store = FleetStore::new(AirspaceRules::default(), 9, Utc::now());
    let extent = store.rules().dock_grid.extent_m();

    for tick in 0..600u32 {
        if tick < 16 {
            let id = tick + 1;
            let dock = store.vehicle(id).unwrap().dock;
            store
                .plan_path(id, Position::new(extent - dock.x, extent - dock.y, 0.0))
                .unwrap();
        }
        store.tick(TICK);
        assert_invariants(&store);
    }
}

#[test]
fn launch_scenario_matches_planned_route() {
    let mut store = FleetStore::new(AirspaceRules::default(), 1, Utc::now());
    store.plan_path(1, Position::new(10.0, 10.0, 0.0)).unwrap();

    let vehicle = store.vehicle(1).unwrap();
    assert_eq!(vehicle.operation_phase, OperationPhase::Takeoff);
    assert_eq!(vehicle.status, VehicleStatus::Active);
    let path = vehicle.flight_path.to_vec();
    assert_eq!(path[0], Position::new(1.5, 1.5, 3.0));
    assert_eq!(path[1], Position::new(1.5, 1.5, 6.0));
    assert_eq!(path[3], Position::new(10.0, 10.0, 6.0));
    assert_eq!(path[4], Position::new(10.0, 10.0, 3.0));
    assert_eq!(path[5], Position::new(10.0, 10.0, 0.0));
}

#[test]
fn low_battery_return_lands_at_home_dock() {
    let mut store = FleetStore::new(AirspaceRules::default(), 2, Utc::now());
    store.plan_path(11, Position::new(1.0, 1.0, 0.0)).unwrap();

    for _ in 0..10 {
        store.tick(TICK);
    }
    // Drain the battery while hovering just above the dock.
    store.hover(11).unwrap();
    while store.vehicle(11).unwrap().operation_phase == OperationPhase::Operation {
        store.tick(TICK);
        assert_invariants(&store);
    }

    let vehicle = store.vehicle(11).unwrap();
    assert_eq!(vehicle.operation_phase, OperationPhase::Returning);
    assert_eq!(vehicle.status, VehicleStatus::Warning);
    assert!(vehicle.battery < 20.0);
    assert_eq!(vehicle.flight_path.last(), Some(&vehicle.dock));
    assert!(store
        .alerts()
        .any(|a| a.severity == AlertSeverity::Warning && a.vehicle_ids == vec![11]));

    for _ in 0..300 {
        store.tick(TICK);
    }
    let vehicle = store.vehicle(11).unwrap();
    assert_eq!(vehicle.operation_phase, OperationPhase::Docked);
    assert_eq!(vehicle.position, vehicle.dock);
    assert_invariants(&store);
}
