//! Per-tick simulation update.
//!
//! One call to [`FleetStore::tick`] is one atomic step of the whole fleet:
//! every airborne vehicle drains battery, moves toward its head waypoint,
//! consumes it when reached, and is sent home on low battery. A pairwise
//! proximity scan then runs over the updated positions.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::conflict::scan_proximity;
use crate::models::{
    AirspaceLayer, Alert, AlertSeverity, OperationPhase, Position, Vehicle, VehicleId,
    VehicleStatus,
};
use crate::rules::AirspaceRules;
use crate::store::{send_home, FleetStore};

/// What happened during one tick, for the runtime to log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub new_alerts: Vec<Alert>,
    /// Vehicles that held position to give way
    pub evasive: Vec<VehicleId>,
    /// Vehicles sent home on low battery
    pub returning: Vec<VehicleId>,
    /// Vehicles that completed their flight
    pub docked: Vec<VehicleId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepEvent {
    Docked,
    LowBattery,
}

impl FleetStore {
    /// Advance the simulation by one tick. `dt` only moves the clock; per-tick
    /// drain and movement are fixed.
    pub fn tick(&mut self, dt: Duration) -> TickReport {
        self.clock += ChronoDuration::from_std(dt).unwrap_or_else(|_| ChronoDuration::zero());
        self.tick_count += 1;
        let now = self.clock;

        let mut report = TickReport {
            tick: self.tick_count,
            ..TickReport::default()
        };

        let mut low_battery = Vec::new();
        for vehicle in &mut self.vehicles {
            match advance_vehicle(vehicle, &self.rules, now) {
                Some(StepEvent::Docked) => report.docked.push(vehicle.id),
                Some(StepEvent::LowBattery) => low_battery.push((vehicle.id, vehicle.battery)),
                None => {}
            }
        }

        for (id, battery) in low_battery {
            report.returning.push(id);
            let alert = self.push_alert(
                "alert",
                AlertSeverity::Warning,
                format!(
                    "Low battery ({:.0}%) for Drone {}, returning to dock",
                    battery, id
                ),
                vec![id],
            );
            report.new_alerts.push(alert);
        }

        for conflict in scan_proximity(&self.vehicles, &self.rules) {
            let pair = [conflict.yielding_id, conflict.priority_id];
            if !self.has_open_alert_for(&pair) {
                let alert = self.push_alert(
                    "alert",
                    AlertSeverity::Critical,
                    format!(
                        "Close proximity detected between Drone {} and Drone {} ({:.2}m horizontal, {:.2}m vertical)",
                        conflict.yielding_id,
                        conflict.priority_id,
                        conflict.horizontal_m,
                        conflict.vertical_m
                    ),
                    pair.to_vec(),
                );
                report.new_alerts.push(alert);
            }

            // One hold per vehicle per tick, however many neighbours it yields to.
            if report.evasive.contains(&conflict.yielding_id) {
                continue;
            }
            if let Some(vehicle) = self
                .vehicles
                .iter_mut()
                .find(|v| v.id == conflict.yielding_id)
            {
                if evade(vehicle, now) {
                    report.evasive.push(vehicle.id);
                    self.collision_avoidance_events += 1;
                }
            }
        }

        self.refresh_metrics();
        report
    }

    fn refresh_metrics(&mut self) {
        let (throughput, utilization) = self.activity_metrics();
        let wait_jitter: f64 = self.rng.random_range(-0.25..0.25);
        let efficiency_jitter: f64 = self.rng.random_range(-1.0..1.0);

        let metrics = &mut self.metrics;
        metrics.operational_throughput = throughput;
        metrics.average_wait_time = (metrics.average_wait_time + wait_jitter).max(0.0);
        metrics.path_efficiency = (metrics.path_efficiency + efficiency_jitter).clamp(70.0, 100.0);
        metrics.collision_avoidance_events = self.collision_avoidance_events;
        metrics.system_utilization = utilization;
    }
}

/// One vehicle's share of the tick. Docked vehicles are left alone.
fn advance_vehicle(
    vehicle: &mut Vehicle,
    rules: &AirspaceRules,
    now: DateTime<Utc>,
) -> Option<StepEvent> {
    if !vehicle.is_airborne() {
        return None;
    }

    vehicle.battery = (vehicle.battery - rules.battery_drain_per_tick).max(0.0);

    let mut event = None;
    if vehicle.operation_phase != OperationPhase::Operation {
        if let Some(head) = vehicle.flight_path.head().copied() {
            vehicle.position = vehicle.position.approach(head, rules.approach_factor);
            if vehicle.position.within_tolerance(&head, rules.waypoint_tolerance_m) {
                vehicle.flight_path.pop_head();
                event = waypoint_reached(vehicle, head, rules);
            }
        }
    }

    vehicle.current_layer = AirspaceLayer::from_altitude(vehicle.position.z);

    let low_battery = vehicle.battery < rules.low_battery_threshold
        && !matches!(
            vehicle.operation_phase,
            OperationPhase::Returning | OperationPhase::Landing | OperationPhase::Docked
        );
    if low_battery {
        send_home(vehicle, rules);
        vehicle.status = VehicleStatus::Warning;
        event = Some(StepEvent::LowBattery);
    }

    vehicle.last_updated = now;
    event
}

/// Phase transition after the head waypoint was consumed.
fn waypoint_reached(
    vehicle: &mut Vehicle,
    reached: Position,
    rules: &AirspaceRules,
) -> Option<StepEvent> {
    let Some(next) = vehicle.flight_path.head().copied() else {
        // Flight complete. Every route ends on the ground, so snapping keeps z at 0.
        vehicle.position = reached;
        vehicle.current_layer = AirspaceLayer::from_altitude(reached.z);
        vehicle.operation_phase = OperationPhase::Docked;
        vehicle.status = VehicleStatus::Idle;
        vehicle.target_position = None;
        return Some(StepEvent::Docked);
    };

    let on_ground = vehicle.position.z < rules.waypoint_tolerance_m;
    let at_transit = vehicle.position.z >= rules.transit_threshold_m - rules.waypoint_tolerance_m;
    let phase = vehicle.operation_phase;
    vehicle.operation_phase = if on_ground && next.z > 0.0 && phase != OperationPhase::Returning {
        OperationPhase::Takeoff
    } else if next.z <= 0.0 {
        OperationPhase::Landing
    } else if phase == OperationPhase::Returning {
        // A return only ever ends in landing.
        OperationPhase::Returning
    } else if at_transit {
        OperationPhase::Transit
    } else {
        phase
    };
    None
}

/// Give way: hold at the current position for one consumption cycle.
/// A hovering vehicle is already holding and gets no extra waypoint.
///
/// Vehicles on the emergency protocol keep descending and keep their status.
/// Returns whether the vehicle gave way.
fn evade(vehicle: &mut Vehicle, now: DateTime<Utc>) -> bool {
    if vehicle.status == VehicleStatus::Emergency {
        return false;
    }
    vehicle.status = VehicleStatus::Warning;
    if vehicle.operation_phase != OperationPhase::Operation {
        vehicle.flight_path.hold_at(vehicle.position);
    }
    vehicle.last_updated = now;
    true
}
