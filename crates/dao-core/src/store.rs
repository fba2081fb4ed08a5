//! Fleet state store: roster, alert log, metrics and the command surface.
//!
//! The store is the single owner of all mutable simulation state. Commands run
//! to completion between ticks; a rejected command returns an error and leaves
//! the state untouched.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Reverse;
use std::collections::VecDeque;

use crate::conflict::{detect_path_conflicts, resolve_path_conflicts};
use crate::dock::create_fleet;
use crate::error::FleetError;
use crate::models::{
    Alert, AlertSeverity, OperationPhase, Position, SystemMetrics, Vehicle, VehicleId,
    VehicleStatus,
};
use crate::routing::{emergency_descent, plan_flight_path, return_route};
use crate::rules::AirspaceRules;
use crate::snapshot::FleetSnapshot;

/// Operations per hour credited to each active vehicle.
const THROUGHPUT_PER_ACTIVE: f64 = 2.5;

pub struct FleetStore {
    pub(crate) rules: AirspaceRules,
    pub(crate) vehicles: Vec<Vehicle>,
    alerts: VecDeque<Alert>,
    pub(crate) metrics: SystemMetrics,
    selected: Option<VehicleId>,
    pub(crate) clock: DateTime<Utc>,
    pub(crate) tick_count: u64,
    next_alert_seq: u64,
    pub(crate) collision_avoidance_events: u32,
    pub(crate) rng: StdRng,
}

impl FleetStore {
    /// Start a simulation: the docked 4x4 roster plus the seed alerts.
    pub fn new(rules: AirspaceRules, seed: u64, start: DateTime<Utc>) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let vehicles = create_fleet(&rules.dock_grid, &mut rng, start);
        let mut store = Self::from_parts(rules, vehicles, rng, start);
        store.seed_alerts();
        store.init_metrics();
        store
    }

    /// Start from an explicit roster with an empty alert log.
    pub fn with_vehicles(
        rules: AirspaceRules,
        vehicles: Vec<Vehicle>,
        seed: u64,
        start: DateTime<Utc>,
    ) -> Self {
        let rng = StdRng::seed_from_u64(seed);
        let mut store = Self::from_parts(rules, vehicles, rng, start);
        store.init_metrics();
        store
    }

    fn from_parts(
        rules: AirspaceRules,
        vehicles: Vec<Vehicle>,
        rng: StdRng,
        start: DateTime<Utc>,
    ) -> Self {
        Self {
            rules,
            vehicles,
            alerts: VecDeque::new(),
            metrics: SystemMetrics::default(),
            selected: None,
            clock: start,
            tick_count: 0,
            next_alert_seq: 1,
            collision_avoidance_events: 0,
            rng,
        }
    }

    fn seed_alerts(&mut self) {
        let now = self.clock;
        let seeds = [
            (
                now - ChronoDuration::seconds(120),
                AlertSeverity::Info,
                "Close proximity detected between Drone 3 and Drone 7",
                vec![3, 7],
                true,
            ),
            (
                now - ChronoDuration::seconds(60),
                AlertSeverity::Warning,
                "Path conflict predicted between Drone 12 and Drone 9",
                vec![12, 9],
                false,
            ),
            (
                now,
                AlertSeverity::Info,
                "Low battery warning for Drone 5",
                vec![5],
                false,
            ),
        ];

        for (timestamp, severity, message, vehicle_ids, resolved) in seeds {
            let id = self.next_alert_id("alert");
            self.alerts.push_back(Alert {
                id,
                timestamp,
                severity,
                message: message.to_string(),
                vehicle_ids,
                resolved,
            });
        }
        self.trim_alerts();
    }

    fn init_metrics(&mut self) {
        self.collision_avoidance_events = self
            .alerts
            .iter()
            .filter(|a| a.severity != AlertSeverity::Info)
            .count() as u32;

        let (throughput, utilization) = self.activity_metrics();
        self.metrics = SystemMetrics {
            operational_throughput: throughput,
            average_wait_time: 25.0 + self.rng.random::<f64>() * 10.0,
            path_efficiency: 85.0 + self.rng.random::<f64>() * 10.0,
            collision_avoidance_events: self.collision_avoidance_events,
            system_utilization: utilization,
        };
    }

    /// (throughput, utilization %) from the current roster.
    pub(crate) fn activity_metrics(&self) -> (f64, f64) {
        let total = self.vehicles.len().max(1) as f64;
        let active = self
            .vehicles
            .iter()
            .filter(|v| v.status == VehicleStatus::Active)
            .count() as f64;
        let busy = self
            .vehicles
            .iter()
            .filter(|v| v.status != VehicleStatus::Idle)
            .count() as f64;
        (
            active * THROUGHPUT_PER_ACTIVE,
            (busy / total * 100.0).clamp(0.0, 100.0),
        )
    }

    // ========== READ SIDE ==========

    pub fn rules(&self) -> &AirspaceRules {
        &self.rules
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    /// Alerts in insertion order (oldest first).
    pub fn alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn alert(&self, id: &str) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    /// Alerts sorted newest first, as the alert panel shows them.
    pub fn alerts_newest_first(&self) -> Vec<&Alert> {
        let mut alerts: Vec<&Alert> = self.alerts.iter().rev().collect();
        alerts.sort_by_key(|a| Reverse(a.timestamp));
        alerts
    }

    pub fn metrics(&self) -> &SystemMetrics {
        &self.metrics
    }

    pub fn selected_vehicle(&self) -> Option<&Vehicle> {
        self.selected.and_then(|id| self.vehicle(id))
    }

    pub fn clock(&self) -> DateTime<Utc> {
        self.clock
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot {
            tick: self.tick_count,
            clock: self.clock,
            vehicles: self.vehicles.clone(),
            alerts: self.alerts_newest_first().into_iter().cloned().collect(),
            metrics: self.metrics.clone(),
            selected_vehicle_id: self.selected,
        }
    }

    // ========== COMMANDS ==========

    /// Select a vehicle for the control panel, or clear the selection with `None`.
    pub fn select_vehicle(&mut self, id: Option<VehicleId>) -> Result<(), FleetError> {
        if let Some(id) = id {
            self.index_of(id)?;
        }
        self.selected = id;
        Ok(())
    }

    pub fn set_status(&mut self, id: VehicleId, status: VehicleStatus) -> Result<(), FleetError> {
        let idx = self.index_of(id)?;
        let now = self.clock;
        let vehicle = &mut self.vehicles[idx];
        vehicle.status = status;
        vehicle.last_updated = now;
        Ok(())
    }

    /// Plan and commit a route to `target`.
    ///
    /// The route is checked against every other airborne vehicle's remaining
    /// path and adjusted if it conflicts. Returns the conflicting vehicle ids.
    pub fn plan_path(
        &mut self,
        id: VehicleId,
        target: Position,
    ) -> Result<Vec<VehicleId>, FleetError> {
        let idx = self.index_of(id)?;
        let start = self.vehicles[idx].position;

        let planned = plan_flight_path(start, target, id, &self.rules);
        let conflicts = detect_path_conflicts(&self.vehicles, &planned, id, &self.rules);
        let path = resolve_path_conflicts(planned, id, &conflicts, &self.rules);

        let on_ground = start.z < self.rules.waypoint_tolerance_m;
        let now = self.clock;
        let vehicle = &mut self.vehicles[idx];
        vehicle.target_position = Some(target);
        vehicle.flight_path = path;
        vehicle.operation_phase = if on_ground {
            OperationPhase::Takeoff
        } else {
            OperationPhase::Transit
        };
        vehicle.status = VehicleStatus::Active;
        vehicle.last_updated = now;

        if !conflicts.is_empty() {
            self.collision_avoidance_events += 1;
            let others = conflicts
                .iter()
                .map(|c| format!("Drone {}", c))
                .collect::<Vec<_>>()
                .join(", ");
            let mut involved = vec![id];
            involved.extend(&conflicts);
            self.push_alert(
                "alert",
                AlertSeverity::Warning,
                format!("Path conflict predicted between Drone {} and {}", id, others),
                involved,
            );
        }

        Ok(conflicts)
    }

    /// Put a vehicle into emergency landing: straight down from where it is.
    pub fn emergency_protocol(&mut self, id: VehicleId) -> Result<(), FleetError> {
        let idx = self.index_of(id)?;
        let now = self.clock;
        let vehicle = &mut self.vehicles[idx];
        vehicle.status = VehicleStatus::Emergency;
        vehicle.operation_phase = OperationPhase::Landing;
        vehicle.flight_path = emergency_descent(vehicle.position);
        vehicle.last_updated = now;

        self.push_alert(
            "emergency",
            AlertSeverity::Critical,
            format!("Emergency landing protocol activated for Drone {}", id),
            vec![id],
        );
        Ok(())
    }

    /// Mark an alert as acknowledged. Resolution is one-way.
    pub fn resolve_alert(&mut self, alert_id: &str) -> Result<(), FleetError> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == alert_id)
            .ok_or_else(|| FleetError::UnknownAlert(alert_id.to_string()))?;
        alert.resolved = true;
        Ok(())
    }

    /// Send an airborne vehicle straight back to its dock.
    pub fn return_to_dock(&mut self, id: VehicleId) -> Result<(), FleetError> {
        let idx = self.airborne_index_of(id)?;
        let now = self.clock;
        let vehicle = &mut self.vehicles[idx];
        send_home(vehicle, &self.rules);
        vehicle.last_updated = now;
        Ok(())
    }

    /// Hold an airborne vehicle in place until `resume`.
    pub fn hover(&mut self, id: VehicleId) -> Result<(), FleetError> {
        let idx = self.airborne_index_of(id)?;
        let now = self.clock;
        let vehicle = &mut self.vehicles[idx];
        vehicle.operation_phase = OperationPhase::Operation;
        vehicle.last_updated = now;
        Ok(())
    }

    /// Leave the hover; the phase is re-derived from the next waypoint.
    pub fn resume(&mut self, id: VehicleId) -> Result<(), FleetError> {
        let idx = self.index_of(id)?;
        let now = self.clock;
        let threshold = self.rules.transit_threshold_m - self.rules.waypoint_tolerance_m;
        let vehicle = &mut self.vehicles[idx];
        if vehicle.operation_phase != OperationPhase::Operation {
            return Ok(());
        }

        vehicle.operation_phase = match vehicle.flight_path.head() {
            Some(head) if head.z <= 0.0 => OperationPhase::Landing,
            _ if vehicle.position.z >= threshold => OperationPhase::Transit,
            _ => OperationPhase::Takeoff,
        };
        vehicle.last_updated = now;
        Ok(())
    }

    // ========== INTERNALS ==========

    fn index_of(&self, id: VehicleId) -> Result<usize, FleetError> {
        self.vehicles
            .iter()
            .position(|v| v.id == id)
            .ok_or(FleetError::UnknownVehicle(id))
    }

    fn airborne_index_of(&self, id: VehicleId) -> Result<usize, FleetError> {
        let idx = self.index_of(id)?;
        if !self.vehicles[idx].is_airborne() {
            return Err(FleetError::NotAirborne(id));
        }
        Ok(idx)
    }

    fn next_alert_id(&mut self, prefix: &str) -> String {
        let id = format!("{}-{}", prefix, self.next_alert_seq);
        self.next_alert_seq += 1;
        id
    }

    /// Append an alert, evicting the oldest beyond the history limit.
    pub(crate) fn push_alert(
        &mut self,
        prefix: &str,
        severity: AlertSeverity,
        message: String,
        vehicle_ids: Vec<VehicleId>,
    ) -> Alert {
        let alert = Alert {
            id: self.next_alert_id(prefix),
            timestamp: self.clock,
            severity,
            message,
            vehicle_ids,
            resolved: false,
        };
        self.alerts.push_back(alert.clone());
        self.trim_alerts();
        alert
    }

    fn trim_alerts(&mut self) {
        let max = self.rules.max_alerts.max(1);
        while self.alerts.len() > max {
            self.alerts.pop_front();
        }
    }

    /// True if an unresolved alert of any severity already names exactly these vehicles.
    pub(crate) fn has_open_alert_for(&self, vehicle_ids: &[VehicleId]) -> bool {
        self.alerts
            .iter()
            .any(|a| !a.resolved && a.names_exactly(vehicle_ids))
    }
}

/// Replace the path with the direct return route and mark the vehicle returning.
pub(crate) fn send_home(vehicle: &mut Vehicle, rules: &AirspaceRules) {
    vehicle.flight_path = return_route(vehicle.position, vehicle.dock, rules);
    vehicle.target_position = Some(vehicle.dock);
    vehicle.operation_phase = OperationPhase::Returning;
}
