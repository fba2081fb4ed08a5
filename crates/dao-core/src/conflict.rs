//! Conflict detection and resolution for the layered airspace.
//!
//! Two checks share the same separation envelope:
//! - planned-path checks, run when a route is committed, compare every
//!   waypoint of the candidate against every remaining waypoint of the other
//!   airborne vehicles;
//! - proximity scans, run once per tick, compare current positions pairwise.
//!
//! Priority: the vehicle with the lower id yields. Both the resolver's lateral
//! offset and the tick engine's evasive hold follow this rule.

use serde::{Deserialize, Serialize};

use crate::models::{Vehicle, VehicleId};
use crate::path::FlightPath;
use crate::rules::AirspaceRules;
use crate::spatial::{check_separation, violates_separation};

/// Whether `vehicle` must give way to `other`.
pub fn yields_to(vehicle: VehicleId, other: VehicleId) -> bool {
    vehicle < other
}

/// Ids of airborne vehicles whose remaining path comes within the separation
/// envelope of any waypoint in `candidate`.
///
/// `exclude_id` is the vehicle the candidate belongs to. Results keep roster order.
pub fn detect_path_conflicts(
    vehicles: &[Vehicle],
    candidate: &FlightPath,
    exclude_id: VehicleId,
    rules: &AirspaceRules,
) -> Vec<VehicleId> {
    vehicles
        .iter()
        .filter(|v| v.id != exclude_id && v.is_airborne() && !v.flight_path.is_empty())
        .filter(|v| paths_conflict(candidate, &v.flight_path, rules))
        .map(|v| v.id)
        .collect()
}

/// True at the first waypoint pair inside the envelope.
fn paths_conflict(a: &FlightPath, b: &FlightPath, rules: &AirspaceRules) -> bool {
    a.iter()
        .any(|wp1| b.iter().any(|wp2| violates_separation(wp1, wp2, rules)))
}

/// Adjust a freshly planned path for the vehicles it conflicts with.
///
/// With no conflicts the path is returned unchanged. Otherwise a hold is added
/// after the climb to transit altitude, and if this vehicle yields to any of
/// the conflicting vehicles the corridor point is also offset laterally.
/// Waypoints are only ever inserted, so both endpoints are preserved.
pub fn resolve_path_conflicts(
    mut path: FlightPath,
    vehicle_id: VehicleId,
    conflicts: &[VehicleId],
    rules: &AirspaceRules,
) -> FlightPath {
    let Some(&max_conflict_id) = conflicts.iter().max() else {
        return path;
    };

    path.insert_after_takeoff();

    if yields_to(vehicle_id, max_conflict_id) {
        let offset = rules.corridor_offset_m;
        path.insert_after_corridor(offset, offset);
    }

    path
}

/// Two airborne vehicles currently inside each other's separation envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityConflict {
    /// Lower-priority vehicle, which holds position
    pub yielding_id: VehicleId,
    pub priority_id: VehicleId,
    pub horizontal_m: f64,
    pub vertical_m: f64,
}

/// Pairwise scan of current positions across all airborne vehicles.
pub fn scan_proximity(vehicles: &[Vehicle], rules: &AirspaceRules) -> Vec<ProximityConflict> {
    let airborne: Vec<&Vehicle> = vehicles.iter().filter(|v| v.is_airborne()).collect();
    let mut conflicts = Vec::new();

    for (i, first) in airborne.iter().enumerate() {
        for second in &airborne[i + 1..] {
            if !violates_separation(&first.position, &second.position, rules) {
                continue;
            }

            let (horizontal_m, vertical_m) = check_separation(&first.position, &second.position);
            let (yielding_id, priority_id) = if yields_to(first.id, second.id) {
                (first.id, second.id)
            } else {
                (second.id, first.id)
            };

            conflicts.push(ProximityConflict {
                yielding_id,
                priority_id,
                horizontal_m,
                vertical_m,
            });
        }
    }

    conflicts
}
