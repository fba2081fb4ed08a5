//! Docking station grid and initial fleet roster.
//!
//! Vehicle `i` (1-based) docks at row `ceil(i / size)`, column `((i - 1) % size) + 1`.
//! The grid is split into four quadrants along its center lines; a vehicle's
//! quadrant comes from its dock cell and never changes.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::models::{
    AirspaceLayer, OperationPhase, Position, Quadrant, Vehicle, VehicleId, VehicleStatus,
};
use crate::path::FlightPath;
use crate::rules::DockGrid;

/// Horizontal extent of one quadrant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadrantBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DockGrid {
    /// 1-based (row, col) of a vehicle's dock cell.
    pub fn cell(&self, vehicle_id: VehicleId) -> (u32, u32) {
        let size = self.size.max(1);
        let index = vehicle_id.saturating_sub(1);
        (index / size + 1, index % size + 1)
    }

    pub fn dock_position(&self, vehicle_id: VehicleId) -> Position {
        let (row, col) = self.cell(vehicle_id);
        Position::new(
            col as f64 * self.spacing_m - self.offset_m,
            row as f64 * self.spacing_m - self.offset_m,
            0.0,
        )
    }

    pub fn quadrant_for(&self, vehicle_id: VehicleId) -> Quadrant {
        let (row, col) = self.cell(vehicle_id);
        let half = self.size / 2;
        match (row <= half, col <= half) {
            (true, true) => Quadrant::Q1,
            (true, false) => Quadrant::Q2,
            (false, true) => Quadrant::Q3,
            (false, false) => Quadrant::Q4,
        }
    }

    /// Side length of the whole grid in meters.
    pub fn extent_m(&self) -> f64 {
        self.size as f64 * self.spacing_m
    }

    pub fn bounds(&self, quadrant: Quadrant) -> QuadrantBounds {
        let extent = self.extent_m();
        let half = extent / 2.0;
        let (x_min, x_max) = match quadrant {
            Quadrant::Q1 | Quadrant::Q3 => (0.0, half),
            Quadrant::Q2 | Quadrant::Q4 => (half, extent),
        };
        let (y_min, y_max) = match quadrant {
            Quadrant::Q1 | Quadrant::Q2 => (0.0, half),
            Quadrant::Q3 | Quadrant::Q4 => (half, extent),
        };
        QuadrantBounds {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn vehicle_count(&self) -> u32 {
        self.size * self.size
    }
}

/// Build the docked starting roster, one vehicle per grid cell.
///
/// Status is biased toward idle (about one in five starts active) and battery
/// is seeded in `[80, 100)`.
pub fn create_fleet<R: Rng>(grid: &DockGrid, rng: &mut R, now: DateTime<Utc>) -> Vec<Vehicle> {
    (1..=grid.vehicle_count())
        .map(|id| {
            let dock = grid.dock_position(id);
            Vehicle {
                id,
                name: format!("Drone {}", id),
                status: if rng.random_bool(0.2) {
                    VehicleStatus::Active
                } else {
                    VehicleStatus::Idle
                },
                battery: 80.0 + rng.random::<f64>() * 20.0,
                position: dock,
                target_position: None,
                operation_phase: OperationPhase::Docked,
                current_layer: AirspaceLayer::GROUND,
                quadrant: grid.quadrant_for(id),
                dock,
                flight_path: FlightPath::default(),
                last_updated: now,
            }
        })
        .collect()
}
