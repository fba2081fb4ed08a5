//! Safety rules and thresholds for the layered airspace.

use serde::{Deserialize, Serialize};

/// Configuration for airspace rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirspaceRules {
    /// Minimum horizontal separation in meters
    pub min_horizontal_separation_m: f64,
    /// Minimum vertical separation in meters
    pub min_vertical_separation_m: f64,
    /// Altitude of the takeoff/descent hand-off point (layer 2 boundary)
    pub transition_altitude_m: f64,
    /// Transit altitude assigned to even vehicle ids
    pub transit_altitude_even_m: f64,
    /// Transit altitude assigned to odd vehicle ids
    pub transit_altitude_odd_m: f64,
    /// Altitude at or above which a vehicle is considered in transit
    pub transit_threshold_m: f64,
    /// Fraction of the remaining distance to the head waypoint covered per tick
    pub approach_factor: f64,
    /// Per-axis distance at which a waypoint counts as reached
    pub waypoint_tolerance_m: f64,
    /// Battery percentage drained per tick while airborne
    pub battery_drain_per_tick: f64,
    /// Battery percentage below which a vehicle auto-returns
    pub low_battery_threshold: f64,
    /// Lateral offset applied to the corridor point by the resolver
    pub corridor_offset_m: f64,
    /// Alerts retained in the log (oldest evicted first)
    pub max_alerts: usize,
    pub dock_grid: DockGrid,
}

impl Default for AirspaceRules {
    fn default() -> Self {
        Self {
            min_horizontal_separation_m: 1.5,
            min_vertical_separation_m: 1.0,
            transition_altitude_m: 3.0,
            transit_altitude_even_m: 4.0,
            transit_altitude_odd_m: 6.0,
            transit_threshold_m: 4.0,
            approach_factor: 0.1,
            waypoint_tolerance_m: 0.1,
            battery_drain_per_tick: 0.1,
            low_battery_threshold: 20.0,
            corridor_offset_m: 2.0,
            max_alerts: 10,
            dock_grid: DockGrid::default(),
        }
    }
}

impl AirspaceRules {
    /// Transit altitude for a vehicle. Even ids fly the lower band, odd ids the upper.
    pub fn transit_altitude_for(&self, vehicle_id: u32) -> f64 {
        if vehicle_id % 2 == 0 {
            self.transit_altitude_even_m
        } else {
            self.transit_altitude_odd_m
        }
    }
}

/// Geometry of the docking station grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DockGrid {
    /// Cells per side
    pub size: u32,
    pub spacing_m: f64,
    /// Offset of a dock from its cell's far edge
    pub offset_m: f64,
}

impl Default for DockGrid {
    fn default() -> Self {
        Self {
            size: 4,
            spacing_m: 3.0,
            offset_m: 1.5,
        }
    }
}
