//! Core data models for the airspace simulation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParsePositionError;
use crate::path::FlightPath;

pub type VehicleId = u32;

/// A point in the local airspace frame, in meters. `z` is altitude above the dock floor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Same horizontal point at another altitude.
    pub fn with_altitude(self, z: f64) -> Self {
        Self { z, ..self }
    }

    /// Shift horizontally, keeping altitude.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z,
        }
    }

    /// Move `factor` of the remaining distance toward `target` on each axis.
    pub fn approach(self, target: Position, factor: f64) -> Self {
        Self {
            x: self.x + (target.x - self.x) * factor,
            y: self.y + (target.y - self.y) * factor,
            z: self.z + (target.z - self.z) * factor,
        }
    }

    /// True when every axis is strictly closer than `tolerance_m`.
    pub fn within_tolerance(&self, other: &Position, tolerance_m: f64) -> bool {
        (self.x - other.x).abs() < tolerance_m
            && (self.y - other.y).abs() < tolerance_m
            && (self.z - other.z).abs() < tolerance_m
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

impl FromStr for Position {
    type Err = ParsePositionError;

    /// Parses `"x,y,z"` or `"x,y"` (altitude 0).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(ParsePositionError::ComponentCount(parts.len()));
        }

        let mut values = [0.0_f64; 3];
        for (slot, raw) in values.iter_mut().zip(&parts) {
            *slot = raw
                .parse()
                .map_err(|_| ParsePositionError::InvalidNumber((*raw).to_string()))?;
        }

        Ok(Self::new(values[0], values[1], values[2]))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    #[default]
    Idle,
    Active,
    /// Yielding, returning on low battery, or otherwise degraded
    Warning,
    Emergency,
}

/// Flight lifecycle phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationPhase {
    /// On the ground with no remaining path
    #[default]
    Docked,
    Takeoff,
    Transit,
    /// Hovering in place on operator request
    Operation,
    Returning,
    Landing,
}

impl OperationPhase {
    pub fn is_airborne(self) -> bool {
        !matches!(self, OperationPhase::Docked)
    }
}

impl fmt::Display for OperationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OperationPhase::Docked => "docked",
            OperationPhase::Takeoff => "takeoff",
            OperationPhase::Transit => "transit",
            OperationPhase::Operation => "operation",
            OperationPhase::Returning => "returning",
            OperationPhase::Landing => "landing",
        };
        f.write_str(label)
    }
}

/// Altitude layer, always in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AirspaceLayer(u8);

impl AirspaceLayer {
    pub const GROUND: AirspaceLayer = AirspaceLayer(1);

    /// Fixed altitude bands: z<=2 -> 1, z<=4 -> 2, z<=6 -> 3, z<=8 -> 4, above -> 5.
    pub fn from_altitude(z: f64) -> Self {
        let layer = if z <= 2.0 {
            1
        } else if z <= 4.0 {
            2
        } else if z <= 6.0 {
            3
        } else if z <= 8.0 {
            4
        } else {
            5
        };
        AirspaceLayer(layer)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for AirspaceLayer {
    fn default() -> Self {
        Self::GROUND
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One drone in the fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub name: String,
    pub status: VehicleStatus,
    /// Percent, 0..=100
    pub battery: f64,
    pub position: Position,
    pub target_position: Option<Position>,
    pub operation_phase: OperationPhase,
    pub current_layer: AirspaceLayer,
    /// Fixed at creation from the dock grid cell
    pub quadrant: Quadrant,
    /// Home dock, used by return routes
    pub dock: Position,
    pub flight_path: FlightPath,
    pub last_updated: DateTime<Utc>,
}

impl Vehicle {
    pub fn is_airborne(&self) -> bool {
        self.operation_phase.is_airborne()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

/// Traffic alert shown to the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub severity: AlertSeverity,
    pub message: String,
    /// Never empty
    pub vehicle_ids: Vec<VehicleId>,
    pub resolved: bool,
}

impl Alert {
    /// True if the alert names exactly this set of vehicles, in any order.
    pub fn names_exactly(&self, ids: &[VehicleId]) -> bool {
        let mut mine = self.vehicle_ids.clone();
        let mut theirs = ids.to_vec();
        mine.sort_unstable();
        mine.dedup();
        theirs.sort_unstable();
        theirs.dedup();
        mine == theirs
    }
}

/// Aggregate fleet metrics for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    /// Operations per hour
    pub operational_throughput: f64,
    /// Seconds
    pub average_wait_time: f64,
    /// Percent, 70..=100
    pub path_efficiency: f64,
    pub collision_avoidance_events: u32,
    /// Percent, 0..=100
    pub system_utilization: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_bands() {
        assert_eq!(AirspaceLayer::from_altitude(0.0).get(), 1);
        assert_eq!(AirspaceLayer::from_altitude(2.0).get(), 1);
        assert_eq!(AirspaceLayer::from_altitude(2.01).get(), 2);
        assert_eq!(AirspaceLayer::from_altitude(4.0).get(), 2);
        assert_eq!(AirspaceLayer::from_altitude(6.0).get(), 3);
        assert_eq!(AirspaceLayer::from_altitude(7.5).get(), 4);
        assert_eq!(AirspaceLayer::from_altitude(8.01).get(), 5);
    }

    #[test]
    fn approach_covers_a_tenth() {
        let start = Position::new(0.0, 0.0, 0.0);
        let next = start.approach(Position::new(10.0, -10.0, 5.0), 0.1);
        assert_eq!(next, Position::new(1.0, -1.0, 0.5));
    }

    #[test]
    fn parse_position() {
        assert_eq!("1.5, 2, 3".parse::<Position>(), Ok(Position::new(1.5, 2.0, 3.0)));
        assert_eq!("10,10".parse::<Position>(), Ok(Position::new(10.0, 10.0, 0.0)));
        assert_eq!(
            "1".parse::<Position>(),
            Err(ParsePositionError::ComponentCount(1))
        );
        assert!(matches!(
            "a,b,c".parse::<Position>(),
            Err(ParsePositionError::InvalidNumber(_))
        ));
    }

    #[test]
    fn alert_pair_matching_ignores_order() {
        let alert = Alert {
            id: "alert-9".into(),
            timestamp: Utc::now(),
            severity: AlertSeverity::Critical,
            message: String::new(),
            vehicle_ids: vec![4, 3],
            resolved: false,
        };
        assert!(alert.names_exactly(&[3, 4]));
        assert!(!alert.names_exactly(&[3]));
        assert!(!alert.names_exactly(&[3, 4, 5]));
    }
}
