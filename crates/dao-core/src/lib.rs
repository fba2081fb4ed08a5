//! Drone Airspace Orchestrator core.
//!
//! Layered, quadrant-partitioned airspace over a 4x4 dock grid: route
//! planning, path and proximity conflict handling, and the per-tick fleet
//! update, all owned by a single [`FleetStore`].

pub mod commands;
pub mod conflict;
pub mod dock;
pub mod error;
pub mod models;
pub mod path;
pub mod routing;
pub mod rules;
pub mod snapshot;
pub mod spatial;
pub mod store;
pub mod tick;

pub use commands::FleetCommand;
pub use conflict::{
    detect_path_conflicts, resolve_path_conflicts, scan_proximity, yields_to, ProximityConflict,
};
pub use error::{FleetError, ParsePositionError};
pub use models::{
    AirspaceLayer, Alert, AlertSeverity, OperationPhase, Position, Quadrant, SystemMetrics,
    Vehicle, VehicleId, VehicleStatus,
};
pub use path::FlightPath;
pub use routing::{corridor_waypoint, emergency_descent, plan_flight_path, return_route};
pub use rules::{AirspaceRules, DockGrid};
pub use snapshot::FleetSnapshot;
pub use spatial::{horizontal_distance, vertical_distance};
pub use store::FleetStore;
pub use tick::TickReport;
