//! Read-only view of the fleet for display collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Alert, SystemMetrics, Vehicle, VehicleId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub tick: u64,
    pub clock: DateTime<Utc>,
    pub vehicles: Vec<Vehicle>,
    /// Newest first
    pub alerts: Vec<Alert>,
    pub metrics: SystemMetrics,
    pub selected_vehicle_id: Option<VehicleId>,
}

impl FleetSnapshot {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn airborne_count(&self) -> usize {
        self.vehicles.iter().filter(|v| v.is_airborne()).count()
    }

    pub fn open_alert_count(&self) -> usize {
        self.alerts.iter().filter(|a| !a.resolved).count()
    }
}
