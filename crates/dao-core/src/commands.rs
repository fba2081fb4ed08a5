//! Inbound operator commands.

use serde::{Deserialize, Serialize};

use crate::error::FleetError;
use crate::models::{Position, VehicleId, VehicleStatus};
use crate::store::FleetStore;

/// Command issued by the control surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FleetCommand {
    /// Select a vehicle for the control panel (`None` clears)
    Select { vehicle_id: Option<VehicleId> },
    SetStatus {
        vehicle_id: VehicleId,
        status: VehicleStatus,
    },
    /// Plan and commit a route to `target`
    PlanPath {
        vehicle_id: VehicleId,
        target: Position,
    },
    /// Emergency landing straight down
    Emergency { vehicle_id: VehicleId },
    ResolveAlert { alert_id: String },
    ReturnToDock { vehicle_id: VehicleId },
    /// Hover in place
    Hover { vehicle_id: VehicleId },
    Resume { vehicle_id: VehicleId },
}

impl FleetCommand {
    pub fn vehicle_id(&self) -> Option<VehicleId> {
        match self {
            FleetCommand::Select { vehicle_id } => *vehicle_id,
            FleetCommand::SetStatus { vehicle_id, .. }
            | FleetCommand::PlanPath { vehicle_id, .. }
            | FleetCommand::Emergency { vehicle_id }
            | FleetCommand::ReturnToDock { vehicle_id }
            | FleetCommand::Hover { vehicle_id }
            | FleetCommand::Resume { vehicle_id } => Some(*vehicle_id),
            FleetCommand::ResolveAlert { .. } => None,
        }
    }
}

impl FleetStore {
    /// Dispatch a command. On error the fleet is unchanged.
    pub fn apply(&mut self, command: FleetCommand) -> Result<(), FleetError> {
        match command {
            FleetCommand::Select { vehicle_id } => self.select_vehicle(vehicle_id),
            FleetCommand::SetStatus { vehicle_id, status } => self.set_status(vehicle_id, status),
            FleetCommand::PlanPath { vehicle_id, target } => {
                self.plan_path(vehicle_id, target).map(|_| ())
            }
            FleetCommand::Emergency { vehicle_id } => self.emergency_protocol(vehicle_id),
            FleetCommand::ResolveAlert { alert_id } => self.resolve_alert(&alert_id),
            FleetCommand::ReturnToDock { vehicle_id } => self.return_to_dock(vehicle_id),
            FleetCommand::Hover { vehicle_id } => self.hover(vehicle_id),
            FleetCommand::Resume { vehicle_id } => self.resume(vehicle_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OperationPhase;
    use crate::rules::AirspaceRules;
    use chrono::Utc;

    #[test]
    fn commands_deserialize_from_tagged_json() {
        let cmd: FleetCommand = serde_json::from_str(
            r#"{"type":"PLAN_PATH","vehicle_id":2,"target":{"x":10.0,"y":10.0,"z":0.0}}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            FleetCommand::PlanPath {
                vehicle_id: 2,
                target: Position::new(10.0, 10.0, 0.0),
            }
        );

        let cmd: FleetCommand =
            serde_json::from_str(r#"{"type":"RESOLVE_ALERT","alert_id":"alert-2"}"#).unwrap();
        assert_eq!(cmd.vehicle_id(), None);
    }

    #[test]
    fn apply_dispatches() {
        let mut store = FleetStore::new(AirspaceRules::default(), 1, Utc::now());
        store
            .apply(FleetCommand::PlanPath {
                vehicle_id: 2,
                target: Position::new(10.0, 10.0, 0.0),
            })
            .unwrap();
        store.apply(FleetCommand::Emergency { vehicle_id: 2 }).unwrap();
        assert_eq!(
            store.vehicle(2).unwrap().operation_phase,
            OperationPhase::Landing
        );
        assert_eq!(
            store.apply(FleetCommand::Hover { vehicle_id: 40 }),
            Err(FleetError::UnknownVehicle(40))
        );
    }
}
