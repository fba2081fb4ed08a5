//! Error types for fleet commands.

use thiserror::Error;

use crate::models::VehicleId;

/// A rejected command. The fleet state is left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FleetError {
    #[error("unknown vehicle {0}")]
    UnknownVehicle(VehicleId),
    #[error("unknown alert {0}")]
    UnknownAlert(String),
    #[error("vehicle {0} is docked")]
    NotAirborne(VehicleId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsePositionError {
    #[error("expected 2 or 3 comma-separated components, got {0}")]
    ComponentCount(usize),
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),
}
