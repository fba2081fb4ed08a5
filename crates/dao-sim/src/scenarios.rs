//! Pre-defined fleet scenarios, plus loading scripted ones from JSON.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use dao_core::{DockGrid, FleetCommand, Position, VehicleId};

/// A command scheduled for a given simulation tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// Sent once the loop has completed this many ticks (0 = before the first)
    pub at_tick: u64,
    pub command: FleetCommand,
}

/// A named script of operator commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Load a scenario script, e.g.
    /// `{"name": "demo", "steps": [{"at_tick": 0, "command": {"type": "EMERGENCY", "vehicle_id": 3}}]}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing scenario {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let mut scenario: Scenario = serde_json::from_str(raw)?;
        scenario.steps.sort_by_key(|s| s.at_tick);
        Ok(scenario)
    }

    /// Steps due once the tick counter moves from `after` (exclusive) to `upto` (inclusive).
    pub fn steps_between(
        &self,
        after: Option<u64>,
        upto: u64,
    ) -> impl Iterator<Item = &ScenarioStep> {
        self.steps
            .iter()
            .filter(move |step| after.map_or(true, |a| step.at_tick > a) && step.at_tick <= upto)
    }

    /// Last tick any step is scheduled for.
    pub fn last_step_tick(&self) -> u64 {
        self.steps.iter().map(|s| s.at_tick).max().unwrap_or(0)
    }
}

fn plan(at_tick: u64, vehicle_id: VehicleId, target: Position) -> ScenarioStep {
    ScenarioStep {
        at_tick,
        command: FleetCommand::PlanPath { vehicle_id, target },
    }
}

/// Two even-id vehicles from opposite quadrants swap docks.
///
/// Both routes pass through the grid center at the same transit altitude, so
/// the second plan is adjusted by the resolver.
pub fn create_crossing_scenario(grid: &DockGrid) -> Scenario {
    Scenario {
        name: "crossing".to_string(),
        steps: vec![
            plan(0, 6, grid.dock_position(12)),
            plan(0, 12, grid.dock_position(6)),
        ],
    }
}

/// Every vehicle flies to the mirrored dock in the opposite quadrant, launched two ticks apart.
pub fn create_dispersal_scenario(grid: &DockGrid) -> Scenario {
    let extent = grid.extent_m();
    let steps = (1..=grid.vehicle_count())
        .map(|id| {
            let dock = grid.dock_position(id);
            let target = Position::new(extent - dock.x, extent - dock.y, 0.0);
            plan(u64::from(id - 1) * 2, id, target)
        })
        .collect();

    Scenario {
        name: "dispersal".to_string(),
        steps,
    }
}

/// A vehicle is launched, hovers, resumes, then goes down on the emergency protocol.
pub fn create_emergency_scenario(grid: &DockGrid) -> Scenario {
    Scenario {
        name: "emergency".to_string(),
        steps: vec![
            ScenarioStep {
                at_tick: 0,
                command: FleetCommand::Select {
                    vehicle_id: Some(7),
                },
            },
            plan(0, 7, grid.dock_position(13)),
            ScenarioStep {
                at_tick: 45,
                command: FleetCommand::Hover { vehicle_id: 7 },
            },
            ScenarioStep {
                at_tick: 55,
                command: FleetCommand::Resume { vehicle_id: 7 },
            },
            ScenarioStep {
                at_tick: 80,
                command: FleetCommand::Emergency { vehicle_id: 7 },
            },
            ScenarioStep {
                at_tick: 81,
                command: FleetCommand::ResolveAlert {
                    alert_id: "alert-2".to_string(),
                },
            },
        ],
    }
}
