//! Ordered waypoint queue owned by a single vehicle.
//!
//! The head is the next waypoint to fly to. Planned paths remember where their
//! transit-entry and corridor waypoints sit so the resolver can insert relative
//! to those segments instead of at raw indices.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::models::Position;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightPath {
    waypoints: VecDeque<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transit_entry: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    corridor: Option<usize>,
}

impl FlightPath {
    /// A path with no named segments (return routes, emergency descents).
    pub fn direct(waypoints: impl IntoIterator<Item = Position>) -> Self {
        Self {
            waypoints: waypoints.into_iter().collect(),
            transit_entry: None,
            corridor: None,
        }
    }

    /// A planned path with known transit-entry and corridor indices.
    pub(crate) fn planned(waypoints: Vec<Position>, transit_entry: usize, corridor: usize) -> Self {
        debug_assert!(transit_entry < corridor && corridor < waypoints.len());
        Self {
            waypoints: waypoints.into(),
            transit_entry: Some(transit_entry),
            corridor: Some(corridor),
        }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn head(&self) -> Option<&Position> {
        self.waypoints.front()
    }

    pub fn last(&self) -> Option<&Position> {
        self.waypoints.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.waypoints.iter()
    }

    pub fn to_vec(&self) -> Vec<Position> {
        self.waypoints.iter().copied().collect()
    }

    pub fn transit_entry(&self) -> Option<&Position> {
        self.transit_entry.and_then(|i| self.waypoints.get(i))
    }

    pub fn corridor(&self) -> Option<&Position> {
        self.corridor.and_then(|i| self.waypoints.get(i))
    }

    /// Remove and return the head waypoint.
    pub fn pop_head(&mut self) -> Option<Position> {
        let head = self.waypoints.pop_front()?;
        self.transit_entry = shift_down(self.transit_entry);
        self.corridor = shift_down(self.corridor);
        Some(head)
    }

    /// Prepend a waypoint so the vehicle holds at `position` before continuing.
    pub fn hold_at(&mut self, position: Position) {
        self.waypoints.push_front(position);
        self.transit_entry = self.transit_entry.map(|i| i + 1);
        self.corridor = self.corridor.map(|i| i + 1);
    }

    /// Duplicate the transit-entry waypoint right after itself, staggering departure.
    ///
    /// Returns false if the path has no transit-entry segment.
    pub fn insert_after_takeoff(&mut self) -> bool {
        let Some(index) = self.transit_entry else {
            return false;
        };
        let Some(hold) = self.waypoints.get(index).copied() else {
            return false;
        };
        self.waypoints.insert(index + 1, hold);
        if let Some(corridor) = self.corridor.as_mut() {
            if *corridor > index {
                *corridor += 1;
            }
        }
        true
    }

    /// Insert a copy of the corridor waypoint shifted horizontally by (dx, dy) right after it.
    ///
    /// Returns false if the path has no corridor segment.
    pub fn insert_after_corridor(&mut self, dx: f64, dy: f64) -> bool {
        let Some(index) = self.corridor else {
            return false;
        };
        let Some(corridor) = self.waypoints.get(index).copied() else {
            return false;
        };
        self.waypoints.insert(index + 1, corridor.offset(dx, dy));
        true
    }
}

fn shift_down(index: Option<usize>) -> Option<usize> {
    index.and_then(|i| i.checked_sub(1))
}
