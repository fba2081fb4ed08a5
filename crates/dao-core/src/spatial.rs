//! Separation math for the local metric frame.

use crate::models::Position;
use crate::rules::AirspaceRules;

/// Ground-plane distance between two points in meters.
pub fn horizontal_distance(a: &Position, b: &Position) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Altitude difference between two points in meters.
pub fn vertical_distance(a: &Position, b: &Position) -> f64 {
    (a.z - b.z).abs()
}

/// Check separation between two positions.
/// Returns (horizontal_distance_m, vertical_distance_m).
pub fn check_separation(a: &Position, b: &Position) -> (f64, f64) {
    (horizontal_distance(a, b), vertical_distance(a, b))
}

/// True when both horizontal and vertical separation are below the minimums.
pub fn violates_separation(a: &Position, b: &Position, rules: &AirspaceRules) -> bool {
    let (horizontal, vertical) = check_separation(a, b);
    horizontal < rules.min_horizontal_separation_m && vertical < rules.min_vertical_separation_m
}
