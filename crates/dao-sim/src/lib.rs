//! Runtime for the drone airspace orchestrator: configuration, the
//! timer-driven simulation loop and scripted scenarios.

pub mod config;
pub mod loops;
pub mod scenarios;
