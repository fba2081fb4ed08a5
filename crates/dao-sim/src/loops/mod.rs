//! Background loops for the simulation runtime.

pub mod sim_loop;
