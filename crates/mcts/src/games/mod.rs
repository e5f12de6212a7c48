//! Small search problems for validating the engines.
//!
//! Both are single-agent navigation tasks with a known optimal path, which
//! makes convergence easy to assert.

pub mod gridworld;
pub mod hallway;

pub use gridworld::{GridState, GridWorld};
pub use hallway::{Hallway, HallwayKey, HallwayState};
