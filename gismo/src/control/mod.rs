//! Decision making
//!
//! - [`commands`]: operator command vocabulary
//! - [`wander`]: autonomous wandering planner

pub mod commands;
pub mod wander;

pub use commands::Command;
pub use wander::{plan, Plan, Reaction};
