//! Infrastructure implementations.
//!
//! Contains port trait implementations for the upstream status services.

pub mod fivem;
pub mod lanyard;
pub mod ports;
pub mod twitch;
