//! Step definitions for project admission scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
