//! Step definitions for stale cleanup scenarios.

mod given;
mod then;
mod when;
pub mod world;
