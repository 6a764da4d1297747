//! Transport adapters.

pub mod http;
pub mod memory;
