//! Core types and constants for the hotspot positioning system

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
