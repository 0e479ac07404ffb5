//! Public positioning interface

pub mod engine;
pub mod types;

pub use engine::PositioningEngine;
pub use types::{PositioningModel, Prediction};
