//! Error taxonomy and input validation

pub mod data;
pub mod error;

pub use data::DataValidator;
pub use error::{PositioningError, PositioningResult};
