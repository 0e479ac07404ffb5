//! Core positioning algorithms

pub mod geodesic;
pub mod projection;
pub mod intersection;
pub mod classification;
pub mod estimation;
pub mod fallback;

pub use projection::{PlanarPoint, UtmProjector, UtmZone};
pub use intersection::{Circle, CircleIntersector, IntersectionResult};
pub use classification::{ClassifiedIntersections, IntersectionClassifier};
pub use estimation::PositionEstimator;
pub use fallback::SignalOrdering;
