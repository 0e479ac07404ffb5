//! Pairwise intersection of three range circles and tolerance-based classification

use crate::algorithms::geodesic;
use crate::algorithms::intersection::{Circle, CircleIntersector, IntersectionResult};
use crate::algorithms::projection::UtmProjector;
use crate::core::{GeoPoint, RangeEstimate, DEFAULT_MERGE_TOLERANCE_M, TRILATERATION_RECEIVERS};
use crate::validation::error::{PositioningError, PositioningResult};
use tracing::trace;

/// Unordered receiver pairs, in evaluation order
pub const RECEIVER_PAIRS: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];

/// Pairwise results grouped by shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedIntersections {
    /// Single points, from degenerate results or collapsed pairs
    pub singles: Vec<GeoPoint>,
    /// Number of pairs without a unique solution
    pub empties: usize,
    /// Proper two-point intersections
    pub doubles: Vec<(GeoPoint, GeoPoint)>,
}

impl ClassifiedIntersections {
    /// Group results in order, collapsing pairs closer than `merge_tolerance_m` into their midpoint
    pub fn from_results<I>(results: I, merge_tolerance_m: f64) -> Self
    where
        I: IntoIterator<Item = IntersectionResult<GeoPoint>>,
    {
        let mut classified = Self::default();

        for result in results {
            match result {
                IntersectionResult::Empty => classified.empties += 1,
                IntersectionResult::Degenerate(point) => classified.singles.push(point),
                IntersectionResult::Pair(a, b) if geodesic::within(&a, &b, merge_tolerance_m) => {
                    classified.singles.push(geodesic::midpoint(&a, &b));
                }
                IntersectionResult::Pair(a, b) => classified.doubles.push((a, b)),
            }
        }

        classified
    }
}

/// Runs the circle intersector over the three receiver pairs
#[derive(Debug, Clone)]
pub struct IntersectionClassifier {
    projector: UtmProjector,
    intersector: CircleIntersector,
    merge_tolerance_m: f64,
}

impl Default for IntersectionClassifier {
    fn default() -> Self {
        Self {
            projector: UtmProjector::wgs84(),
            intersector: CircleIntersector::new(),
            merge_tolerance_m: DEFAULT_MERGE_TOLERANCE_M,
        }
    }
}

impl IntersectionClassifier {
    pub fn new(projector: UtmProjector, intersector: CircleIntersector, merge_tolerance_m: f64) -> Self {
        Self {
            projector,
            intersector,
            merge_tolerance_m,
        }
    }

    pub fn merge_tolerance_m(&self) -> f64 {
        self.merge_tolerance_m
    }

    /// Intersect every receiver pair and return the results in geographic coordinates.
    ///
    /// All circles are projected into the zone of the first receiver.
    pub fn pairwise(
        &self,
        ranges: &[RangeEstimate],
    ) -> PositioningResult<[IntersectionResult<GeoPoint>; 3]> {
        if ranges.len() != TRILATERATION_RECEIVERS {
            return Err(PositioningError::invalid(format!(
                "circle intersection needs exactly {} receivers, got {}",
                TRILATERATION_RECEIVERS,
                ranges.len()
            )));
        }

        let first = self.projector.project(&ranges[0].receiver.location)?;
        let mut circles = Vec::with_capacity(TRILATERATION_RECEIVERS);
        circles.push(Circle::new(first, ranges[0].distance_m)?);
        for range in &ranges[1..] {
            let center = self.projector.project_in_zone(&range.receiver.location, first.zone)?;
            circles.push(Circle::new(center, range.distance_m)?);
        }

        let mut results = [IntersectionResult::Empty; 3];
        for (slot, &(i, j)) in results.iter_mut().zip(RECEIVER_PAIRS.iter()) {
            let planar = self.intersector.intersect(&circles[i], &circles[j])?;
            trace!(pair = ?(i, j), result = ?planar, "circle intersection");
            *slot = planar.map(|p| self.projector.unproject(&p));
        }

        Ok(results)
    }

    /// Intersect and classify the three receiver circles
    pub fn classify(&self, ranges: &[RangeEstimate]) -> PositioningResult<ClassifiedIntersections> {
        let results = self.pairwise(ranges)?;
        Ok(ClassifiedIntersections::from_results(results, self.merge_tolerance_m))
    }
}
