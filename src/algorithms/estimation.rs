//! Decision procedure turning classified intersections into one position
//!
//! The case analysis is keyed on the number of single points and two-point
//! pairs left after classification:
//!
//! | singles | doubles | rule                                             |
//! |---------|---------|--------------------------------------------------|
//! | 1       | 0       | the single point                                 |
//! | 2       | any     | merge the singles, else a single with a pair point |
//! | 3       | any     | merge-of-merges over the singles                 |
//! | other   | > 1     | candidates agreeing across pairs                 |
//! | other   | 1       | minimax distance to the receivers                |
//!
//! Anything else (all pairs coincident) has no defined answer and yields `None`.

use crate::algorithms::classification::ClassifiedIntersections;
use crate::algorithms::geodesic::{self, midpoint};
use crate::core::{GeoPoint, DEFAULT_MERGE_TOLERANCE_M};
use tracing::debug;

/// Position estimator over classified circle intersections
#[derive(Debug, Clone)]
pub struct PositionEstimator {
    merge_tolerance_m: f64,
}

impl Default for PositionEstimator {
    fn default() -> Self {
        Self {
            merge_tolerance_m: DEFAULT_MERGE_TOLERANCE_M,
        }
    }
}

impl PositionEstimator {
    pub fn new(merge_tolerance_m: f64) -> Self {
        Self { merge_tolerance_m }
    }

    /// Estimate the device position.
    ///
    /// `centres` are the receiver locations, used to choose between the two
    /// points when only one two-point intersection is available. It must not
    /// be empty for that layout.
    pub fn estimate(&self, classified: &ClassifiedIntersections, centres: &[GeoPoint]) -> Option<GeoPoint> {
        let singles = &classified.singles;
        let doubles = &classified.doubles;

        match (singles.len(), doubles.len()) {
            (1, 0) => {
                debug!("single intersection point");
                Some(singles[0])
            }
            (2, _) => Some(self.two_singles(singles[0], singles[1], doubles)),
            (3, _) => Some(self.three_singles(singles[0], singles[1], singles[2])),
            (_, n) if n > 1 => Some(self.multiple_pairs(doubles)),
            (_, 1) => Some(self.minimax(doubles[0], centres)),
            (s, d) => {
                debug!(
                    singles = s,
                    doubles = d,
                    empties = classified.empties,
                    "no rule for intersection layout"
                );
                None
            }
        }
    }

    fn close(&self, a: &GeoPoint, b: &GeoPoint) -> bool {
        geodesic::within(a, b, self.merge_tolerance_m)
    }

    /// Two singles: merge them, else the first single/pair-point hit in scan order
    fn two_singles(&self, first: GeoPoint, second: GeoPoint, doubles: &[(GeoPoint, GeoPoint)]) -> GeoPoint {
        if self.close(&first, &second) {
            debug!("two singles within tolerance");
            return midpoint(&first, &second);
        }

        for single in [first, second] {
            for &(a, b) in doubles {
                for point in [a, b] {
                    if self.close(&single, &point) {
                        debug!("single matched a pair point");
                        return midpoint(&single, &point);
                    }
                }
            }
        }

        debug!("two singles disagree, splitting the difference");
        midpoint(&first, &second)
    }

    /// Three singles: merge the first close pair, then try to absorb the remaining point
    fn three_singles(&self, s0: GeoPoint, s1: GeoPoint, s2: GeoPoint) -> GeoPoint {
        for (a, b, rest) in [(s0, s1, s2), (s0, s2, s1), (s1, s2, s0)] {
            if self.close(&a, &b) {
                let first_mid = midpoint(&a, &b);
                if self.close(&first_mid, &rest) {
                    debug!("three singles agree");
                    return midpoint(&first_mid, &rest);
                }
                debug!("two of three singles agree");
                return first_mid;
            }
        }

        debug!("three singles disagree");
        midpoint(&s0, &s1)
    }

    /// Several pairs: collect points of the first pair that agree with points of later pairs
    fn multiple_pairs(&self, doubles: &[(GeoPoint, GeoPoint)]) -> GeoPoint {
        let (first_a, first_b) = doubles[0];
        let mut candidates = Vec::new();

        for anchor in [first_a, first_b] {
            for &(a, b) in &doubles[1..] {
                for point in [a, b] {
                    if self.close(&anchor, &point) {
                        candidates.push(midpoint(&anchor, &point));
                    }
                }
            }
        }

        debug!(candidates = candidates.len(), "pair candidates");
        match candidates.as_slice() {
            [] => closest_pair_midpoint(doubles),
            [only] => *only,
            [c0, c1, ..] => midpoint(c0, c1),
        }
    }

    /// One pair: the point whose farthest receiver is nearest, `b` on a tie
    fn minimax(&self, (a, b): (GeoPoint, GeoPoint), centres: &[GeoPoint]) -> GeoPoint {
        debug_assert!(!centres.is_empty(), "minimax needs receiver locations");
        let worst = |p: &GeoPoint| {
            centres
                .iter()
                .map(|c| geodesic::distance(p, c))
                .fold(0.0_f64, f64::max)
        };

        if worst(&a) < worst(&b) {
            a
        } else {
            b
        }
    }
}

/// Midpoint of the globally closest two points across all pairs
fn closest_pair_midpoint(doubles: &[(GeoPoint, GeoPoint)]) -> GeoPoint {
    let points: Vec<GeoPoint> = doubles.iter().flat_map(|&(a, b)| [a, b]).collect();

    let mut best = (points[0], points[1]);
    let mut best_distance = geodesic::distance(&points[0], &points[1]);
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let d = geodesic::distance(&points[i], &points[j]);
            if d < best_distance {
                best = (points[i], points[j]);
                best_distance = d;
            }
        }
    }

    midpoint(&best.0, &best.1)
}
