//! Planar circle-circle intersection with an explicit degenerate-case policy

use crate::algorithms::projection::PlanarPoint;
use crate::core::DEFAULT_TANGENT_EPSILON_M;
use crate::validation::error::{PositioningError, PositioningResult};
use nalgebra::Vector2;

/// Range circle around a receiver, on the projection plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: PlanarPoint,
    pub radius_m: f64,
}

impl Circle {
    pub fn new(center: PlanarPoint, radius_m: f64) -> PositioningResult<Self> {
        if !radius_m.is_finite() || radius_m < 0.0 {
            return Err(PositioningError::invalid(format!(
                "circle radius {} must be finite and non-negative",
                radius_m
            )));
        }
        Ok(Self { center, radius_m })
    }
}

/// Outcome of intersecting one pair of circles
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntersectionResult<P> {
    /// Coincident circles, no unique solution
    Empty,
    /// A single representative point: tangency, or the midpoint of inconsistent circles
    Degenerate(P),
    /// Two proper intersection points
    Pair(P, P),
}

impl<P> IntersectionResult<P> {
    /// Convert the contained points, keeping the variant
    pub fn map<Q>(self, mut f: impl FnMut(P) -> Q) -> IntersectionResult<Q> {
        match self {
            IntersectionResult::Empty => IntersectionResult::Empty,
            IntersectionResult::Degenerate(p) => IntersectionResult::Degenerate(f(p)),
            IntersectionResult::Pair(a, b) => {
                let a = f(a);
                IntersectionResult::Pair(a, f(b))
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, IntersectionResult::Empty)
    }
}

/// Intersects range circles that share a projection zone
#[derive(Debug, Clone)]
pub struct CircleIntersector {
    /// Half-chord length below which the circles are treated as tangent (m)
    tangent_epsilon_m: f64,
}

impl Default for CircleIntersector {
    fn default() -> Self {
        Self {
            tangent_epsilon_m: DEFAULT_TANGENT_EPSILON_M,
        }
    }
}

impl CircleIntersector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tangent_epsilon(tangent_epsilon_m: f64) -> Self {
        Self { tangent_epsilon_m }
    }

    /// Intersect two circles.
    ///
    /// Circles that do not reach each other, or where one strictly contains the
    /// other, carry inconsistent ranges; their centers' midpoint is returned as
    /// a `Degenerate` result instead of failing.
    pub fn intersect(
        &self,
        circle_0: &Circle,
        circle_1: &Circle,
    ) -> PositioningResult<IntersectionResult<PlanarPoint>> {
        circle_0.center.ensure_same_zone(&circle_1.center)?;

        let zone = circle_0.center.zone;
        let c0 = circle_0.center.coords;
        let c1 = circle_1.center.coords;
        let (r0, r1) = (circle_0.radius_m, circle_1.radius_m);

        let axis = c1 - c0;
        let d = axis.norm();

        if d > r0 + r1 || d < (r0 - r1).abs() {
            let mid = circle_0.center.midpoint(&circle_1.center)?;
            return Ok(IntersectionResult::Degenerate(mid));
        }

        if d == 0.0 && r0 == r1 {
            return Ok(IntersectionResult::Empty);
        }

        let a = (r0 * r0 - r1 * r1 + d * d) / (2.0 * d);
        // Rounding can push the radicand slightly negative at tangency
        let h = (r0 * r0 - a * a).max(0.0).sqrt();

        let base = c0 + axis * (a / d);
        if h <= self.tangent_epsilon_m {
            return Ok(IntersectionResult::Degenerate(PlanarPoint { coords: base, zone }));
        }

        let offset = Vector2::new(axis.y, -axis.x) * (h / d);

        Ok(IntersectionResult::Pair(
            PlanarPoint {
                coords: base + offset,
                zone,
            },
            PlanarPoint {
                coords: base - offset,
                zone,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::projection::UtmZone;
    use approx::assert_abs_diff_eq;

    fn zone() -> UtmZone {
        UtmZone::new(32, true)
    }

    fn circle(x: f64, y: f64, r: f64) -> Circle {
        Circle::new(PlanarPoint::new(x, y, zone()), r).unwrap()
    }

    #[test]
    fn test_two_point_intersection() {
        let intersector = CircleIntersector::new();
        let result = intersector
            .intersect(&circle(0.0, 0.0, 5.0), &circle(8.0, 0.0, 5.0))
            .unwrap();

        match result {
            IntersectionResult::Pair(a, b) => {
                assert_abs_diff_eq!(a.easting(), 4.0, epsilon = 1e-12);
                assert_abs_diff_eq!(a.northing(), -3.0, epsilon = 1e-12);
                assert_abs_diff_eq!(b.easting(), 4.0, epsilon = 1e-12);
                assert_abs_diff_eq!(b.northing(), 3.0, epsilon = 1e-12);
                assert_eq!(a.zone, zone());
            }
            other => panic!("expected a pair, got {:?}", other),
        }
    }

    #[test]
    fn test_separate_circles_yield_center_midpoint() {
        let intersector = CircleIntersector::new();
        let c0 = circle(100.0, 200.0, 10.0);
        let c1 = circle(300.0, 600.0, 20.0);

        let result = intersector.intersect(&c0, &c1).unwrap();
        assert_eq!(
            result,
            IntersectionResult::Degenerate(PlanarPoint::new(200.0, 400.0, zone()))
        );
    }

    #[test]
    fn test_nested_circles_yield_center_midpoint() {
        let intersector = CircleIntersector::new();
        let outer = circle(0.0, 0.0, 100.0);
        let inner = circle(10.0, 0.0, 20.0);

        let result = intersector.intersect(&outer, &inner).unwrap();
        assert_eq!(
            result,
            IntersectionResult::Degenerate(PlanarPoint::new(5.0, 0.0, zone()))
        );
    }

    #[test]
    fn test_tangent_circles_yield_single_point() {
        let intersector = CircleIntersector::new();
        let r = 100.0;
        let result = intersector
            .intersect(&circle(0.0, 0.0, r), &circle(2.0 * r, 0.0, r))
            .unwrap();

        assert_eq!(
            result,
            IntersectionResult::Degenerate(PlanarPoint::new(r, 0.0, zone()))
        );
    }

    #[test]
    fn test_internally_tangent_circles() {
        let intersector = CircleIntersector::new();
        let result = intersector
            .intersect(&circle(0.0, 0.0, 10.0), &circle(4.0, 0.0, 6.0))
            .unwrap();

        match result {
            IntersectionResult::Degenerate(p) => {
                assert_abs_diff_eq!(p.easting(), 10.0, epsilon = 1e-9);
                assert_abs_diff_eq!(p.northing(), 0.0, epsilon = 1e-9);
            }
            other => panic!("expected a tangent point, got {:?}", other),
        }
    }

    #[test]
    fn test_coincident_circles_are_empty() {
        let intersector = CircleIntersector::new();
        let result = intersector
            .intersect(&circle(5.0, 5.0, 30.0), &circle(5.0, 5.0, 30.0))
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_concentric_different_radii_is_degenerate() {
        let intersector = CircleIntersector::new();
        let result = intersector
            .intersect(&circle(5.0, 5.0, 30.0), &circle(5.0, 5.0, 10.0))
            .unwrap();
        assert_eq!(
            result,
            IntersectionResult::Degenerate(PlanarPoint::new(5.0, 5.0, zone()))
        );
    }

    #[test]
    fn test_negative_radius_rejected() {
        let center = PlanarPoint::new(0.0, 0.0, zone());
        assert!(matches!(
            Circle::new(center, -1.0),
            Err(PositioningError::InvalidInput { .. })
        ));
        assert!(Circle::new(center, f64::INFINITY).is_err());
        assert!(Circle::new(center, 0.0).is_ok());
    }

    #[test]
    fn test_zone_mismatch_rejected() {
        let intersector = CircleIntersector::new();
        let c0 = circle(0.0, 0.0, 10.0);
        let c1 = Circle::new(PlanarPoint::new(5.0, 0.0, UtmZone::new(33, true)), 10.0).unwrap();

        assert!(matches!(
            intersector.intersect(&c0, &c1),
            Err(PositioningError::ZoneMismatch { .. })
        ));
    }

    #[test]
    fn test_result_map_keeps_variant() {
        let pair: IntersectionResult<i32> = IntersectionResult::Pair(1, 2);
        assert_eq!(pair.map(|v| v * 10), IntersectionResult::Pair(10, 20));

        let empty: IntersectionResult<i32> = IntersectionResult::Empty;
        assert_eq!(empty.map(|v| v + 1), IntersectionResult::Empty);
    }
}
