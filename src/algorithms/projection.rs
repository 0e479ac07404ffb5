//! UTM planar projection for circle-intersection algebra
//!
//! Circle intersection only makes sense in a Euclidean frame, so receiver
//! locations are projected onto a transverse Mercator plane before any
//! geometry is done. Every point of one computation must share the zone of
//! the first projected point: projecting the others independently may put
//! them in a neighbouring zone, whose coordinates are not comparable.
//!
//! The forward and inverse mappings use the 6th-order Krüger series on the
//! WGS84 ellipsoid, accurate to well below a millimeter inside a zone and
//! still sub-millimeter several degrees outside the zone when forced.

use crate::core::{
    GeoPoint, UTM_FALSE_EASTING_M, UTM_FALSE_NORTHING_SOUTH_M, UTM_MAX_LATITUDE, UTM_MIN_LATITUDE,
    UTM_SCALE_FACTOR, WGS84_FLATTENING, WGS84_SEMI_MAJOR_AXIS_M,
};
use crate::validation::data::validate_location;
use crate::validation::error::{PositioningError, PositioningResult};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

const KRUGER_ORDER: usize = 6;
const NEWTON_MAX_ITERATIONS: usize = 10;
const NEWTON_TOLERANCE: f64 = 1e-12;

/// UTM zone token. Two planar points are only comparable when their zones are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UtmZone {
    /// Zone number (1-60)
    pub number: u8,
    /// Hemisphere of the false northing (true = North)
    pub north: bool,
}

impl UtmZone {
    pub fn new(number: u8, north: bool) -> Self {
        Self { number, north }
    }

    /// Longitude of the zone's central meridian (degrees)
    pub fn central_meridian(&self) -> f64 {
        (self.number as f64 - 1.0) * 6.0 - 180.0 + 3.0
    }

    fn false_northing(&self) -> f64 {
        if self.north {
            0.0
        } else {
            UTM_FALSE_NORTHING_SOUTH_M
        }
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, if self.north { 'N' } else { 'S' })
    }
}

/// Point on the projection plane (easting, northing in meters)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarPoint {
    pub coords: Vector2<f64>,
    pub zone: UtmZone,
}

impl PlanarPoint {
    pub fn new(easting: f64, northing: f64, zone: UtmZone) -> Self {
        Self {
            coords: Vector2::new(easting, northing),
            zone,
        }
    }

    pub fn easting(&self) -> f64 {
        self.coords.x
    }

    pub fn northing(&self) -> f64 {
        self.coords.y
    }

    /// Fails unless `other` lives in the same zone
    pub fn ensure_same_zone(&self, other: &PlanarPoint) -> PositioningResult<()> {
        if self.zone != other.zone {
            return Err(PositioningError::ZoneMismatch {
                expected: self.zone,
                found: other.zone,
            });
        }
        Ok(())
    }

    /// Euclidean distance on the plane
    pub fn distance_to(&self, other: &PlanarPoint) -> PositioningResult<f64> {
        self.ensure_same_zone(other)?;
        Ok((other.coords - self.coords).norm())
    }

    /// Arithmetic midpoint on the plane
    pub fn midpoint(&self, other: &PlanarPoint) -> PositioningResult<PlanarPoint> {
        self.ensure_same_zone(other)?;
        Ok(PlanarPoint {
            coords: (self.coords + other.coords) * 0.5,
            zone: self.zone,
        })
    }
}

/// Transverse Mercator projector on the WGS84 ellipsoid with UTM zoning
#[derive(Debug, Clone)]
pub struct UtmProjector {
    /// First eccentricity
    eccentricity: f64,
    /// Scaled rectifying radius, k0 * A
    scaled_radius: f64,
    /// Forward series coefficients
    alpha: [f64; KRUGER_ORDER],
    /// Inverse series coefficients
    beta: [f64; KRUGER_ORDER],
}

impl Default for UtmProjector {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl UtmProjector {
    /// Projector for the WGS84 ellipsoid
    pub fn wgs84() -> Self {
        Self::with_ellipsoid(WGS84_SEMI_MAJOR_AXIS_M, WGS84_FLATTENING)
    }

    /// Projector for an arbitrary ellipsoid
    pub fn with_ellipsoid(semi_major_axis: f64, flattening: f64) -> Self {
        let f = flattening;
        let eccentricity = (f * (2.0 - f)).sqrt();
        let n = f / (2.0 - f);
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        let rectifying_radius =
            semi_major_axis / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0 + n6 / 256.0);

        let alpha = [
            n / 2.0 - 2.0 / 3.0 * n2 + 5.0 / 16.0 * n3 + 41.0 / 180.0 * n4 - 127.0 / 288.0 * n5
                + 7891.0 / 37800.0 * n6,
            13.0 / 48.0 * n2 - 3.0 / 5.0 * n3 + 557.0 / 1440.0 * n4 + 281.0 / 630.0 * n5
                - 1983433.0 / 1935360.0 * n6,
            61.0 / 240.0 * n3 - 103.0 / 140.0 * n4 + 15061.0 / 26880.0 * n5
                + 167603.0 / 181440.0 * n6,
            49561.0 / 161280.0 * n4 - 179.0 / 168.0 * n5 + 6601661.0 / 7257600.0 * n6,
            34729.0 / 80640.0 * n5 - 3418889.0 / 1995840.0 * n6,
            212378941.0 / 319334400.0 * n6,
        ];

        let beta = [
            n / 2.0 - 2.0 / 3.0 * n2 + 37.0 / 96.0 * n3 - 1.0 / 360.0 * n4 - 81.0 / 512.0 * n5
                + 96199.0 / 604800.0 * n6,
            1.0 / 48.0 * n2 + 1.0 / 15.0 * n3 - 437.0 / 1440.0 * n4 + 46.0 / 105.0 * n5
                - 1118711.0 / 3870720.0 * n6,
            17.0 / 480.0 * n3 - 37.0 / 840.0 * n4 - 209.0 / 4480.0 * n5 + 5569.0 / 90720.0 * n6,
            4397.0 / 161280.0 * n4 - 11.0 / 504.0 * n5 - 830251.0 / 7257600.0 * n6,
            4583.0 / 161280.0 * n5 - 108847.0 / 3991680.0 * n6,
            20648693.0 / 638668800.0 * n6,
        ];

        Self {
            eccentricity,
            scaled_radius: UTM_SCALE_FACTOR * rectifying_radius,
            alpha,
            beta,
        }
    }

    /// UTM zone a point naturally falls in, including the Norway and Svalbard exceptions
    pub fn zone_for(&self, point: &GeoPoint) -> PositioningResult<UtmZone> {
        validate_geographic(point)?;
        Ok(UtmZone::new(zone_number(point.lat, point.lon), point.lat >= 0.0))
    }

    /// Project into the point's own zone
    pub fn project(&self, point: &GeoPoint) -> PositioningResult<PlanarPoint> {
        let zone = self.zone_for(point)?;
        self.project_in_zone(point, zone)
    }

    /// Project into a forced zone, used for every point after the first of a computation
    pub fn project_in_zone(&self, point: &GeoPoint, zone: UtmZone) -> PositioningResult<PlanarPoint> {
        validate_geographic(point)?;
        if !(1..=60).contains(&zone.number) {
            return Err(PositioningError::invalid(format!(
                "UTM zone number {} outside 1..=60",
                zone.number
            )));
        }

        let e = self.eccentricity;
        let phi = point.lat.to_radians();
        let lambda = wrap_degrees(point.lon - zone.central_meridian()).to_radians();
        let (sin_lambda, cos_lambda) = lambda.sin_cos();

        // Conformal latitude, via its tangent
        let tau = phi.tan();
        let sigma = (e * (e * tau / (1.0 + tau * tau).sqrt()).atanh()).sinh();
        let tau_c = tau * (1.0 + sigma * sigma).sqrt() - sigma * (1.0 + tau * tau).sqrt();

        let xi_c = tau_c.atan2(cos_lambda);
        let eta_c = (sin_lambda / (tau_c * tau_c + cos_lambda * cos_lambda).sqrt()).asinh();

        let mut xi = xi_c;
        let mut eta = eta_c;
        for (j, alpha) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += alpha * (k * xi_c).sin() * (k * eta_c).cosh();
            eta += alpha * (k * xi_c).cos() * (k * eta_c).sinh();
        }

        let easting = UTM_FALSE_EASTING_M + self.scaled_radius * eta;
        let northing = zone.false_northing() + self.scaled_radius * xi;

        Ok(PlanarPoint::new(easting, northing, zone))
    }

    /// Map a planar point back to geographic coordinates using its own zone
    pub fn unproject(&self, point: &PlanarPoint) -> GeoPoint {
        let e = self.eccentricity;
        let zone = point.zone;

        let eta = (point.easting() - UTM_FALSE_EASTING_M) / self.scaled_radius;
        let xi = (point.northing() - zone.false_northing()) / self.scaled_radius;

        let mut xi_c = xi;
        let mut eta_c = eta;
        for (j, beta) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_c -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_c -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let sinh_eta_c = eta_c.sinh();
        let (sin_xi_c, cos_xi_c) = xi_c.sin_cos();
        let tau_c = sin_xi_c / (sinh_eta_c * sinh_eta_c + cos_xi_c * cos_xi_c).sqrt();

        // Newton iteration from conformal to geodetic latitude
        let one_minus_e2 = 1.0 - e * e;
        let mut tau = tau_c;
        for _ in 0..NEWTON_MAX_ITERATIONS {
            let sigma = (e * (e * tau / (1.0 + tau * tau).sqrt()).atanh()).sinh();
            let tau_i = tau * (1.0 + sigma * sigma).sqrt() - sigma * (1.0 + tau * tau).sqrt();
            let delta = (tau_c - tau_i) / (1.0 + tau_i * tau_i).sqrt() * (1.0 + one_minus_e2 * tau * tau)
                / (one_minus_e2 * (1.0 + tau * tau).sqrt());
            tau += delta;
            if delta.abs() <= NEWTON_TOLERANCE {
                break;
            }
        }

        let lambda = sinh_eta_c.atan2(cos_xi_c);

        GeoPoint {
            lat: tau.atan().to_degrees(),
            lon: wrap_degrees(zone.central_meridian() + lambda.to_degrees()),
        }
    }
}

fn zone_number(lat: f64, lon: f64) -> u8 {
    if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
        return 32;
    }

    if (72.0..=84.0).contains(&lat) && lon >= 0.0 {
        if lon < 9.0 {
            return 31;
        } else if lon < 21.0 {
            return 33;
        } else if lon < 33.0 {
            return 35;
        } else if lon < 42.0 {
            return 37;
        }
    }

    (((lon + 180.0) / 6.0).floor() as i64).rem_euclid(60) as u8 + 1
}

fn wrap_degrees(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 540.0).rem_euclid(360.0) - 180.0
    }
}

/// Geographic validity plus the latitude band covered by the UTM grid
fn validate_geographic(point: &GeoPoint) -> PositioningResult<()> {
    validate_location(point)?;
    if !(UTM_MIN_LATITUDE..=UTM_MAX_LATITUDE).contains(&point.lat) {
        return Err(PositioningError::invalid(format!(
            "latitude {} outside the UTM grid ({}..={})",
            point.lat, UTM_MIN_LATITUDE, UTM_MAX_LATITUDE
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_utm_zone_calculation() {
        let projector = UtmProjector::wgs84();

        let zone = |lat, lon| projector.zone_for(&GeoPoint::new(lat, lon)).unwrap();
        assert_eq!(zone(37.7749, -122.4194), UtmZone::new(10, true)); // San Francisco
        assert_eq!(zone(51.4779, 0.0), UtmZone::new(31, true)); // Greenwich
        assert_eq!(zone(35.6762, 139.6917), UtmZone::new(54, true)); // Tokyo
        assert_eq!(zone(-33.8688, 151.2093), UtmZone::new(56, false)); // Sydney
        assert_eq!(zone(60.39, 5.32), UtmZone::new(32, true)); // Bergen
        assert_eq!(zone(78.22, 15.65), UtmZone::new(33, true)); // Longyearbyen
    }

    #[test]
    fn test_known_projection() {
        let projector = UtmProjector::wgs84();

        // Eiffel Tower: 31U 448252 5411933
        let planar = projector.project(&GeoPoint::new(48.8582, 2.2945)).unwrap();
        assert_eq!(planar.zone, UtmZone::new(31, true));
        assert_abs_diff_eq!(planar.easting(), 448_252.0, epsilon = 1.0);
        assert_abs_diff_eq!(planar.northing(), 5_411_933.0, epsilon = 1.0);

        // A point on the central meridian sits on the false easting
        let meridian = projector.project(&GeoPoint::new(45.0, 9.0)).unwrap();
        assert_abs_diff_eq!(meridian.easting(), UTM_FALSE_EASTING_M, epsilon = 1e-6);
    }

    #[test]
    fn test_round_trip_own_zone() {
        let projector = UtmProjector::wgs84();

        for (lat, lon) in [
            (0.0, 0.0),
            (47.4777, 12.0531),
            (-33.8688, 151.2093),
            (64.1466, -21.9426),
            (-79.5, 100.2),
            (83.9, 20.0),
        ] {
            let point = GeoPoint::new(lat, lon);
            let back = projector.unproject(&projector.project(&point).unwrap());
            assert_abs_diff_eq!(back.lat, lat, epsilon = 1e-9);
            assert_abs_diff_eq!(back.lon, lon, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_round_trip_forced_zone() {
        let projector = UtmProjector::wgs84();

        // 12.9°E belongs to zone 33; force it into 32 as a neighbouring receiver would be
        let first = projector.project(&GeoPoint::new(47.9, 11.9)).unwrap();
        assert_eq!(first.zone.number, 32);

        let second = GeoPoint::new(47.95, 12.9);
        assert_eq!(projector.zone_for(&second).unwrap().number, 33);

        let forced = projector.project_in_zone(&second, first.zone).unwrap();
        assert_eq!(forced.zone, first.zone);

        let back = projector.unproject(&forced);
        assert_abs_diff_eq!(back.lat, second.lat, epsilon = 1e-9);
        assert_abs_diff_eq!(back.lon, second.lon, epsilon = 1e-9);
    }

    #[test]
    fn test_forced_zone_keeps_distances_consistent() {
        let projector = UtmProjector::wgs84();

        // Two points 1 km apart straddling the 32/33 boundary at 12°E
        let a = GeoPoint::new(48.0, 11.9933);
        let b = GeoPoint::new(48.0, 12.0067);

        let pa = projector.project(&a).unwrap();
        let pb = projector.project_in_zone(&b, pa.zone).unwrap();
        let planar = pa.distance_to(&pb).unwrap();
        let geodesic = crate::algorithms::geodesic::distance(&a, &b);

        // Grid scale and spherical model together stay well under one percent
        assert!((planar - geodesic).abs() / geodesic < 0.01);

        // Independently projected, the points are not comparable
        let pb_own = projector.project(&b).unwrap();
        assert!(matches!(
            pa.distance_to(&pb_own),
            Err(PositioningError::ZoneMismatch { .. })
        ));
    }

    #[test]
    fn test_southern_point_forced_into_northern_zone() {
        let projector = UtmProjector::wgs84();

        let north = projector.project(&GeoPoint::new(0.001, 10.0)).unwrap();
        let south = GeoPoint::new(-0.001, 10.0);
        let forced = projector.project_in_zone(&south, north.zone).unwrap();

        assert!(forced.northing() < 0.0);
        assert_abs_diff_eq!(north.distance_to(&forced).unwrap(), 221.0, epsilon = 1.0);

        let back = projector.unproject(&forced);
        assert_abs_diff_eq!(back.lat, -0.001, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_coordinates() {
        let projector = UtmProjector::wgs84();

        assert!(projector.project(&GeoPoint::new(85.0, 0.0)).is_err());
        assert!(projector.project(&GeoPoint::new(-81.0, 0.0)).is_err());
        assert!(projector.project(&GeoPoint::new(10.0, 181.0)).is_err());
        assert!(projector.project(&GeoPoint::new(f64::NAN, 0.0)).is_err());
        assert!(projector
            .project_in_zone(&GeoPoint::new(10.0, 10.0), UtmZone::new(0, true))
            .is_err());
    }

    #[test]
    fn test_rejection_reasons() {
        let projector = UtmProjector::wgs84();
        let reason = |p: GeoPoint| match projector.project(&p) {
            Err(PositioningError::InvalidInput { reason }) => reason,
            other => panic!("expected invalid input, got {:?}", other),
        };

        // Valid on the globe, outside the grid
        assert!(reason(GeoPoint::new(85.0, 0.0)).contains("UTM grid"));
        // Invalid anywhere, rejected by the shared location check
        assert!(reason(GeoPoint::new(10.0, 181.0)).contains("longitude"));
        assert!(reason(GeoPoint::new(f64::INFINITY, 0.0)).contains("non-finite"));
    }

    #[test]
    fn test_planar_midpoint() {
        let zone = UtmZone::new(32, true);
        let a = PlanarPoint::new(500_000.0, 5_000_000.0, zone);
        let b = PlanarPoint::new(500_200.0, 5_000_100.0, zone);
        let mid = a.midpoint(&b).unwrap();
        assert_eq!(mid, PlanarPoint::new(500_100.0, 5_000_050.0, zone));

        let other = PlanarPoint::new(500_000.0, 5_000_000.0, UtmZone::new(33, true));
        assert!(a.midpoint(&other).is_err());
    }
}
