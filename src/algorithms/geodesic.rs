//! Great-circle primitives on a spherical Earth
//!
//! Distances feed the merge tolerance checks and the minimax tie-break, the
//! midpoint is used whenever two candidate positions collapse into one.

use crate::core::{GeoPoint, EARTH_MEAN_RADIUS_M};

/// Great-circle distance between two points (haversine), in meters
pub fn distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let half_dlat = (p2.lat - p1.lat).to_radians() / 2.0;
    let half_dlon = (p2.lon - p1.lon).to_radians() / 2.0;

    let a = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);

    2.0 * EARTH_MEAN_RADIUS_M * a.sqrt().min(1.0).asin()
}

/// Geodesic midpoint of two points
pub fn midpoint(p1: &GeoPoint, p2: &GeoPoint) -> GeoPoint {
    let lat1 = p1.lat.to_radians();
    let lon1 = p1.lon.to_radians();
    let lat2 = p2.lat.to_radians();
    let dlon = (p2.lon - p1.lon).to_radians();

    let bx = lat2.cos() * dlon.cos();
    let by = lat2.cos() * dlon.sin();

    let lat3 = (lat1.sin() + lat2.sin()).atan2(((lat1.cos() + bx).powi(2) + by * by).sqrt());
    let lon3 = lon1 + by.atan2(lat1.cos() + bx);

    GeoPoint {
        lat: lat3.to_degrees(),
        lon: normalize_longitude(lon3.to_degrees()),
    }
}

/// Whether two points lie strictly closer than `tolerance_m`
#[inline]
pub fn within(p1: &GeoPoint, p2: &GeoPoint, tolerance_m: f64) -> bool {
    distance(p1, p2) < tolerance_m
}

fn normalize_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 540.0).rem_euclid(360.0) - 180.0
    }
}
