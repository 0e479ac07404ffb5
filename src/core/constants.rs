//! Physical constants and system parameters

/// Mean Earth radius used by the spherical geodesic model (m)
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_000.0;

/// WGS84 semi-major axis (m)
pub const WGS84_SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;

/// WGS84 flattening
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257223563;

/// UTM central meridian scale factor
pub const UTM_SCALE_FACTOR: f64 = 0.9996;

/// UTM false easting (m)
pub const UTM_FALSE_EASTING_M: f64 = 500_000.0;

/// UTM false northing applied in the southern hemisphere (m)
pub const UTM_FALSE_NORTHING_SOUTH_M: f64 = 10_000_000.0;

/// Southern limit of the UTM grid (degrees)
pub const UTM_MIN_LATITUDE: f64 = -80.0;

/// Northern limit of the UTM grid (degrees)
pub const UTM_MAX_LATITUDE: f64 = 84.0;

/// Distance under which two candidate positions are considered the same point (m)
pub const DEFAULT_MERGE_TOLERANCE_M: f64 = 25.0;

/// Half-chord length under which a circle pair is treated as tangent (m)
pub const DEFAULT_TANGENT_EPSILON_M: f64 = 1e-9;

/// Number of receivers consumed by the circle-intersection solver
pub const TRILATERATION_RECEIVERS: usize = 3;
