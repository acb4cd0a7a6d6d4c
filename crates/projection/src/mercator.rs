//! Spherical Web Mercator (EPSG:3857).
//!
//! Uses the WGS84 semi-major axis as the sphere radius, as web mapping
//! services do. Latitude is clamped to the square-world limit on the
//! forward transform.

use std::f64::consts::PI;

/// Sphere radius used by EPSG:3857 (meters).
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Half the projected world width (meters).
pub const HALF_WORLD: f64 = PI * EARTH_RADIUS;

/// Latitude at which the projected world is square (degrees).
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Convert Web Mercator meters to WGS84 lon/lat degrees.
pub fn to_geographic(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

/// Convert WGS84 lon/lat degrees to Web Mercator meters.
pub fn from_geographic(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = lon.to_radians() * EARTH_RADIUS;
    let y = (PI / 4.0 + lat.to_radians() / 2.0).tan().ln() * EARTH_RADIUS;
    (x, y)
}
