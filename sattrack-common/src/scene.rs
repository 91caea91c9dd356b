//! Geodetic → scene-local Cartesian projection
//!
//! The globe is a unit sphere. Markers sit slightly above it, pushed outward
//! in proportion to altitude so that orbit heights stay distinguishable.

use serde::{Deserialize, Serialize};

use crate::types::GeodeticPosition;

/// Mean Earth radius used to normalise altitude (km)
pub const SCENE_EARTH_RADIUS_KM: f64 = 6371.0;

/// Default multiplier applied to the normalised altitude
pub const DEFAULT_ALTITUDE_SCALE: f64 = 0.5;

/// Point in the scene's left-handed, y-up frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenePoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ScenePoint {
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Radius (in globe units) at which a marker for `altitude_km` is drawn.
pub fn marker_radius(altitude_km: f64, altitude_scale: f64) -> f64 {
    1.0 + (altitude_km / SCENE_EARTH_RADIUS_KM) * altitude_scale
}

/// Project latitude/longitude onto a sphere of `radius`.
///
/// Scene longitude is geographic longitude + 180°, matching the globe texture.
pub fn lat_lon_to_scene(latitude: f64, longitude: f64, radius: f64) -> ScenePoint {
    let phi = (90.0 - latitude).to_radians();
    let theta = (longitude + 180.0).to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();

    ScenePoint {
        x: -(radius * sin_phi * cos_theta),
        y: radius * cos_phi,
        z: radius * sin_phi * sin_theta,
    }
}

impl GeodeticPosition {
    /// Scene radius for this position.
    pub fn scene_radius(&self, altitude_scale: f64) -> f64 {
        marker_radius(self.altitude, altitude_scale)
    }

    /// Scene-local point for this position.
    pub fn to_scene(&self, altitude_scale: f64) -> ScenePoint {
        lat_lon_to_scene(self.latitude, self.longitude, self.scene_radius(altitude_scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_marker_radius() {
        assert!(close(marker_radius(0.0, DEFAULT_ALTITUDE_SCALE), 1.0));
        assert!(close(marker_radius(6371.0, DEFAULT_ALTITUDE_SCALE), 1.5));
        assert!(close(marker_radius(6371.0, 1.0), 2.0));
        assert!(marker_radius(420.0, 0.5) < marker_radius(35786.0, 0.5));
    }

    #[test]
    fn test_poles_and_equator() {
        let north = lat_lon_to_scene(90.0, 0.0, 1.0);
        assert!(close(north.y, 1.0));
        assert!(north.x.abs() < 1e-12 && north.z.abs() < 1e-12);

        // lon 0 → theta 180° → x = +1
        let greenwich = lat_lon_to_scene(0.0, 0.0, 1.0);
        assert!(close(greenwich.x, 1.0));
        assert!(greenwich.y.abs() < 1e-12);

        // lon 90E → theta 270° → z = -1
        let east = lat_lon_to_scene(0.0, 90.0, 1.0);
        assert!(close(east.z, -1.0));
    }

    #[test]
    fn test_to_scene_keeps_radius() {
        let p = GeodeticPosition::new(51.6, -120.25, 420.0);
        let point = p.to_scene(DEFAULT_ALTITUDE_SCALE);
        assert!(close(point.norm(), p.scene_radius(DEFAULT_ALTITUDE_SCALE)));
    }
}
